//! Fairness objective.

use super::model::{LinearExpr, Objective, ShiftModel};

/// Sets `minimize Σ ceiling(dept) − Σ floor(dept)` over every department
/// with fairness variables.
///
/// Since each ceiling is at least every member's load and each floor at most
/// every member's load, the objective jointly narrows the load spread of all
/// departments. It is one scalar objective, not a lexicographic one.
pub fn build_fairness_objective(model: &mut ShiftModel) {
    let mut expr = LinearExpr::new();
    for (_, vars) in model.fairness_vars() {
        expr = expr.term(vars.ceiling, 1.0).term(vars.floor, -1.0);
    }
    model.set_objective(Objective::minimize(expr));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_terms() {
        let mut model = ShiftModel::new("test");
        model
            .create_assignment_variables(&["a".to_string()], 28)
            .unwrap();
        model.create_fairness_variables(["ward", "clinic"]).unwrap();
        build_fairness_objective(&mut model);

        let objective = model.objective().unwrap();
        assert_eq!(objective.expr.terms.len(), 4);

        let ward = model.fairness("ward").unwrap();
        let clinic = model.fairness("clinic").unwrap();
        let mut values = vec![0.0; model.variable_count()];
        values[ward.ceiling.index()] = 5.0;
        values[ward.floor.index()] = 3.0;
        values[clinic.ceiling.index()] = 4.0;
        values[clinic.floor.index()] = 4.0;
        assert_eq!(objective.expr.evaluate(&values), 2.0);
    }

    #[test]
    fn test_objective_without_departments() {
        let mut model = ShiftModel::new("test");
        build_fairness_objective(&mut model);
        assert!(model.objective().unwrap().expr.terms.is_empty());
    }
}
