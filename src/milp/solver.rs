//! Solver boundary and the `good_lp` adapter.
//!
//! The model builder never searches for assignments itself. A
//! [`ShiftSolver`] receives the finished [`ShiftModel`] and reports one of
//! four outcomes; infeasibility is an ordinary outcome, not an error.

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution as _, SolverModel,
};
use tracing::{debug, info};

use super::model::{LinearExpr, Sense, ShiftModel};
use super::variables::{VarId, VarKind};

/// Variable values of a solved model.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Value per variable, indexed by [`VarId::index`].
    pub values: Vec<f64>,
    /// Objective value (0 if the model has no objective).
    pub objective_value: f64,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u128,
}

impl Solution {
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Whether a binary variable is set (value above 0.5).
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone)]
pub enum SolveResult {
    Optimal(Solution),
    /// The constraints admit no assignment.
    Infeasible,
    /// The objective can be improved without limit.
    Unbounded,
    /// The solver failed for reasons unrelated to the model's feasibility.
    Error(String),
}

impl SolveResult {
    pub fn is_solution_found(&self) -> bool {
        matches!(self, SolveResult::Optimal(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Optimal(s) => Some(s),
            _ => None,
        }
    }
}

/// Interface for solver implementations.
///
/// Implementors may wrap any MILP engine. The call is blocking; time limits
/// and cancellation belong to the implementation's own configuration.
pub trait ShiftSolver {
    /// Solves `model` and returns the outcome.
    fn submit(&self, model: &ShiftModel) -> SolveResult;
}

/// Adapter onto `good_lp` with its pure-Rust `microlp` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl ShiftSolver for GoodLpSolver {
    fn submit(&self, model: &ShiftModel) -> SolveResult {
        let start = Instant::now();

        let mut problem = ProblemVariables::new();
        let vars: Vec<good_lp::Variable> = model
            .variables()
            .iter()
            .map(|v| {
                let def = variable().name(v.name.clone());
                let def = match v.kind {
                    VarKind::Binary => def.binary(),
                    VarKind::Continuous { lower, upper } => match upper {
                        Some(upper) => def.min(lower).max(upper),
                        None => def.min(lower),
                    },
                };
                problem.add(def)
            })
            .collect();

        let to_expression = |expr: &LinearExpr| -> Expression {
            let mut out = Expression::with_capacity(expr.terms.len());
            for (var, coefficient) in &expr.terms {
                out.add_mul(*coefficient, vars[var.index()]);
            }
            out
        };

        let objective = match model.objective() {
            Some(obj) => to_expression(&obj.expr),
            None => Expression::with_capacity(0),
        };
        let mut solver_model = problem.minimise(objective).using(default_solver);
        for c in model.constraints().iter() {
            let lhs = to_expression(&c.expr);
            let translated = match c.sense {
                Sense::LessEq => constraint::leq(lhs, c.rhs),
                Sense::GreaterEq => constraint::geq(lhs, c.rhs),
                Sense::Equal => constraint::eq(lhs, c.rhs),
            };
            solver_model = solver_model.with(translated);
        }
        debug!(
            model = model.name(),
            variables = vars.len(),
            constraints = model.constraint_count(),
            "submitting model"
        );

        let result = match solver_model.solve() {
            Ok(solved) => {
                let values: Vec<f64> = vars.iter().map(|v| solved.value(*v)).collect();
                let objective_value = model
                    .objective()
                    .map(|o| o.expr.evaluate(&values))
                    .unwrap_or(0.0);
                SolveResult::Optimal(Solution {
                    values,
                    objective_value,
                    solve_time_ms: start.elapsed().as_millis(),
                })
            }
            Err(ResolutionError::Infeasible) => SolveResult::Infeasible,
            Err(ResolutionError::Unbounded) => SolveResult::Unbounded,
            Err(other) => SolveResult::Error(other.to_string()),
        };

        info!(
            model = model.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            found = result.is_solution_found(),
            "solve finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::Objective;
    use crate::models::ShiftType;

    fn tiny_model(min_cover: f64) -> ShiftModel {
        let mut model = ShiftModel::new("tiny");
        model
            .create_assignment_variables(&["a".to_string(), "b".to_string()], 2)
            .unwrap();
        for day in 0..2 {
            for shift in ShiftType::ALL {
                let cover = model.sum_over_doctors(day, shift).unwrap();
                model
                    .add_constraint(
                        format!("cover_{day}_{}", shift.index()),
                        cover,
                        Sense::GreaterEq,
                        min_cover,
                    )
                    .unwrap();
            }
        }
        let all = LinearExpr::sum(model.assignments().unwrap().iter().map(|(.., v)| v));
        model.set_objective(Objective::minimize(all));
        model
    }

    #[test]
    fn test_solve_tiny_model() {
        let model = tiny_model(1.0);
        let result = GoodLpSolver::new().submit(&model);
        let solution = result.solution().expect("tiny model is feasible");
        assert!(model.is_satisfied_by(&solution.values));
        assert!((solution.objective_value - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_is_reported() {
        let model = tiny_model(3.0);
        assert!(matches!(
            GoodLpSolver::new().submit(&model),
            SolveResult::Infeasible
        ));
    }

    #[test]
    fn test_solution_accessors() {
        let solution = Solution {
            values: vec![0.0, 1.0, 0.9999],
            objective_value: 0.0,
            solve_time_ms: 0,
        };
        assert!(!solution.is_set(VarId(0)));
        assert!(solution.is_set(VarId(1)));
        assert!(solution.is_set(VarId(2)));
        assert_eq!(solution.value(VarId(9)), 0.0);
    }
}
