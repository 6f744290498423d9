//! Linear model definition.
//!
//! A [`ShiftModel`] owns the variables, an append-only set of named linear
//! constraints, and the objective. Constraints are stored in the normal form
//! `expr (<= | >= | ==) rhs` with any constant folded into `rhs`.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use super::variables::{AssignmentIndex, FairnessVars, VarId, Variable};
use crate::error::ConfigError;
use crate::models::ShiftType;

/// Absolute tolerance used when checking values against constraints.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// A linear combination of variables plus a constant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    /// (variable, coefficient) pairs. A variable may appear more than once.
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit-coefficient sum of `vars`.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn plus(mut self, other: LinearExpr) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    pub fn minus(self, other: LinearExpr) -> Self {
        self.plus(other.scaled(-1.0))
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        for (_, c) in &mut self.terms {
            *c *= factor;
        }
        self.constant *= factor;
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    /// Value of the expression under `values` (indexed by [`VarId::index`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|(v, _)| *v)
    }
}

/// Comparison of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    LessEq,
    GreaterEq,
    Equal,
}

/// A named linear constraint `expr sense rhs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy the constraint within [`FEASIBILITY_TOLERANCE`].
    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::GreaterEq => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
            Sense::Equal => (lhs - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
        }
    }

    /// The variable this constraint pins to zero, if it has the form `x == 0`.
    pub fn forced_zero(&self) -> Option<VarId> {
        match (self.sense, self.expr.terms.as_slice()) {
            (Sense::Equal, [(var, c)]) if *c != 0.0 && self.rhs == 0.0 => Some(*var),
            _ => None,
        }
    }
}

/// Linear objective function, always minimized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Objective {
    pub expr: LinearExpr,
}

impl Objective {
    pub fn minimize(expr: LinearExpr) -> Self {
        Self { expr }
    }
}

/// Append-only collection of uniquely named constraints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConstraintSet {
    constraints: Vec<LinearConstraint>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl ConstraintSet {
    /// Appends a constraint.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateConstraint`] if the name is taken.
    pub fn push(&mut self, constraint: LinearConstraint) -> Result<(), ConfigError> {
        if !self.names.insert(constraint.name.clone()) {
            return Err(ConfigError::DuplicateConstraint(constraint.name));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&LinearConstraint> {
        if !self.contains(name) {
            return None;
        }
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinearConstraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// The rostering model: decision variables, constraints, objective.
///
/// # Examples
///
/// ```
/// use u_roster::milp::{LinearExpr, Sense, ShiftModel};
/// use u_roster::models::ShiftType;
///
/// let mut model = ShiftModel::new("example");
/// model
///     .create_assignment_variables(&["alessia".to_string(), "marco".to_string()], 31)
///     .unwrap();
/// assert_eq!(model.variable_count(), 2 * 31 * 2);
///
/// let day0_morning = model.sum_over_doctors(0, ShiftType::Morning).unwrap();
/// model.add_constraint("cover_0_morning", day0_morning, Sense::GreaterEq, 1.0).unwrap();
/// assert_eq!(model.constraint_count(), 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ShiftModel {
    name: String,
    variables: Vec<Variable>,
    assignments: Option<AssignmentIndex>,
    /// Fairness pairs in creation order.
    fairness: Vec<(String, FairnessVars)>,
    #[serde(skip)]
    fairness_index: HashMap<String, usize>,
    constraints: ConstraintSet,
    objective: Option<Objective>,
}

impl ShiftModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            assignments: None,
            fairness: Vec::new(),
            fairness_index: HashMap::new(),
            constraints: ConstraintSet::default(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    /// Allocates one binary variable per (doctor, day, shift).
    ///
    /// # Errors
    /// [`ConfigError::AssignmentsAlreadyCreated`] on a second call.
    pub fn create_assignment_variables(
        &mut self,
        doctors: &[String],
        num_days: usize,
    ) -> Result<(), ConfigError> {
        if self.assignments.is_some() {
            return Err(ConfigError::AssignmentsAlreadyCreated);
        }
        let index = AssignmentIndex::new(doctors.to_vec(), num_days, self.variables.len());
        for doctor in doctors {
            for day in 0..num_days {
                for shift in ShiftType::ALL {
                    let name = format!("x[{doctor},{day},{}]", shift.index());
                    self.add_variable(Variable::binary(name));
                }
            }
        }
        self.assignments = Some(index);
        Ok(())
    }

    /// Allocates the floor/ceiling fairness pair of every listed department.
    ///
    /// Both are continuous, bounded below by zero and unbounded above.
    pub fn create_fairness_variables<'a>(
        &mut self,
        departments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        for department in departments {
            if self.fairness_index.contains_key(department) {
                return Err(ConfigError::FairnessAlreadyCreated(department.to_string()));
            }
            let floor = self.add_variable(Variable::continuous(
                format!("min_work_vars[{department}]"),
                0.0,
                None,
            ));
            let ceiling = self.add_variable(Variable::continuous(
                format!("max_work_vars[{department}]"),
                0.0,
                None,
            ));
            self.fairness_index
                .insert(department.to_string(), self.fairness.len());
            self.fairness
                .push((department.to_string(), FairnessVars { floor, ceiling }));
        }
        Ok(())
    }

    /// The assignment index.
    pub fn assignments(&self) -> Result<&AssignmentIndex, ConfigError> {
        self.assignments
            .as_ref()
            .ok_or(ConfigError::AssignmentsMissing)
    }

    fn doctor_position(&self, doctor: &str) -> Result<(usize, &AssignmentIndex), ConfigError> {
        let index = self.assignments()?;
        let pos = index
            .doctor_position(doctor)
            .ok_or_else(|| ConfigError::UnknownDoctor(doctor.to_string()))?;
        Ok((pos, index))
    }

    /// Dense position of `doctor` in the assignment index.
    ///
    /// Constraint names use positions rather than ids, so ids may contain
    /// any character without two names colliding.
    pub fn doctor_index(&self, doctor: &str) -> Result<usize, ConfigError> {
        self.doctor_position(doctor).map(|(pos, _)| pos)
    }

    /// Variable of (`doctor`, `day`, `shift`).
    pub fn assignment(
        &self,
        doctor: &str,
        day: usize,
        shift: ShiftType,
    ) -> Result<VarId, ConfigError> {
        let (pos, index) = self.doctor_position(doctor)?;
        if day >= index.num_days() {
            return Err(ConfigError::DayOutOfRange {
                day,
                num_days: index.num_days(),
            });
        }
        Ok(index.get(pos, day, shift))
    }

    /// Number of doctors on (`day`, `shift`).
    pub fn sum_over_doctors(
        &self,
        day: usize,
        shift: ShiftType,
    ) -> Result<LinearExpr, ConfigError> {
        let index = self.assignments()?;
        if day >= index.num_days() {
            return Err(ConfigError::DayOutOfRange {
                day,
                num_days: index.num_days(),
            });
        }
        Ok(LinearExpr::sum(
            (0..index.doctors().len()).map(|doc| index.get(doc, day, shift)),
        ))
    }

    /// Monthly shift count of `doctor`.
    pub fn sum_over_days_and_shifts(&self, doctor: &str) -> Result<LinearExpr, ConfigError> {
        let (pos, index) = self.doctor_position(doctor)?;
        Ok(LinearExpr::sum((0..index.num_days()).flat_map(|day| {
            ShiftType::ALL.into_iter().map(move |shift| index.get(pos, day, shift))
        })))
    }

    /// Fairness pair of `department`.
    pub fn fairness(&self, department: &str) -> Result<FairnessVars, ConfigError> {
        self.fairness_index
            .get(department)
            .map(|&i| self.fairness[i].1)
            .ok_or_else(|| ConfigError::FairnessMissing(department.to_string()))
    }

    /// Creation-order position of `department`'s fairness pair.
    pub fn fairness_position(&self, department: &str) -> Result<usize, ConfigError> {
        self.fairness_index
            .get(department)
            .copied()
            .ok_or_else(|| ConfigError::FairnessMissing(department.to_string()))
    }

    /// All fairness pairs in creation order.
    pub fn fairness_vars(&self) -> &[(String, FairnessVars)] {
        &self.fairness
    }

    /// Adds `expr sense rhs` under a unique `name`.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        mut expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) -> Result<(), ConfigError> {
        let rhs = rhs - expr.constant;
        expr.constant = 0.0;
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        })
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.index())
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Variables pinned to zero by a single-variable equality.
    pub fn forced_zero_variables(&self) -> BTreeSet<VarId> {
        self.constraints
            .iter()
            .filter_map(LinearConstraint::forced_zero)
            .collect()
    }

    /// Constraints not satisfied by `values`.
    pub fn violated_constraints(&self, values: &[f64]) -> Vec<&LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(values))
            .collect()
    }

    /// Whether `values` respect every constraint and variable domain.
    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let domains_ok = self.variables.iter().zip(values).all(|(var, &v)| match var.kind {
            super::VarKind::Binary => {
                v.abs() <= FEASIBILITY_TOLERANCE || (v - 1.0).abs() <= FEASIBILITY_TOLERANCE
            }
            super::VarKind::Continuous { lower, upper } => {
                v >= lower - FEASIBILITY_TOLERANCE
                    && upper.map_or(true, |u| v <= u + FEASIBILITY_TOLERANCE)
            }
        });
        domains_ok && self.violated_constraints(values).is_empty()
    }
}
