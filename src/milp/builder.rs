//! Roster model builder.
//!
//! Runs the calendar, registry and policy through every generator in a fixed
//! order, submits the finished model to a solver, and decodes the answer.

use tracing::{info, warn};

use super::generators::{
    build_consecutive_shift_constraints, build_cross_department_constraint,
    build_custom_constraint, build_department_constraints, build_doctors_per_shift_constraints,
    build_luck_worker_constraints, build_max_shifts_constraints, build_shifts_range_constraints,
    LuckMode,
};
use super::model::ShiftModel;
use super::objective::build_fairness_objective;
use super::solver::{ShiftSolver, SolveResult, Solution};
use crate::audit::audit_roster;
use crate::config::{PolicyParams, Unavailability};
use crate::error::{ConfigError, Result, RosterError};
use crate::models::{MonthCalendar, Roster, RosterRegistry, ShiftAssignment, WorkloadClass};

/// Terminal outcome of a roster solve.
#[derive(Debug, Clone)]
pub enum RosterOutcome {
    Solved(Roster),
    /// No roster satisfies the rules; adjust the policy and rebuild.
    Infeasible,
    Unbounded,
}

impl RosterOutcome {
    pub fn roster(&self) -> Option<&Roster> {
        match self {
            RosterOutcome::Solved(r) => Some(r),
            _ => None,
        }
    }
}

/// Builds the rostering model for one month.
///
/// # Example
/// ```no_run
/// use u_roster::config::RosterConfig;
/// use u_roster::milp::{GoodLpSolver, RosterModelBuilder};
/// use u_roster::models::MonthCalendar;
///
/// let config = RosterConfig::obstetrics();
/// let registry = config.registry().unwrap();
/// let calendar = MonthCalendar::resolve("2024-01-01").unwrap();
/// let builder = RosterModelBuilder::new(&registry, &calendar).with_policy(config.policy);
/// let outcome = builder.solve(&GoodLpSolver::new()).unwrap();
/// ```
pub struct RosterModelBuilder<'a> {
    registry: &'a RosterRegistry,
    calendar: &'a MonthCalendar,
    policy: PolicyParams,
    unavailability: Vec<Unavailability>,
}

impl<'a> RosterModelBuilder<'a> {
    /// Creates a builder with the default policy.
    pub fn new(registry: &'a RosterRegistry, calendar: &'a MonthCalendar) -> Self {
        Self {
            registry,
            calendar,
            policy: PolicyParams::default(),
            unavailability: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: PolicyParams) -> Self {
        self.policy = policy;
        self
    }

    /// Adds one-off unavailable slots.
    pub fn with_unavailability(mut self, unavailability: Vec<Unavailability>) -> Self {
        self.unavailability.extend(unavailability);
        self
    }

    pub fn policy(&self) -> &PolicyParams {
        &self.policy
    }

    /// Builds the complete model.
    ///
    /// Generator order: assignment and fairness variables, consecutive
    /// shifts, one-off unavailability, staffing, department blackouts,
    /// per-doctor range, cross-department ratios, per-doctor cap,
    /// intra-department fairness, objective.
    pub fn build(&self) -> Result<ShiftModel> {
        self.policy.validate()?;
        let doctors = self.registry.doctors();
        if doctors.is_empty() {
            return Err(ConfigError::EmptyRoster.into());
        }
        let num_days = self.calendar.num_days();

        let mut model = ShiftModel::new(format!(
            "roster-{}-{:02}",
            self.calendar.year(),
            self.calendar.month()
        ));
        model.create_assignment_variables(doctors, num_days)?;
        let staffed: Vec<&str> = self
            .registry
            .staffed_departments()
            .map(|d| d.name.as_str())
            .collect();
        model.create_fairness_variables(staffed.iter().copied())?;

        build_consecutive_shift_constraints(
            &mut model,
            doctors,
            num_days,
            self.policy.rest_length as usize,
        )?;

        for slot in &self.unavailability {
            build_custom_constraint(&mut model, &slot.doctor, slot.day, slot.shift)?;
        }

        build_doctors_per_shift_constraints(
            &mut model,
            num_days,
            self.policy.min_doctors_per_shift,
            self.policy.max_doctors_per_shift,
        )?;

        for department in &staffed {
            build_department_constraints(&mut model, self.registry, self.calendar, department)?;
        }

        build_shifts_range_constraints(&mut model, doctors, num_days, self.policy.relaxation)?;

        for low in self.registry.departments_with_workload(WorkloadClass::Low) {
            for high in self.registry.departments_with_workload(WorkloadClass::High) {
                build_cross_department_constraint(
                    &mut model,
                    self.registry,
                    &low.name,
                    &high.name,
                )?;
            }
        }

        build_max_shifts_constraints(&mut model, doctors, self.policy.max_shifts_per_doctor)?;

        for department in &staffed {
            let members = self.registry.doctors_of(department);
            build_luck_worker_constraints(&mut model, department, members, LuckMode::Unluckiest)?;
            build_luck_worker_constraints(&mut model, department, members, LuckMode::Luckiest)?;
        }

        build_fairness_objective(&mut model);

        info!(
            model = model.name(),
            doctors = doctors.len(),
            days = num_days,
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "model built"
        );
        Ok(model)
    }

    /// Builds, solves and decodes.
    ///
    /// A solved roster is audited against the rules before it is returned;
    /// any findings land in [`Roster::violations`].
    ///
    /// # Errors
    /// Configuration errors from [`build`](Self::build), and
    /// [`RosterError::Solver`] if the solver itself fails.
    pub fn solve<S: ShiftSolver>(&self, solver: &S) -> Result<RosterOutcome> {
        let model = self.build()?;
        match solver.submit(&model) {
            SolveResult::Optimal(solution) => {
                let mut roster = self.decode_solution(&model, &solution)?;
                roster.violations = audit_roster(
                    &roster,
                    self.registry,
                    self.calendar,
                    &self.policy,
                    &self.unavailability,
                );
                info!(
                    assignments = roster.assignment_count(),
                    objective = solution.objective_value,
                    violations = roster.violations.len(),
                    "roster solved"
                );
                Ok(RosterOutcome::Solved(roster))
            }
            SolveResult::Infeasible => {
                warn!(model = model.name(), "model is infeasible");
                Ok(RosterOutcome::Infeasible)
            }
            SolveResult::Unbounded => {
                warn!(model = model.name(), "model is unbounded");
                Ok(RosterOutcome::Unbounded)
            }
            SolveResult::Error(reason) => Err(RosterError::Solver(reason)),
        }
    }

    /// Turns the set assignment variables into a roster.
    pub fn decode_solution(&self, model: &ShiftModel, solution: &Solution) -> Result<Roster> {
        let index = model.assignments()?;
        let mut roster = Roster::new(self.calendar, index.doctors().to_vec());

        for (doc, day, shift, var) in index.iter() {
            if !solution.is_set(var) {
                continue;
            }
            let doctor = &index.doctors()[doc];
            let (Some(date), Some(weekday)) =
                (self.calendar.date_of(day), self.calendar.weekday_of(day))
            else {
                return Err(ConfigError::DayOutOfRange {
                    day,
                    num_days: self.calendar.num_days(),
                }
                .into());
            };
            roster.add_assignment(ShiftAssignment {
                doctor: doctor.clone(),
                department: self.registry.department_of(doctor)?.to_string(),
                day,
                date,
                weekday,
                shift,
            });
        }
        Ok(roster)
    }
}
