//! Mixed-integer linear rostering model.
//!
//! Turns a month calendar, a roster registry and a policy into a
//! [`ShiftModel`], hands it to a [`ShiftSolver`], and decodes the result.
//!
//! # Key Components
//!
//! - **Variables**: one binary per (doctor, day, shift) plus a continuous
//!   floor/ceiling pair per staffed department
//! - **Model**: [`ShiftModel`]: variables, uniquely named linear
//!   constraints, objective
//! - **Generators**: one function per policy rule (rest after nights,
//!   staffing, blackouts, shift range, workload ratio, fairness, cap)
//! - **Objective**: minimize the summed load spread of all departments
//! - **Solver**: [`ShiftSolver`] trait, [`GoodLpSolver`] adapter
//! - **Builder**: [`RosterModelBuilder`]: fixed generator order, solve,
//!   decode
//!
//! # Design
//!
//! This module defines the modeling layer only. The search for an
//! assignment is delegated to the solver behind [`ShiftSolver`].
//!
//! # References
//!
//! Williams (2013), "Model Building in Mathematical Programming", Ch. 9–10

mod builder;
pub mod generators;
mod model;
mod objective;
mod solver;
mod variables;

pub use builder::{RosterModelBuilder, RosterOutcome};
pub use generators::LuckMode;
pub use model::{
    ConstraintSet, LinearConstraint, LinearExpr, Objective, Sense, ShiftModel,
    FEASIBILITY_TOLERANCE,
};
pub use objective::build_fairness_objective;
pub use solver::{GoodLpSolver, ShiftSolver, Solution, SolveResult};
pub use variables::{AssignmentIndex, FairnessVars, VarId, VarKind, Variable};
