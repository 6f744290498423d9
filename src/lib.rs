//! Monthly shift rostering for the U-Engine ecosystem.
//!
//! Compiles a month calendar, a department roster and a fairness policy into
//! a mixed-integer linear model, hands it to an external solver, and decodes
//! the answer into a roster.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `MonthCalendar`, `ShiftType`, `Department`,
//!   `RosterRegistry`, `Roster`, `Violation`
//! - **`milp`**: Model layer: variables, named linear constraints, the rule
//!   generators, the fairness objective, the solver boundary and the builder
//!   that runs them in order
//! - **`audit`**: Checks a decoded roster against the hard rules and computes
//!   workload statistics
//! - **`config`**: Policy parameters and JSON roster configuration
//! - **`error`**: `RosterError` / `ConfigError`
//!
//! # Architecture
//!
//! This crate only builds models. Solving is delegated through the
//! [`milp::ShiftSolver`] trait; [`milp::GoodLpSolver`] is the bundled
//! adapter.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The state of the art of nurse rostering"

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod milp;
pub mod models;

pub use error::{ConfigError, Result, RosterError};
