//! Error types.
//!
//! Two layers: [`RosterError`] is what every fallible operation returns,
//! [`ConfigError`] classifies the configuration mistakes that abort a model
//! build. An infeasible model is not an error; see
//! [`RosterOutcome`](crate::milp::RosterOutcome).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The month identifier could not be parsed as a calendar date.
    #[error("invalid date '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Roster, department table, policy, or model construction is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The external solver failed (not the same as an infeasible model).
    #[error("solver error: {0}")]
    Solver(String),

    /// Reading a configuration file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for [`RosterConfig`](crate::config::RosterConfig).
    #[error("malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors. Always fatal to the current build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("doctor '{doctor}' references unknown department '{department}'")]
    UnknownDepartment { doctor: String, department: String },

    #[error("unknown doctor '{0}'")]
    UnknownDoctor(String),

    #[error("doctor '{0}' is listed more than once")]
    DuplicateDoctor(String),

    #[error("department '{0}' is defined more than once")]
    DuplicateDepartment(String),

    /// Two generators produced the same constraint name.
    #[error("duplicate constraint name '{0}'")]
    DuplicateConstraint(String),

    #[error("roster has no doctors")]
    EmptyRoster,

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("unknown shift type '{0}'")]
    UnknownShift(String),

    #[error("unavailability of doctor '{doctor}': day_of_month is 1-based, got 0")]
    ZeroDayOfMonth { doctor: String },

    #[error("day index {day} is outside a {num_days}-day month")]
    DayOutOfRange { day: usize, num_days: usize },

    #[error("assignment variables were already created for this model")]
    AssignmentsAlreadyCreated,

    #[error("assignment variables have not been created yet")]
    AssignmentsMissing,

    #[error("fairness variables for department '{0}' were already created")]
    FairnessAlreadyCreated(String),

    #[error("no fairness variables for department '{0}'")]
    FairnessMissing(String),
}
