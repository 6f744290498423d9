//! Department model.
//!
//! A department groups doctors and carries the static rules that apply to
//! all of them: weekday/shift blackouts and a workload class used to bias
//! total workload between department groups.

use std::collections::{BTreeSet, HashMap};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::calendar::{weekday_index, ShiftType, WEEKDAYS};
use crate::error::ConfigError;

/// Department workload classification.
///
/// Only `Low` and `High` take part in the cross-department ratio
/// constraint; `Medium` departments are left unconstrained by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadClass {
    Low,
    #[default]
    Medium,
    High,
}

/// "No doctor of this department works `shift` on any `weekday` of the month."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlackoutRule {
    /// Zero-based weekday (Monday = 0).
    weekday: u8,
    pub shift: ShiftType,
}

impl BlackoutRule {
    pub fn new(weekday: Weekday, shift: ShiftType) -> Self {
        Self {
            weekday: weekday_index(weekday) as u8,
            shift,
        }
    }

    pub fn weekday(&self) -> Weekday {
        WEEKDAYS[self.weekday as usize % 7]
    }
}

/// A hospital department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique department name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    pub workload: WorkloadClass,
    /// Weekday/shift combinations nobody in the department may staff.
    pub blackout: BTreeSet<BlackoutRule>,
}

impl Department {
    /// Creates a medium-workload department without blackout rules.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            workload: WorkloadClass::default(),
            blackout: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_workload(mut self, workload: WorkloadClass) -> Self {
        self.workload = workload;
        self
    }

    /// Adds a blackout rule.
    pub fn with_blackout(mut self, weekday: Weekday, shift: ShiftType) -> Self {
        self.blackout.insert(BlackoutRule::new(weekday, shift));
        self
    }

    /// Whether `shift` on `weekday` is blacked out.
    pub fn is_blacked_out(&self, weekday: Weekday, shift: ShiftType) -> bool {
        self.blackout.contains(&BlackoutRule::new(weekday, shift))
    }
}

/// Immutable department configuration, keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentTable {
    departments: Vec<Department>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DepartmentTable {
    /// Builds a table, rejecting duplicate names.
    pub fn new(departments: Vec<Department>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(departments.len());
        for (i, dep) in departments.iter().enumerate() {
            if index.insert(dep.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateDepartment(dep.name.clone()));
            }
        }
        Ok(Self { departments, index })
    }

    pub fn get(&self, name: &str) -> Option<&Department> {
        self.index.get(name).map(|&i| &self.departments[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a department in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Department> {
        self.departments.iter()
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}
