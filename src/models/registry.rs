//! Roster registry: who works in which department.
//!
//! Built once per run from a doctor → department mapping and the department
//! table. Pure data; lookups only.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::department::{BlackoutRule, Department, DepartmentTable, WorkloadClass};
use crate::error::ConfigError;

/// Doctor/department membership for one roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterRegistry {
    departments: DepartmentTable,
    /// Doctor ids in insertion order.
    doctors: Vec<String>,
    /// Doctor id → department name.
    membership: HashMap<String, String>,
    /// Department name → member doctor ids in insertion order.
    members: HashMap<String, Vec<String>>,
}

impl RosterRegistry {
    /// Builds the registry.
    ///
    /// # Errors
    /// - [`ConfigError::UnknownDepartment`] if a doctor references a department
    ///   missing from `departments`.
    /// - [`ConfigError::DuplicateDoctor`] if a doctor id appears twice.
    pub fn new<I, D, P>(doctors: I, departments: DepartmentTable) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (D, P)>,
        D: Into<String>,
        P: Into<String>,
    {
        let mut order = Vec::new();
        let mut membership = HashMap::new();
        let mut members: HashMap<String, Vec<String>> = HashMap::new();

        for (doctor, department) in doctors {
            let doctor = doctor.into();
            let department = department.into();

            if !departments.contains(&department) {
                return Err(ConfigError::UnknownDepartment { doctor, department });
            }
            if membership.contains_key(&doctor) {
                return Err(ConfigError::DuplicateDoctor(doctor));
            }

            members
                .entry(department.clone())
                .or_default()
                .push(doctor.clone());
            membership.insert(doctor.clone(), department);
            order.push(doctor);
        }

        Ok(Self {
            departments,
            doctors: order,
            membership,
            members,
        })
    }

    /// All doctors in insertion order.
    pub fn doctors(&self) -> &[String] {
        &self.doctors
    }

    pub fn doctor_count(&self) -> usize {
        self.doctors.len()
    }

    /// Members of `department` in insertion order. Empty if it has none.
    pub fn doctors_of(&self, department: &str) -> &[String] {
        self.members
            .get(department)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Department of `doctor`.
    pub fn department_of(&self, doctor: &str) -> Result<&str, ConfigError> {
        self.membership
            .get(doctor)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownDoctor(doctor.to_string()))
    }

    /// Blackout rules of `department`. Empty when none are configured.
    pub fn blackout_rules_of(&self, department: &str) -> BTreeSet<BlackoutRule> {
        self.departments
            .get(department)
            .map(|d| d.blackout.clone())
            .unwrap_or_default()
    }

    pub fn department(&self, name: &str) -> Option<&Department> {
        self.departments.get(name)
    }

    /// Declaration-order position of `department` in the table.
    pub fn department_position(&self, department: &str) -> Option<usize> {
        self.departments.position(department)
    }

    /// All configured departments in declaration order.
    pub fn departments(&self) -> impl Iterator<Item = &Department> {
        self.departments.iter()
    }

    /// Departments with at least one doctor, in declaration order.
    pub fn staffed_departments(&self) -> impl Iterator<Item = &Department> {
        self.departments
            .iter()
            .filter(|d| !self.doctors_of(&d.name).is_empty())
    }

    /// Departments of the given workload class, in declaration order.
    pub fn departments_with_workload(
        &self,
        workload: WorkloadClass,
    ) -> impl Iterator<Item = &Department> {
        self.departments.iter().filter(move |d| d.workload == workload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use chrono::Weekday;

    fn table() -> DepartmentTable {
        DepartmentTable::new(vec![
            Department::new("reparto")
                .with_workload(WorkloadClass::Low)
                .with_blackout(Weekday::Mon, ShiftType::Night),
            Department::new("ambulatorio").with_workload(WorkloadClass::High),
            Department::new("empty"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let reg = RosterRegistry::new(
            [("r1", "reparto"), ("a1", "ambulatorio"), ("r2", "reparto")],
            table(),
        )
        .unwrap();

        assert_eq!(reg.doctors(), ["r1", "a1", "r2"]);
        assert_eq!(reg.doctors_of("reparto"), ["r1", "r2"]);
        assert!(reg.doctors_of("empty").is_empty());
        assert_eq!(reg.department_of("a1"), Ok("ambulatorio"));
        assert_eq!(reg.department_position("ambulatorio"), Some(1));
        assert_eq!(reg.department_position("nowhere"), None);
        assert_eq!(
            reg.department_of("zz"),
            Err(ConfigError::UnknownDoctor("zz".into()))
        );
    }

    #[test]
    fn test_blackout_rules() {
        let reg = RosterRegistry::new([("r1", "reparto")], table()).unwrap();
        let rules = reg.blackout_rules_of("reparto");
        assert_eq!(rules.len(), 1);
        assert!(rules.contains(&BlackoutRule::new(Weekday::Mon, ShiftType::Night)));
        assert!(reg.blackout_rules_of("ambulatorio").is_empty());
        assert!(reg.blackout_rules_of("nowhere").is_empty());
    }

    #[test]
    fn test_unknown_department() {
        let err = RosterRegistry::new([("x", "radiology")], table()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownDepartment {
                doctor: "x".into(),
                department: "radiology".into()
            }
        );
    }

    #[test]
    fn test_duplicate_doctor() {
        let err =
            RosterRegistry::new([("r1", "reparto"), ("r1", "ambulatorio")], table()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateDoctor("r1".into()));
    }

    #[test]
    fn test_staffed_and_workload_filters() {
        let reg = RosterRegistry::new([("r1", "reparto"), ("a1", "ambulatorio")], table()).unwrap();
        let staffed: Vec<&str> = reg.staffed_departments().map(|d| d.name.as_str()).collect();
        assert_eq!(staffed, ["reparto", "ambulatorio"]);
        let low: Vec<&str> = reg
            .departments_with_workload(WorkloadClass::Low)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(low, ["reparto"]);
    }
}
