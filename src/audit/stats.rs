//! Workload statistics of a roster.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Load | Shifts worked by one doctor in the month |
//! | Department floor / ceiling | Smallest / largest member load |
//! | Spread | Ceiling minus floor |
//! | Night share | Fraction of a doctor's shifts that are nights |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Roster, RosterRegistry, ShiftType};

/// Load summary of one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentLoad {
    pub members: usize,
    /// Total shifts worked by the department's doctors.
    pub total: usize,
    pub floor: usize,
    pub ceiling: usize,
}

impl DepartmentLoad {
    pub fn spread(&self) -> usize {
        self.ceiling - self.floor
    }
}

/// Per-doctor and per-department load of a roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterStats {
    /// Shifts per doctor, including doctors with no shift.
    pub load_by_doctor: BTreeMap<String, usize>,
    /// Night shifts per doctor.
    pub nights_by_doctor: BTreeMap<String, usize>,
    /// Load summary of each staffed department.
    pub by_department: BTreeMap<String, DepartmentLoad>,
    /// Sum of department spreads; equals the fairness objective at optimum.
    pub total_spread: usize,
}

impl RosterStats {
    /// Computes statistics for `roster` over the doctors in `registry`.
    pub fn calculate(roster: &Roster, registry: &RosterRegistry) -> Self {
        let mut load_by_doctor: BTreeMap<String, usize> =
            registry.doctors().iter().map(|d| (d.clone(), 0)).collect();
        let mut nights_by_doctor = load_by_doctor.clone();
        for a in &roster.assignments {
            *load_by_doctor.entry(a.doctor.clone()).or_default() += 1;
            if a.shift == ShiftType::Night {
                *nights_by_doctor.entry(a.doctor.clone()).or_default() += 1;
            }
        }

        let mut by_department = BTreeMap::new();
        for department in registry.staffed_departments() {
            let loads: Vec<usize> = registry
                .doctors_of(&department.name)
                .iter()
                .map(|d| load_by_doctor.get(d).copied().unwrap_or(0))
                .collect();
            let summary = DepartmentLoad {
                members: loads.len(),
                total: loads.iter().sum(),
                floor: loads.iter().copied().min().unwrap_or(0),
                ceiling: loads.iter().copied().max().unwrap_or(0),
            };
            by_department.insert(department.name.clone(), summary);
        }
        let total_spread = by_department.values().map(DepartmentLoad::spread).sum();

        Self {
            load_by_doctor,
            nights_by_doctor,
            by_department,
            total_spread,
        }
    }

    /// Fraction of `doctor`'s shifts that are nights (0 if the doctor has no shift).
    pub fn night_share(&self, doctor: &str) -> f64 {
        let load = self.load_by_doctor.get(doctor).copied().unwrap_or(0);
        if load == 0 {
            return 0.0;
        }
        let nights = self.nights_by_doctor.get(doctor).copied().unwrap_or(0);
        nights as f64 / load as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, DepartmentTable, MonthCalendar, ShiftAssignment};

    fn assignment(
        calendar: &MonthCalendar,
        doctor: &str,
        dept: &str,
        day: usize,
        shift: ShiftType,
    ) -> ShiftAssignment {
        ShiftAssignment {
            doctor: doctor.into(),
            department: dept.into(),
            day,
            date: calendar.date_of(day).unwrap(),
            weekday: calendar.weekday_of(day).unwrap(),
            shift,
        }
    }

    #[test]
    fn test_stats() {
        let table = DepartmentTable::new(vec![
            Department::new("ward"),
            Department::new("clinic"),
            Department::new("empty"),
        ])
        .unwrap();
        let registry =
            RosterRegistry::new([("a", "ward"), ("b", "ward"), ("c", "clinic")], table).unwrap();
        let calendar = MonthCalendar::from_year_month(2024, 2).unwrap();
        let mut roster = Roster::new(&calendar, registry.doctors().to_vec());
        roster.add_assignment(assignment(&calendar, "a", "ward", 0, ShiftType::Morning));
        roster.add_assignment(assignment(&calendar, "a", "ward", 2, ShiftType::Night));
        roster.add_assignment(assignment(&calendar, "a", "ward", 5, ShiftType::Night));
        roster.add_assignment(assignment(&calendar, "b", "ward", 1, ShiftType::Morning));
        roster.add_assignment(assignment(&calendar, "c", "clinic", 3, ShiftType::Night));

        let stats = RosterStats::calculate(&roster, &registry);
        assert_eq!(stats.load_by_doctor["a"], 3);
        assert_eq!(stats.load_by_doctor["b"], 1);
        assert_eq!(stats.nights_by_doctor["b"], 0);

        let ward = &stats.by_department["ward"];
        assert_eq!(ward.members, 2);
        assert_eq!(ward.total, 4);
        assert_eq!(ward.spread(), 2);
        assert_eq!(stats.by_department["clinic"].spread(), 0);
        assert!(!stats.by_department.contains_key("empty"));
        assert_eq!(stats.total_spread, 2);

        assert!((stats.night_share("a") - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.night_share("b"), 0.0);
        assert_eq!(stats.night_share("nobody"), 0.0);
    }
}
