//! Roster auditing and workload statistics.
//!
//! [`audit_roster`] re-checks a decoded roster against every hard rule the
//! model encodes, independently of the solver. [`RosterStats`] summarizes
//! per-doctor and per-department load.
//!
//! # Checks
//!
//! | Rule | Violation |
//! |------|-----------|
//! | One shift per day | `SameDayDouble` |
//! | Rest after a night | `RestAfterNight` |
//! | Doctors per shift | `Staffing` |
//! | Department blackouts | `Blackout` |
//! | Per-doctor range | `ShiftRange` |
//! | Per-doctor cap | `ShiftCap` |
//! | One-off unavailability | `Unavailable` |

mod stats;

pub use stats::{DepartmentLoad, RosterStats};

use std::collections::HashSet;

use crate::config::{PolicyParams, Unavailability};
use crate::models::{MonthCalendar, Roster, RosterRegistry, ShiftType, Violation, ViolationType};

/// Checks `roster` against the rostering rules.
///
/// Returns every violation found; an empty list means the roster satisfies
/// all hard rules.
pub fn audit_roster(
    roster: &Roster,
    registry: &RosterRegistry,
    calendar: &MonthCalendar,
    policy: &PolicyParams,
    unavailable: &[Unavailability],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let num_days = calendar.num_days();
    let working: HashSet<(&str, usize, ShiftType)> = roster
        .assignments
        .iter()
        .map(|a| (a.doctor.as_str(), a.day, a.shift))
        .collect();
    let works =
        |doctor: &str, day: usize, shift: ShiftType| working.contains(&(doctor, day, shift));

    for doctor in registry.doctors() {
        for day in 0..num_days {
            if works(doctor, day, ShiftType::Morning) && works(doctor, day, ShiftType::Night) {
                violations.push(Violation::new(
                    ViolationType::SameDayDouble,
                    doctor,
                    format!("works both shifts on day {}", day + 1),
                ));
            }
            if !works(doctor, day, ShiftType::Night) {
                continue;
            }
            for gap in 1..=policy.rest_length as usize {
                let next = day + gap;
                if next >= num_days {
                    break;
                }
                for shift in ShiftType::ALL {
                    if works(doctor, next, shift) {
                        violations.push(Violation::new(
                            ViolationType::RestAfterNight,
                            doctor,
                            format!(
                                "works the {shift} shift on day {} after a night on day {}",
                                next + 1,
                                day + 1
                            ),
                        ));
                    }
                }
            }
        }
    }

    for day in 0..num_days {
        for shift in ShiftType::ALL {
            let count = roster.doctors_on(day, shift).len();
            let (min, max) = (
                policy.min_doctors_per_shift as usize,
                policy.max_doctors_per_shift as usize,
            );
            if count < min || count > max {
                violations.push(Violation::new(
                    ViolationType::Staffing,
                    format!("{day}:{shift}"),
                    format!(
                        "{count} doctors on day {} {shift}, expected {min}..={max}",
                        day + 1
                    ),
                ));
            }
        }
    }

    for a in &roster.assignments {
        let blacked_out = registry
            .department(&a.department)
            .is_some_and(|d| d.is_blacked_out(a.weekday, a.shift));
        if blacked_out {
            violations.push(Violation::new(
                ViolationType::Blackout,
                &a.doctor,
                format!(
                    "{} does not staff {} shifts on {}",
                    a.department, a.shift, a.weekday
                ),
            ));
        }
    }

    let loads = roster.load_by_doctor();
    if !registry.doctors().is_empty() {
        let min_shifts = num_days / registry.doctor_count();
        let max_shifts = min_shifts + 1 + policy.relaxation as usize;
        for doctor in registry.doctors() {
            let load = loads.get(doctor.as_str()).copied().unwrap_or(0);
            if load < min_shifts || load > max_shifts {
                violations.push(Violation::new(
                    ViolationType::ShiftRange,
                    doctor,
                    format!("{load} shifts, expected {min_shifts}..={max_shifts}"),
                ));
            }
            if load > policy.max_shifts_per_doctor as usize {
                violations.push(Violation::new(
                    ViolationType::ShiftCap,
                    doctor,
                    format!("{load} shifts, cap is {}", policy.max_shifts_per_doctor),
                ));
            }
        }
    }

    for slot in unavailable {
        if works(&slot.doctor, slot.day, slot.shift) {
            violations.push(Violation::new(
                ViolationType::Unavailable,
                &slot.doctor,
                format!(
                    "scheduled on unavailable {} shift of day {}",
                    slot.shift,
                    slot.day + 1
                ),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, DepartmentTable, ShiftAssignment};
    use chrono::Weekday;

    fn fixture() -> (RosterRegistry, MonthCalendar) {
        let table = DepartmentTable::new(vec![
            Department::new("ward").with_blackout(Weekday::Mon, ShiftType::Night),
        ])
        .unwrap();
        let registry =
            RosterRegistry::new([("a", "ward"), ("b", "ward"), ("c", "ward")], table).unwrap();
        // June 2026: 30 days, day 0 is a Monday
        let calendar = MonthCalendar::from_year_month(2026, 6).unwrap();
        (registry, calendar)
    }

    fn assign(
        roster: &mut Roster,
        calendar: &MonthCalendar,
        doctor: &str,
        day: usize,
        shift: ShiftType,
    ) {
        roster.add_assignment(ShiftAssignment {
            doctor: doctor.into(),
            department: "ward".into(),
            day,
            date: calendar.date_of(day).unwrap(),
            weekday: calendar.weekday_of(day).unwrap(),
            shift,
        });
    }

    /// Three-doctor rotation: (morning, night) = (a, b), (c, a), (b, c), ...
    /// It ignores the Monday-night blackout.
    fn rotation(calendar: &MonthCalendar) -> Roster {
        let (registry, _) = fixture();
        let mut roster = Roster::new(calendar, registry.doctors().to_vec());
        let cycle = [("a", "b"), ("c", "a"), ("b", "c")];
        for day in 0..calendar.num_days() {
            let (m, n) = cycle[day % 3];
            assign(&mut roster, calendar, m, day, ShiftType::Morning);
            assign(&mut roster, calendar, n, day, ShiftType::Night);
        }
        roster
    }

    fn kinds(violations: &[Violation]) -> HashSet<ViolationType> {
        violations.iter().map(|v| v.violation_type.clone()).collect()
    }

    #[test]
    fn test_rotation_only_breaks_blackout() {
        let (registry, calendar) = fixture();
        let roster = rotation(&calendar);
        let policy = PolicyParams::default()
            .with_relaxation(10)
            .with_max_shifts_per_doctor(20);
        let violations = audit_roster(&roster, &registry, &calendar, &policy, &[]);
        // Every Monday night is staffed by a ward doctor.
        assert!(violations
            .iter()
            .all(|v| v.violation_type == ViolationType::Blackout));
        assert_eq!(violations.len(), calendar.days_of(Weekday::Mon).len());
    }

    #[test]
    fn test_detects_rest_and_double() {
        let (registry, calendar) = fixture();
        let mut roster = Roster::new(&calendar, registry.doctors().to_vec());
        assign(&mut roster, &calendar, "a", 1, ShiftType::Morning);
        assign(&mut roster, &calendar, "a", 1, ShiftType::Night);
        assign(&mut roster, &calendar, "a", 2, ShiftType::Morning);
        let policy = PolicyParams::default();
        let found = kinds(&audit_roster(&roster, &registry, &calendar, &policy, &[]));
        assert!(found.contains(&ViolationType::SameDayDouble));
        assert!(found.contains(&ViolationType::RestAfterNight));
        assert!(found.contains(&ViolationType::Staffing));
        assert!(found.contains(&ViolationType::ShiftRange));
    }

    #[test]
    fn test_rest_length_window() {
        let (registry, calendar) = fixture();
        let mut roster = Roster::new(&calendar, registry.doctors().to_vec());
        assign(&mut roster, &calendar, "b", 2, ShiftType::Night);
        assign(&mut roster, &calendar, "b", 4, ShiftType::Morning);

        let short = PolicyParams::default();
        let rest = |v: &[Violation]| {
            v.iter()
                .filter(|v| v.violation_type == ViolationType::RestAfterNight)
                .count()
        };
        assert_eq!(rest(&audit_roster(&roster, &registry, &calendar, &short, &[])), 0);
        let long = PolicyParams::default().with_rest_length(2);
        assert_eq!(rest(&audit_roster(&roster, &registry, &calendar, &long, &[])), 1);
    }

    #[test]
    fn test_recorded_findings_invalidate_roster() {
        let (registry, calendar) = fixture();
        let mut roster = rotation(&calendar);
        assert!(roster.is_valid());
        let policy = PolicyParams::default()
            .with_relaxation(10)
            .with_max_shifts_per_doctor(20);
        roster.violations = audit_roster(&roster, &registry, &calendar, &policy, &[]);
        assert!(!roster.is_valid());
    }

    #[test]
    fn test_cap_and_unavailable() {
        let (registry, calendar) = fixture();
        let roster = rotation(&calendar);
        let policy = PolicyParams::default().with_relaxation(10);
        let unavailable = [Unavailability::new("a", 0, ShiftType::Morning)];
        let violations = audit_roster(&roster, &registry, &calendar, &policy, &unavailable);
        let found = kinds(&violations);
        assert!(found.contains(&ViolationType::ShiftCap));
        assert!(found.contains(&ViolationType::Unavailable));
        let unavailable_for: Vec<&str> = violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::Unavailable)
            .map(|v| v.entity_id.as_str())
            .collect();
        assert_eq!(unavailable_for, ["a"]);
    }
}
