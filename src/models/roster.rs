//! Roster (solution) model.
//!
//! A roster is the decoded result of a solve: the set of (doctor, day, shift)
//! triples whose decision variable came back as 1, plus any rule violations
//! found when auditing it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::calendar::{weekday_name, MonthCalendar, ShiftType};

/// A doctor working one shift on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub doctor: String,
    /// Department of the doctor (denormalized for reporting).
    pub department: String,
    /// Zero-based day index within the month.
    pub day: usize,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub shift: ShiftType,
}

/// One line of roster output.
///
/// `working == false` lines are only produced on request; absence from the
/// assignment list already means the doctor is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub doctor: String,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub shift: ShiftType,
    pub working: bool,
    /// Clock times of the shift, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

impl AssignmentRecord {
    pub fn with_hours(mut self, hours: Option<&str>) -> Self {
        self.hours = hours.map(str::to_string);
        self
    }
}

impl fmt::Display for AssignmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::Datelike;
        let verb = if self.working {
            "is working on"
        } else {
            "is not working on"
        };
        write!(
            f,
            "{} {} {} | {}-{}-{} | {}",
            self.doctor,
            verb,
            weekday_name(self.weekday),
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.shift
        )?;
        if let Some(hours) = &self.hours {
            write!(f, " ({hours})")?;
        }
        Ok(())
    }
}

/// A rule broken by a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationType,
    /// Doctor, department, or `"day:shift"` slot the violation concerns.
    pub entity_id: String,
    pub message: String,
}

/// Classification of roster violations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Both shifts of the same day.
    SameDayDouble,
    /// Working within the rest window after a night shift.
    RestAfterNight,
    /// Too few or too many doctors on a shift.
    Staffing,
    /// Shift on a department blackout.
    Blackout,
    /// Monthly total outside the per-doctor range.
    ShiftRange,
    /// Monthly total above the absolute cap.
    ShiftCap,
    /// Shift on an explicitly unavailable slot.
    Unavailable,
}

impl Violation {
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// A monthly roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub year: i32,
    pub month: u32,
    /// Every rostered doctor, in registry order, including idle ones.
    pub doctors: Vec<String>,
    pub num_days: usize,
    /// Positive assignments, ordered by doctor, day, shift.
    pub assignments: Vec<ShiftAssignment>,
    pub violations: Vec<Violation>,
}

impl Roster {
    /// Creates an empty roster for the given month and doctors.
    pub fn new(calendar: &MonthCalendar, doctors: Vec<String>) -> Self {
        Self {
            year: calendar.year(),
            month: calendar.month(),
            doctors,
            num_days: calendar.num_days(),
            assignments: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn add_assignment(&mut self, assignment: ShiftAssignment) {
        self.assignments.push(assignment);
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether `doctor` works `shift` on day index `day`.
    pub fn is_working(&self, doctor: &str, day: usize, shift: ShiftType) -> bool {
        self.assignments
            .iter()
            .any(|a| a.doctor == doctor && a.day == day && a.shift == shift)
    }

    /// Doctors on (`day`, `shift`).
    pub fn doctors_on(&self, day: usize, shift: ShiftType) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.day == day && a.shift == shift)
            .map(|a| a.doctor.as_str())
            .collect()
    }

    /// Monthly shift count per doctor. Idle doctors map to 0.
    pub fn load_by_doctor(&self) -> HashMap<&str, usize> {
        let mut loads: HashMap<&str, usize> =
            self.doctors.iter().map(|d| (d.as_str(), 0)).collect();
        for a in &self.assignments {
            *loads.entry(a.doctor.as_str()).or_default() += 1;
        }
        loads
    }

    /// Output records in (doctor, day, shift) order.
    ///
    /// With `include_off`, every slot a doctor is not working is listed
    /// explicitly as well.
    pub fn records(&self, calendar: &MonthCalendar, include_off: bool) -> Vec<AssignmentRecord> {
        let on: HashSet<(&str, usize, ShiftType)> = self
            .assignments
            .iter()
            .map(|a| (a.doctor.as_str(), a.day, a.shift))
            .collect();

        let mut records = Vec::new();
        for doctor in &self.doctors {
            for day in 0..self.num_days {
                let (Some(date), Some(weekday)) = (calendar.date_of(day), calendar.weekday_of(day))
                else {
                    continue;
                };
                for shift in ShiftType::ALL {
                    let working = on.contains(&(doctor.as_str(), day, shift));
                    if working || include_off {
                        records.push(AssignmentRecord {
                            doctor: doctor.clone(),
                            date,
                            weekday,
                            shift,
                            working,
                            hours: None,
                        });
                    }
                }
            }
        }
        records
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}
