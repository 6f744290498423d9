//! Policy parameters and roster configuration.
//!
//! [`PolicyParams`] holds the tunable knobs of a model build.
//! [`RosterConfig`] is the serializable description of a whole roster
//! (departments, doctors, policy, one-off unavailability), loadable from
//! JSON and convertible into a [`RosterRegistry`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::models::{
    parse_weekday, Department, DepartmentTable, RosterRegistry, ShiftType, WorkloadClass,
};

/// Tunable parameters of the scheduling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    /// Slack added to the per-doctor maximum shift count.
    pub relaxation: u32,
    /// Minimum doctors on every shift (≥ 1).
    pub min_doctors_per_shift: u32,
    /// Maximum doctors on every shift (≥ `min_doctors_per_shift`).
    pub max_doctors_per_shift: u32,
    /// Absolute monthly ceiling per doctor (≥ 1).
    pub max_shifts_per_doctor: u32,
    /// Full rest days required after a night shift (≥ 1).
    pub rest_length: u32,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            relaxation: 0,
            min_doctors_per_shift: 1,
            max_doctors_per_shift: 1,
            max_shifts_per_doctor: 6,
            rest_length: 1,
        }
    }
}

impl PolicyParams {
    pub fn with_relaxation(mut self, relaxation: u32) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Sets both staffing bounds.
    pub fn with_staffing(mut self, min: u32, max: u32) -> Self {
        self.min_doctors_per_shift = min;
        self.max_doctors_per_shift = max;
        self
    }

    pub fn with_max_shifts_per_doctor(mut self, max: u32) -> Self {
        self.max_shifts_per_doctor = max;
        self
    }

    pub fn with_rest_length(mut self, days: u32) -> Self {
        self.rest_length = days;
        self
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_doctors_per_shift < 1 {
            return Err(ConfigError::InvalidPolicy(
                "min_doctors_per_shift must be at least 1".into(),
            ));
        }
        if self.max_doctors_per_shift < self.min_doctors_per_shift {
            return Err(ConfigError::InvalidPolicy(format!(
                "max_doctors_per_shift ({}) is below min_doctors_per_shift ({})",
                self.max_doctors_per_shift, self.min_doctors_per_shift
            )));
        }
        if self.max_shifts_per_doctor < 1 {
            return Err(ConfigError::InvalidPolicy(
                "max_shifts_per_doctor must be at least 1".into(),
            ));
        }
        if self.rest_length < 1 {
            return Err(ConfigError::InvalidPolicy(
                "rest_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A doctor unavailable for one specific shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unavailability {
    pub doctor: String,
    /// Zero-based day index.
    pub day: usize,
    pub shift: ShiftType,
}

impl Unavailability {
    pub fn new(doctor: impl Into<String>, day: usize, shift: ShiftType) -> Self {
        Self {
            doctor: doctor.into(),
            day,
            shift,
        }
    }
}

/// Serialized blackout rule, e.g. `{"weekday": "monday", "shift": "night"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutConfig {
    pub weekday: String,
    pub shift: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub workload: WorkloadClass,
    #[serde(default)]
    pub blackout: Vec<BlackoutConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorConfig {
    pub id: String,
    pub department: String,
}

/// Serialized one-off unavailability; `day_of_month` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityConfig {
    pub doctor: String,
    pub day_of_month: usize,
    pub shift: String,
}

/// Clock times of each shift, e.g. `"8:00-16:00"`. Display only; the model
/// does not use them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night: Option<String>,
}

impl ShiftHours {
    pub fn of(&self, shift: ShiftType) -> Option<&str> {
        match shift {
            ShiftType::Morning => self.morning.as_deref(),
            ShiftType::Night => self.night.as_deref(),
        }
    }
}

/// Complete roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub departments: Vec<DepartmentConfig>,
    pub doctors: Vec<DoctorConfig>,
    #[serde(default)]
    pub policy: PolicyParams,
    #[serde(default)]
    pub unavailable: Vec<UnavailabilityConfig>,
    #[serde(default)]
    pub shift_hours: ShiftHours,
}

impl RosterConfig {
    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Converts the department list into a [`DepartmentTable`].
    pub fn department_table(&self) -> std::result::Result<DepartmentTable, ConfigError> {
        let mut departments = Vec::with_capacity(self.departments.len());
        for dep in &self.departments {
            let mut department = Department::new(&dep.name)
                .with_description(&dep.description)
                .with_workload(dep.workload);
            for rule in &dep.blackout {
                let weekday = parse_weekday(&rule.weekday)?;
                let shift: ShiftType = rule.shift.parse()?;
                department = department.with_blackout(weekday, shift);
            }
            departments.push(department);
        }
        DepartmentTable::new(departments)
    }

    /// Builds the registry for this roster.
    pub fn registry(&self) -> std::result::Result<RosterRegistry, ConfigError> {
        RosterRegistry::new(
            self.doctors
                .iter()
                .map(|d| (d.id.as_str(), d.department.as_str())),
            self.department_table()?,
        )
    }

    /// Converts the one-off unavailability entries to zero-based day indices.
    pub fn unavailability(&self) -> std::result::Result<Vec<Unavailability>, ConfigError> {
        self.unavailable
            .iter()
            .map(|u| {
                if u.day_of_month == 0 {
                    return Err(ConfigError::ZeroDayOfMonth {
                        doctor: u.doctor.clone(),
                    });
                }
                Ok(Unavailability::new(
                    &u.doctor,
                    u.day_of_month - 1,
                    u.shift.parse()?,
                ))
            })
            .collect()
    }

    /// The obstetrics and gynaecology roster the system was first built for:
    /// six departments, twelve doctors, relaxation 3.
    pub fn obstetrics() -> Self {
        fn blackout(rules: &[(&str, &str)]) -> Vec<BlackoutConfig> {
            rules
                .iter()
                .map(|(weekday, shift)| BlackoutConfig {
                    weekday: (*weekday).into(),
                    shift: (*shift).into(),
                })
                .collect()
        }
        fn department(
            name: &str,
            description: &str,
            workload: WorkloadClass,
            rules: &[(&str, &str)],
        ) -> DepartmentConfig {
            DepartmentConfig {
                name: name.into(),
                description: description.into(),
                workload,
                blackout: blackout(rules),
            }
        }

        let departments = vec![
            department(
                "reparto_ostetricia",
                "Obstetrics ward",
                WorkloadClass::Low,
                &[
                    ("monday", "night"),
                    ("tuesday", "morning"),
                    ("tuesday", "night"),
                    ("friday", "night"),
                    ("saturday", "morning"),
                    ("saturday", "night"),
                    ("sunday", "morning"),
                ],
            ),
            department(
                "ambulatorio_ostetricia",
                "Obstetrics outpatient clinic",
                WorkloadClass::High,
                &[],
            ),
            department(
                "day_hospital_ostetricia",
                "Obstetrics day hospital",
                WorkloadClass::High,
                &[
                    ("monday", "night"),
                    ("tuesday", "morning"),
                    ("tuesday", "night"),
                    ("wednesday", "night"),
                    ("thursday", "morning"),
                    ("thursday", "night"),
                ],
            ),
            department(
                "reparto_ginecologia",
                "Gynaecology ward",
                WorkloadClass::Low,
                &[
                    ("monday", "morning"),
                    ("monday", "night"),
                    ("tuesday", "morning"),
                    ("tuesday", "night"),
                    ("friday", "night"),
                    ("saturday", "morning"),
                    ("saturday", "night"),
                    ("sunday", "morning"),
                ],
            ),
            department(
                "ambulatorio_ginecologia",
                "Gynaecology outpatient clinic",
                WorkloadClass::High,
                &[],
            ),
            department("sala_operatoria", "Operating theatre", WorkloadClass::High, &[]),
        ];

        let doctors = [
            ("r_ost_1", "reparto_ostetricia"),
            ("r_ost_2", "reparto_ostetricia"),
            ("r_ost_3", "reparto_ostetricia"),
            ("a_ost_1", "ambulatorio_ostetricia"),
            ("a_ost_2", "ambulatorio_ostetricia"),
            ("alessia", "day_hospital_ostetricia"),
            ("r_gine_1", "reparto_ginecologia"),
            ("r_gine_2", "reparto_ginecologia"),
            ("a_gine_1", "ambulatorio_ginecologia"),
            ("a_gine_2", "ambulatorio_ginecologia"),
            ("a_gine_3", "ambulatorio_ginecologia"),
            ("sala_operatoria", "sala_operatoria"),
        ]
        .into_iter()
        .map(|(id, department)| DoctorConfig {
            id: id.into(),
            department: department.into(),
        })
        .collect();

        Self {
            departments,
            doctors,
            policy: PolicyParams::default().with_relaxation(3),
            unavailable: Vec::new(),
            shift_hours: ShiftHours {
                morning: Some("8:00-16:00".into()),
                night: Some("20:00-4:00".into()),
            },
        }
    }
}
