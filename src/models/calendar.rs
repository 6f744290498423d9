//! Month calendar and shift types.
//!
//! Translates a target month into the two lookup structures the constraint
//! generators need: day index → weekday, and weekday → day indices.
//!
//! # Day Model
//! Day indices are 0-based and contiguous: index `i` is day-of-month `i + 1`.
//! Weekdays use the ISO numbering shifted to zero (Monday = 0, Sunday = 6).
//!
//! # Invariant
//! Every index `0..num_days` appears in exactly one weekday bucket, and
//! `weekday_to_days[day_to_weekday[i]]` contains `i`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, RosterError};

/// Weekdays in index order (Monday = 0).
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Zero-based weekday index (Monday = 0).
#[inline]
pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// Full English weekday name, as used in roster output.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses a weekday from a full or abbreviated English name, or from its
/// zero-based index (`"0"` = Monday).
pub fn parse_weekday(s: &str) -> std::result::Result<Weekday, ConfigError> {
    let trimmed = s.trim();
    if let Ok(idx) = trimmed.parse::<usize>() {
        return WEEKDAYS
            .get(idx)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWeekday(s.to_string()));
    }
    trimmed
        .parse::<Weekday>()
        .map_err(|_| ConfigError::UnknownWeekday(s.to_string()))
}

/// One of the two schedulable windows of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Morning,
    Night,
}

impl ShiftType {
    /// Both shift types in index order.
    pub const ALL: [ShiftType; 2] = [ShiftType::Morning, ShiftType::Night];

    /// Index used in the variable space (morning = 0, night = 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ShiftType::Morning => 0,
            ShiftType::Night => 1,
        }
    }

    /// Inverse of [`ShiftType::index`].
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ShiftType::Morning => "morning",
            ShiftType::Night => "night",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShiftType {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "0" => Ok(ShiftType::Morning),
            "night" | "1" => Ok(ShiftType::Night),
            _ => Err(ConfigError::UnknownShift(s.to_string())),
        }
    }
}

/// Day/weekday mapping for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCalendar {
    year: i32,
    month: u32,
    /// `day_to_weekday[i]` is the weekday of day index `i`.
    day_to_weekday: Vec<Weekday>,
    /// Ascending day indices per weekday index.
    weekday_to_days: [Vec<usize>; 7],
}

impl MonthCalendar {
    /// Resolves the month containing `date`.
    ///
    /// Accepts `YYYY-MM-DD` (the day component is ignored) or `YYYY-MM`.
    ///
    /// # Errors
    /// [`RosterError::Parse`] if the string is not a valid calendar date.
    pub fn resolve(date: &str) -> Result<Self> {
        let trimmed = date.trim();
        let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").or_else(|full_err| {
            if trimmed.matches('-').count() == 1 {
                NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            } else {
                Err(full_err)
            }
        });
        let parsed = parsed.map_err(|e| RosterError::Parse {
            input: date.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_year_month(parsed.year(), parsed.month())
    }

    /// Builds the calendar for `(year, month)`, month being 1-based.
    pub fn from_year_month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| RosterError::Parse {
            input: format!("{year}-{month}"),
            reason: "no such month".into(),
        })?;
        let num_days = days_in_month(first);

        let mut day_to_weekday = Vec::with_capacity(num_days);
        let mut weekday_to_days: [Vec<usize>; 7] = Default::default();
        for (day, date) in first.iter_days().take(num_days).enumerate() {
            let weekday = date.weekday();
            day_to_weekday.push(weekday);
            weekday_to_days[weekday_index(weekday)].push(day);
        }

        Ok(Self {
            year,
            month,
            day_to_weekday,
            weekday_to_days,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in the month (28–31).
    #[inline]
    pub fn num_days(&self) -> usize {
        self.day_to_weekday.len()
    }

    /// Weekday of every day index.
    pub fn day_to_weekday(&self) -> &[Weekday] {
        &self.day_to_weekday
    }

    /// Weekday of a single day index.
    pub fn weekday_of(&self, day: usize) -> Option<Weekday> {
        self.day_to_weekday.get(day).copied()
    }

    /// Day indices falling on `weekday`, ascending.
    pub fn days_of(&self, weekday: Weekday) -> &[usize] {
        &self.weekday_to_days[weekday_index(weekday)]
    }

    /// Calendar date of a day index.
    pub fn date_of(&self, day: usize) -> Option<NaiveDate> {
        if day >= self.num_days() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, day as u32 + 1)
    }

    /// Rejects day indices outside the month.
    pub fn check_day(&self, day: usize) -> std::result::Result<(), ConfigError> {
        if day < self.num_days() {
            Ok(())
        } else {
            Err(ConfigError::DayOutOfRange {
                day,
                num_days: self.num_days(),
            })
        }
    }
}

fn days_in_month(first: NaiveDate) -> usize {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    match NaiveDate::from_ymd_opt(y, m, 1) {
        Some(next) => (next - first).num_days() as usize,
        // Only reachable for December of chrono's maximum year.
        None => 31,
    }
}
