//! Rostering domain models.
//!
//! Provides the data types describing a rostering problem (calendar,
//! departments, doctor membership) and its solution (roster, violations).
//!
//! # Domain Mappings
//!
//! | u-roster | Hospital | Manufacturing | Call center |
//! |----------|----------|---------------|-------------|
//! | Doctor | Physician | Operator | Agent |
//! | Department | Ward/Clinic | Line | Team |
//! | ShiftType | Morning/Night | Day/Night | Early/Late |
//! | Roster | Monthly rota | Crew plan | Staffing plan |

mod calendar;
mod department;
mod registry;
mod roster;

pub use calendar::{parse_weekday, weekday_index, weekday_name, MonthCalendar, ShiftType, WEEKDAYS};
pub use department::{BlackoutRule, Department, DepartmentTable, WorkloadClass};
pub use registry::RosterRegistry;
pub use roster::{AssignmentRecord, Roster, ShiftAssignment, Violation, ViolationType};
