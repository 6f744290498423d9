//! Constraint generators.
//!
//! Each generator compiles one policy dimension into named linear
//! constraints on a [`ShiftModel`]. Generators only append constraints;
//! they never read each other's output, so their order only affects the
//! order of the constraint list.
//!
//! Notation: `x[d, t, s]` is 1 iff doctor `d` works shift `s` on day `t`;
//! `load(d) = Σ_t Σ_s x[d, t, s]`.
//!
//! Constraint names identify doctors and departments by their dense
//! positions (assignment index, department table, fairness pairs), never by
//! id, so ids containing `_` cannot make two names collide.

use tracing::{debug, warn};

use super::model::{LinearExpr, Sense, ShiftModel};
use crate::error::{ConfigError, Result};
use crate::models::{MonthCalendar, RosterRegistry, ShiftType};

/// Which side of a department's load range a fairness variable bounds.
///
/// The names follow the doctor being described: the "luckiest" doctor works
/// the least, so `Luckiest` ties the floor variable below every member's
/// load; the "unluckiest" works the most, so `Unluckiest` ties the ceiling
/// variable above every member's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuckMode {
    /// `floor(dept) <= load(d)` for every member `d`.
    Luckiest,
    /// `ceiling(dept) >= load(d)` for every member `d`.
    Unluckiest,
}

/// Rest after shifts.
///
/// For every doctor and day `t`:
/// - `x[d,t,M] + x[d,t,N] <= 1` (one shift per day)
/// - `x[d,t,N] + x[d,t+1,M] <= 1` (no morning after a night)
/// - `x[d,t,N] + x[d,t+1,M] + x[d,t+1,N] <= 1` (the day after a night is off)
///
/// With `rest_length = k > 1`, the day-off rule extends to days `t+2..=t+k`.
/// `rest_length = 1` yields exactly the three families above.
pub fn build_consecutive_shift_constraints(
    model: &mut ShiftModel,
    doctors: &[String],
    num_days: usize,
    rest_length: usize,
) -> Result<()> {
    let before = model.constraint_count();
    for doctor in doctors {
        let d = model.doctor_index(doctor)?;
        for day in 0..num_days {
            let morning = model.assignment(doctor, day, ShiftType::Morning)?;
            let night = model.assignment(doctor, day, ShiftType::Night)?;
            model.add_constraint(
                format!("no_consecutive_{d}_{day}"),
                LinearExpr::sum([morning, night]),
                Sense::LessEq,
                1.0,
            )?;

            for gap in 1..=rest_length {
                let next = day + gap;
                if next >= num_days {
                    break;
                }
                let next_morning = model.assignment(doctor, next, ShiftType::Morning)?;
                let next_night = model.assignment(doctor, next, ShiftType::Night)?;
                if gap == 1 {
                    model.add_constraint(
                        format!("no_consecutive_{d}_{day}_night_{next}_morning"),
                        LinearExpr::sum([night, next_morning]),
                        Sense::LessEq,
                        1.0,
                    )?;
                    model.add_constraint(
                        format!("no_consecutive_{d}_{day}_night_{next}_any"),
                        LinearExpr::sum([night, next_morning, next_night]),
                        Sense::LessEq,
                        1.0,
                    )?;
                } else {
                    model.add_constraint(
                        format!("rest_{d}_{day}_night_{next}"),
                        LinearExpr::sum([night, next_morning, next_night]),
                        Sense::LessEq,
                        1.0,
                    )?;
                }
            }
        }
    }
    debug!(
        added = model.constraint_count() - before,
        rest_length, "consecutive-shift constraints"
    );
    Ok(())
}

/// Staffing: `min <= Σ_d x[d,t,s] <= max` for every day and shift.
pub fn build_doctors_per_shift_constraints(
    model: &mut ShiftModel,
    num_days: usize,
    min_doctors_per_shift: u32,
    max_doctors_per_shift: u32,
) -> Result<()> {
    for shift in ShiftType::ALL {
        for day in 0..num_days {
            let staffed = model.sum_over_doctors(day, shift)?;
            model.add_constraint(
                format!("min_{min_doctors_per_shift}_per_shift_{day}_{}", shift.index()),
                staffed.clone(),
                Sense::GreaterEq,
                f64::from(min_doctors_per_shift),
            )?;
            model.add_constraint(
                format!("max_{max_doctors_per_shift}_per_shift_{day}_{}", shift.index()),
                staffed,
                Sense::LessEq,
                f64::from(max_doctors_per_shift),
            )?;
        }
    }
    Ok(())
}

/// One-off unavailability: `x[doctor, day, shift] == 0`.
pub fn build_custom_constraint(
    model: &mut ShiftModel,
    doctor: &str,
    day: usize,
    shift: ShiftType,
) -> Result<()> {
    let var = model.assignment(doctor, day, shift)?;
    let d = model.doctor_index(doctor)?;
    model.add_constraint(
        format!("custom_constraint_{d}_{day}_{}", shift.index()),
        LinearExpr::sum([var]),
        Sense::Equal,
        0.0,
    )?;
    Ok(())
}

/// Department blackouts: for every rule `(w, s)` of `department`, every day
/// `t` falling on weekday `w` and every member `d`, `x[d,t,s] == 0`.
pub fn build_department_constraints(
    model: &mut ShiftModel,
    registry: &RosterRegistry,
    calendar: &MonthCalendar,
    department: &str,
) -> Result<()> {
    let rules = registry.blackout_rules_of(department);
    let Some(dept) = registry.department_position(department) else {
        return Ok(());
    };
    if rules.is_empty() {
        return Ok(());
    }
    let members = registry.doctors_of(department);
    for rule in &rules {
        for &day in calendar.days_of(rule.weekday()) {
            for doctor in members {
                let d = model.doctor_index(doctor)?;
                let var = model.assignment(doctor, day, rule.shift)?;
                model.add_constraint(
                    format!("blackout_{dept}_{d}_{day}_{}", rule.shift.index()),
                    LinearExpr::sum([var]),
                    Sense::Equal,
                    0.0,
                )?;
            }
        }
    }
    debug!(department, rules = rules.len(), "blackout constraints");
    Ok(())
}

/// Uniform per-doctor shift range.
///
/// With `K` doctors and `N` days, every doctor works between
/// `floor(N / K)` and `floor(N / K) + 1 + relaxation` shifts.
/// Returns the `(min, max)` bounds used.
pub fn build_shifts_range_constraints(
    model: &mut ShiftModel,
    doctors: &[String],
    num_days: usize,
    relaxation: u32,
) -> Result<(usize, usize)> {
    if doctors.is_empty() {
        return Err(ConfigError::EmptyRoster.into());
    }
    let min_shifts = num_days / doctors.len();
    let max_shifts = min_shifts + 1 + relaxation as usize;
    for doctor in doctors {
        let d = model.doctor_index(doctor)?;
        let load = model.sum_over_days_and_shifts(doctor)?;
        model.add_constraint(
            format!("min_shifts_{d}_{min_shifts}"),
            load.clone(),
            Sense::GreaterEq,
            min_shifts as f64,
        )?;
        model.add_constraint(
            format!("max_shifts_{d}_{max_shifts}"),
            load,
            Sense::LessEq,
            max_shifts as f64,
        )?;
    }
    debug!(min_shifts, max_shifts, "shift range constraints");
    Ok((min_shifts, max_shifts))
}

/// Low-workload departments work less per capita than high-workload ones.
///
/// `Σ load(low) <= r · Σ load(high) − r` with `r = |low| / |high|`. The `−r`
/// margin makes the per-capita comparison strict. Returns `false` (and adds
/// nothing) when either department has no doctors.
pub fn build_cross_department_constraint(
    model: &mut ShiftModel,
    registry: &RosterRegistry,
    low: &str,
    high: &str,
) -> Result<bool> {
    let low_doctors = registry.doctors_of(low);
    let high_doctors = registry.doctors_of(high);
    let positions = (
        registry.department_position(low),
        registry.department_position(high),
    );
    let (Some(low_pos), Some(high_pos)) = positions else {
        warn!(low, high, "unknown department, skipping workload ratio");
        return Ok(false);
    };
    if low_doctors.is_empty() || high_doctors.is_empty() {
        warn!(low, high, "department without doctors, skipping workload ratio");
        return Ok(false);
    }

    let ratio = low_doctors.len() as f64 / high_doctors.len() as f64;
    let mut low_sum = LinearExpr::new();
    for doctor in low_doctors {
        low_sum = low_sum.plus(model.sum_over_days_and_shifts(doctor)?);
    }
    let mut high_sum = LinearExpr::new();
    for doctor in high_doctors {
        high_sum = high_sum.plus(model.sum_over_days_and_shifts(doctor)?);
    }

    model.add_constraint(
        format!("cross_department_constraint_{low_pos}_{high_pos}"),
        low_sum.minus(high_sum.scaled(ratio)).with_constant(ratio),
        Sense::LessEq,
        0.0,
    )?;
    Ok(true)
}

/// Ties one fairness variable of `department` to every member's load.
pub fn build_luck_worker_constraints(
    model: &mut ShiftModel,
    department: &str,
    doctors: &[String],
    mode: LuckMode,
) -> Result<()> {
    let vars = model.fairness(department)?;
    let dept = model.fairness_position(department)?;
    for doctor in doctors {
        let d = model.doctor_index(doctor)?;
        let load = model.sum_over_days_and_shifts(doctor)?;
        match mode {
            LuckMode::Luckiest => model.add_constraint(
                format!("luckiest_worker_{dept}_{d}"),
                LinearExpr::sum([vars.floor]).minus(load),
                Sense::LessEq,
                0.0,
            )?,
            LuckMode::Unluckiest => model.add_constraint(
                format!("unlucky_worker_{dept}_{d}"),
                LinearExpr::sum([vars.ceiling]).minus(load),
                Sense::GreaterEq,
                0.0,
            )?,
        }
    }
    Ok(())
}

/// Absolute cap: `load(d) <= max_shifts` for every doctor.
pub fn build_max_shifts_constraints(
    model: &mut ShiftModel,
    doctors: &[String],
    max_shifts: u32,
) -> Result<()> {
    for doctor in doctors {
        let d = model.doctor_index(doctor)?;
        let load = model.sum_over_days_and_shifts(doctor)?;
        model.add_constraint(
            format!("{d}_max_shifts"),
            load,
            Sense::LessEq,
            f64::from(max_shifts),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::LinearConstraint;
    use crate::models::{Department, DepartmentTable};
    use crate::RosterError;
    use chrono::Weekday;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn model_for(doctors: &[String], num_days: usize) -> ShiftModel {
        let mut model = ShiftModel::new("test");
        model.create_assignment_variables(doctors, num_days).unwrap();
        model
    }

    fn get<'a>(model: &'a ShiftModel, name: &str) -> &'a LinearConstraint {
        model
            .constraints()
            .get(name)
            .unwrap_or_else(|| panic!("missing constraint {name}"))
    }

    #[test]
    fn test_consecutive_counts() {
        let doctors = names(&["alessia", "marco"]);
        let mut model = model_for(&doctors, 31);
        build_consecutive_shift_constraints(&mut model, &doctors, 31, 1).unwrap();
        // per doctor: 31 same-day + 30 pair + 30 triple
        assert_eq!(model.constraint_count(), 2 * (31 + 30 + 30));
    }

    #[test]
    fn test_consecutive_shapes() {
        let doctors = names(&["a"]);
        let mut model = model_for(&doctors, 5);
        build_consecutive_shift_constraints(&mut model, &doctors, 5, 1).unwrap();

        let n2 = model.assignment("a", 2, ShiftType::Night).unwrap();
        let m3 = model.assignment("a", 3, ShiftType::Morning).unwrap();
        let n3 = model.assignment("a", 3, ShiftType::Night).unwrap();

        let pair = get(&model, "no_consecutive_0_2_night_3_morning");
        assert_eq!(pair.expr, LinearExpr::sum([n2, m3]));
        assert_eq!((pair.sense, pair.rhs), (Sense::LessEq, 1.0));

        let triple = get(&model, "no_consecutive_0_2_night_3_any");
        assert_eq!(triple.expr, LinearExpr::sum([n2, m3, n3]));
        assert!(!model.constraints().contains("no_consecutive_0_4_night_5_morning"));
    }

    #[test]
    fn test_rest_length_extension() {
        let doctors = names(&["a"]);
        let mut baseline = model_for(&doctors, 10);
        build_consecutive_shift_constraints(&mut baseline, &doctors, 10, 1).unwrap();

        let mut extended = model_for(&doctors, 10);
        build_consecutive_shift_constraints(&mut extended, &doctors, 10, 3).unwrap();

        // gap 2 for days 0..=7, gap 3 for days 0..=6
        assert_eq!(extended.constraint_count(), baseline.constraint_count() + 8 + 7);
        assert!(extended.constraints().contains("rest_0_0_night_3"));
        assert!(!extended.constraints().contains("rest_0_7_night_10"));
        assert!(baseline
            .constraints()
            .iter()
            .all(|c| extended.constraints().get(&c.name) == Some(c)));
    }

    #[test]
    fn test_staffing_bounds() {
        let doctors = names(&["a", "b", "c"]);
        let mut model = model_for(&doctors, 28);
        build_doctors_per_shift_constraints(&mut model, 28, 1, 2).unwrap();
        assert_eq!(model.constraint_count(), 28 * 2 * 2);

        let lo = get(&model, "min_1_per_shift_5_1");
        assert_eq!((lo.sense, lo.rhs, lo.expr.terms.len()), (Sense::GreaterEq, 1.0, 3));
        let hi = get(&model, "max_2_per_shift_5_1");
        assert_eq!((hi.sense, hi.rhs), (Sense::LessEq, 2.0));
    }

    #[test]
    fn test_custom_constraint() {
        let doctors = names(&["a"]);
        let mut model = model_for(&doctors, 30);
        build_custom_constraint(&mut model, "a", 4, ShiftType::Night).unwrap();
        let var = model.assignment("a", 4, ShiftType::Night).unwrap();
        assert!(model.forced_zero_variables().contains(&var));

        let err = build_custom_constraint(&mut model, "a", 4, ShiftType::Night).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Configuration(ConfigError::DuplicateConstraint(_))
        ));
        let err = build_custom_constraint(&mut model, "a", 30, ShiftType::Night).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Configuration(ConfigError::DayOutOfRange { .. })
        ));
    }

    #[test]
    fn test_department_blackouts() {
        let table = DepartmentTable::new(vec![
            Department::new("ward").with_blackout(Weekday::Mon, ShiftType::Night),
            Department::new("clinic"),
        ])
        .unwrap();
        let registry =
            RosterRegistry::new([("w1", "ward"), ("w2", "ward"), ("c1", "clinic")], table).unwrap();
        let calendar = MonthCalendar::from_year_month(2024, 1).unwrap();
        let mut model = model_for(registry.doctors(), calendar.num_days());

        build_department_constraints(&mut model, &registry, &calendar, "ward").unwrap();
        build_department_constraints(&mut model, &registry, &calendar, "clinic").unwrap();

        // five Mondays in January 2024, two ward doctors
        assert_eq!(model.constraint_count(), 10);
        let zeros = model.forced_zero_variables();
        for doctor in ["w1", "w2"] {
            for day in [0, 7, 14, 21, 28] {
                let var = model.assignment(doctor, day, ShiftType::Night).unwrap();
                assert!(zeros.contains(&var));
            }
        }
        let c1 = model.assignment("c1", 0, ShiftType::Night).unwrap();
        assert!(!zeros.contains(&c1));
    }

    #[test]
    fn test_shift_range_two_doctors() {
        let doctors = names(&["a", "b"]);
        let mut model = model_for(&doctors, 30);
        let bounds = build_shifts_range_constraints(&mut model, &doctors, 30, 0).unwrap();
        assert_eq!(bounds, (15, 16));
        let mut relaxed = model_for(&doctors, 30);
        let bounds = build_shifts_range_constraints(&mut relaxed, &doctors, 30, 2).unwrap();
        assert_eq!(bounds, (15, 18));

        let hi = get(&relaxed, "max_shifts_0_18");
        assert_eq!((hi.sense, hi.rhs, hi.expr.terms.len()), (Sense::LessEq, 18.0, 60));
    }

    #[test]
    fn test_shift_range_empty_roster() {
        let mut model = model_for(&[], 30);
        let err = build_shifts_range_constraints(&mut model, &[], 30, 0).unwrap_err();
        assert!(matches!(err, RosterError::Configuration(ConfigError::EmptyRoster)));
    }

    fn ward_and_clinic(doctors: &[(&str, &str)]) -> RosterRegistry {
        let table =
            DepartmentTable::new(vec![Department::new("ward"), Department::new("clinic")]).unwrap();
        RosterRegistry::new(doctors.iter().copied(), table).unwrap()
    }

    #[test]
    fn test_cross_department_ratio() {
        let registry = ward_and_clinic(&[
            ("l1", "ward"),
            ("l2", "ward"),
            ("h1", "clinic"),
            ("h2", "clinic"),
            ("h3", "clinic"),
            ("h4", "clinic"),
        ]);
        let mut model = model_for(registry.doctors(), 28);

        let added =
            build_cross_department_constraint(&mut model, &registry, "ward", "clinic").unwrap();
        assert!(added);
        let c = get(&model, "cross_department_constraint_0_1");
        assert_eq!(c.rhs, -0.5);

        // low total 10, high total 40: 10 - 0.5 * 40 = -10 <= -0.5
        let mut values = vec![0.0; model.variable_count()];
        let idx = model.assignments().unwrap().clone();
        for (doc, day, shift, var) in idx.iter() {
            let quota = if doc < 2 { 5 } else { 10 };
            if day * 2 + shift.index() < quota {
                values[var.index()] = 1.0;
            }
        }
        assert!(c.is_satisfied_by(&values));

        // equal per-capita load violates the strict margin
        for (doc, day, shift, var) in idx.iter() {
            values[var.index()] = if day * 2 + shift.index() < 10 && doc < 6 { 1.0 } else { 0.0 };
        }
        assert!(!c.is_satisfied_by(&values));
    }

    #[test]
    fn test_cross_department_skips_empty() {
        let registry = ward_and_clinic(&[("l1", "ward")]);
        let mut model = model_for(registry.doctors(), 28);
        let added =
            build_cross_department_constraint(&mut model, &registry, "ward", "clinic").unwrap();
        assert!(!added);
        let added =
            build_cross_department_constraint(&mut model, &registry, "ward", "radiology").unwrap();
        assert!(!added);
        assert_eq!(model.constraint_count(), 0);
    }

    #[test]
    fn test_luck_worker_directions() {
        let doctors = names(&["a", "b"]);
        let mut model = model_for(&doctors, 28);
        model.create_fairness_variables(["ward"]).unwrap();
        build_luck_worker_constraints(&mut model, "ward", &doctors, LuckMode::Luckiest).unwrap();
        build_luck_worker_constraints(&mut model, "ward", &doctors, LuckMode::Unluckiest).unwrap();
        assert_eq!(model.constraint_count(), 4);

        let fair = model.fairness("ward").unwrap();
        let idx = model.assignments().unwrap().clone();
        let mut values = vec![0.0; model.variable_count()];
        // a works 3 shifts, b works 5
        for (doc, day, shift, var) in idx.iter() {
            if shift == ShiftType::Morning && day < [3, 5][doc] {
                values[var.index()] = 1.0;
            }
        }
        values[fair.floor.index()] = 3.0;
        values[fair.ceiling.index()] = 5.0;
        assert!(model.is_satisfied_by(&values));

        values[fair.floor.index()] = 4.0;
        assert_eq!(
            model.violated_constraints(&values)[0].name,
            "luckiest_worker_0_0"
        );
        values[fair.floor.index()] = 3.0;
        values[fair.ceiling.index()] = 4.0;
        assert_eq!(
            model.violated_constraints(&values)[0].name,
            "unlucky_worker_0_1"
        );
    }

    #[test]
    fn test_luck_worker_requires_fairness_vars() {
        let doctors = names(&["a"]);
        let mut model = model_for(&doctors, 28);
        let err = build_luck_worker_constraints(&mut model, "ward", &doctors, LuckMode::Luckiest)
            .unwrap_err();
        assert!(matches!(
            err,
            RosterError::Configuration(ConfigError::FairnessMissing(_))
        ));
    }

    #[test]
    fn test_max_shifts_cap() {
        let doctors = names(&["a", "b"]);
        let mut model = model_for(&doctors, 31);
        build_max_shifts_constraints(&mut model, &doctors, 6).unwrap();
        let c = get(&model, "1_max_shifts");
        assert_eq!((c.sense, c.rhs), (Sense::LessEq, 6.0));
    }
}
