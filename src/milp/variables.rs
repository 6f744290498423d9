//! Model variables and index structures.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::ShiftType;

/// Handle to a variable of a [`ShiftModel`](super::ShiftModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model's variable list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VarKind {
    /// 0/1 decision.
    Binary,
    /// Real-valued within `[lower, upper]`; `upper = None` is unbounded.
    Continuous { lower: f64, upper: Option<f64> },
}

/// A named model variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Variable name (unique within a model).
    pub name: String,
    pub kind: VarKind,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Binary,
        }
    }

    pub fn continuous(name: impl Into<String>, lower: f64, upper: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous { lower, upper },
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.kind, VarKind::Binary)
    }
}

/// Dense doctor × day × shift index over the assignment variables.
///
/// Assignment variables occupy a contiguous block of the model starting at
/// `base`; the variable of `(doctor, day, shift)` sits at
/// `base + (doctor * num_days + day) * 2 + shift`.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentIndex {
    doctors: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    num_days: usize,
    base: usize,
}

impl AssignmentIndex {
    pub(crate) fn new(doctors: Vec<String>, num_days: usize, base: usize) -> Self {
        let positions = doctors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
        Self {
            doctors,
            positions,
            num_days,
            base,
        }
    }

    /// Doctors in variable order.
    pub fn doctors(&self) -> &[String] {
        &self.doctors
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Number of assignment variables.
    pub fn len(&self) -> usize {
        self.doctors.len() * self.num_days * ShiftType::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `doctor` in variable order.
    pub fn doctor_position(&self, doctor: &str) -> Option<usize> {
        self.positions.get(doctor).copied()
    }

    /// Variable of (`doctor_idx`, `day`, `shift`). Indices must be in range.
    #[inline]
    pub fn get(&self, doctor_idx: usize, day: usize, shift: ShiftType) -> VarId {
        debug_assert!(doctor_idx < self.doctors.len() && day < self.num_days);
        VarId(self.base + (doctor_idx * self.num_days + day) * 2 + shift.index())
    }

    /// Inverse of [`AssignmentIndex::get`].
    pub fn decode(&self, var: VarId) -> Option<(usize, usize, ShiftType)> {
        let offset = var.0.checked_sub(self.base)?;
        if offset >= self.len() {
            return None;
        }
        let shift = ShiftType::from_index(offset % 2)?;
        let slot = offset / 2;
        Some((slot / self.num_days, slot % self.num_days, shift))
    }

    /// All `(doctor_idx, day, shift, var)` entries in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, ShiftType, VarId)> + '_ {
        (0..self.doctors.len()).flat_map(move |doc| {
            (0..self.num_days).flat_map(move |day| {
                ShiftType::ALL
                    .into_iter()
                    .map(move |shift| (doc, day, shift, self.get(doc, day, shift)))
            })
        })
    }
}

/// The pair of fairness helper variables of one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FairnessVars {
    /// Bounded above by every member's monthly load ("luckiest").
    pub floor: VarId,
    /// Bounded below by every member's monthly load ("unluckiest").
    pub ceiling: VarId,
}
