//! Core roster types: roles, workers, shift groups, days and assignments.
//!
//! These mirror the three store collections (`roles`, `workers`, `shifts`)
//! and are shared by the repository layer, the assignment registry and the
//! weekly export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::define_id_type;

define_id_type!(i64, RoleId);
define_id_type!(i64, WorkerId);

/// One of the three partitions of the working day.
///
/// Each group has its own eligible worker pool and its own role table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftGroup {
    A,
    B,
    C,
}

impl ShiftGroup {
    /// All groups in display order.
    pub const ALL: [ShiftGroup; 3] = [ShiftGroup::A, ShiftGroup::B, ShiftGroup::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftGroup::A => "A",
            ShiftGroup::B => "B",
            ShiftGroup::C => "C",
        }
    }

    /// Heading used for the group in rendered documents.
    pub fn heading(&self) -> String {
        format!("Turno {}", self.as_str())
    }
}

impl fmt::Display for ShiftGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ShiftGroup::A),
            "B" => Ok(ShiftGroup::B),
            "C" => Ok(ShiftGroup::C),
            _ => Err(format!("Unknown shift group: {}", s)),
        }
    }
}

/// Canonical day names of the roster week, Monday first.
///
/// Serialized as the Italian label stored in the `shifts.day` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// The week in canonical order.
    pub const WEEK: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lunedì",
            Weekday::Tuesday => "Martedì",
            Weekday::Wednesday => "Mercoledì",
            Weekday::Thursday => "Giovedì",
            Weekday::Friday => "Venerdì",
            Weekday::Saturday => "Sabato",
            Weekday::Sunday => "Domenica",
        }
    }

    /// Label without the accent, as typed in URLs.
    fn plain_label(&self) -> &'static str {
        match self {
            Weekday::Monday => "lunedi",
            Weekday::Tuesday => "martedi",
            Weekday::Wednesday => "mercoledi",
            Weekday::Thursday => "giovedi",
            Weekday::Friday => "venerdi",
            Weekday::Saturday => "sabato",
            Weekday::Sunday => "domenica",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Weekday::WEEK
            .iter()
            .copied()
            .find(|day| day.label().to_lowercase() == needle || day.plain_label() == needle)
            .ok_or_else(|| format!("Unknown day: {}", s))
    }
}

impl Serialize for Weekday {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A role slot that can be covered in every shift group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub code: String,
}

impl Role {
    pub fn new(id: i64, code: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(id),
            code: code.into(),
        }
    }
}

/// A worker belonging to exactly one shift group's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub shift_group: ShiftGroup,
}

impl Worker {
    pub fn new(id: i64, name: impl Into<String>, shift_group: ShiftGroup) -> Self {
        Self {
            id: WorkerId::new(id),
            name: name.into(),
            shift_group,
        }
    }
}

/// A `shifts` row: who covers `role_id` on `day` in shift group `group`.
///
/// Unique on `(day, group, role_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub day: Weekday,
    #[serde(rename = "type")]
    pub group: ShiftGroup,
    pub role_id: RoleId,
    pub worker_id: WorkerId,
}

impl Assignment {
    pub fn new(day: Weekday, group: ShiftGroup, role_id: RoleId, worker_id: WorkerId) -> Self {
        Self {
            day,
            group,
            role_id,
            worker_id,
        }
    }

    /// The store's uniqueness key for this record.
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            day: self.day,
            group: self.group,
            role_id: self.role_id,
        }
    }
}

/// Composite key `(day, type, role_id)` of the `shifts` collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentKey {
    pub day: Weekday,
    pub group: ShiftGroup,
    pub role_id: RoleId,
}
