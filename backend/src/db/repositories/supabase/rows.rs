//! Wire rows of the `shifts` collection.
//!
//! Roles and workers deserialize straight into the domain types. Shift rows
//! are read loosely first so one record with a non-canonical day, an
//! unknown group or a null id does not fail the whole select.

use serde::Deserialize;

use crate::models::{Assignment, RoleId, WorkerId};

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ShiftRow {
    pub day: String,
    #[serde(rename = "type")]
    pub group: String,
    pub role_id: Option<i64>,
    pub worker_id: Option<i64>,
}

impl ShiftRow {
    /// Convert to an [`Assignment`], or `None` when the day or group is not
    /// canonical or either id is null.
    pub fn into_assignment(self) -> Option<Assignment> {
        let day = self.day.parse().ok()?;
        let group = self.group.parse().ok()?;
        Some(Assignment::new(
            day,
            group,
            RoleId::new(self.role_id?),
            WorkerId::new(self.worker_id?),
        ))
    }
}

/// Keep the rows that map onto canonical assignments, logging the rest.
pub(super) fn canonical_assignments(rows: Vec<ShiftRow>) -> Vec<Assignment> {
    let total = rows.len();
    let assignments: Vec<Assignment> = rows
        .into_iter()
        .filter_map(|row| {
            let label = format!("{}/{}", row.day, row.group);
            let converted = row.into_assignment();
            if converted.is_none() {
                log::debug!("Skipping non-canonical shift record {}", label);
            }
            converted
        })
        .collect();

    if assignments.len() != total {
        log::warn!(
            "Ignored {} of {} shift records with unknown day, group or id",
            total - assignments.len(),
            total
        );
    }
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShiftGroup, Weekday};

    #[test]
    fn test_non_canonical_rows_are_dropped() {
        let rows: Vec<ShiftRow> = serde_json::from_value(serde_json::json!([
            {"id": 1, "day": "Lunedì", "type": "A", "role_id": 1, "worker_id": 10},
            {"id": 2, "day": "Festivo", "type": "A", "role_id": 2, "worker_id": 11},
            {"id": 3, "day": "Martedì", "type": "Z", "role_id": 2, "worker_id": 11},
            {"id": 4, "day": "Lunedì", "type": "A", "role_id": 3, "worker_id": null},
            {"id": 5, "day": "Lunedì", "type": "A", "worker_id": 12}
        ]))
        .unwrap();

        let assignments = canonical_assignments(rows);
        assert_eq!(
            assignments,
            vec![Assignment::new(
                Weekday::Monday,
                ShiftGroup::A,
                RoleId::new(1),
                WorkerId::new(10)
            )]
        );
    }
}
