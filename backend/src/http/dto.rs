//! Data Transfer Objects for the HTTP API.
//!
//! Domain types already derive `Serialize`, so most responses wrap them
//! directly and add an optional `warning` for reads that fell back to empty
//! data.

use serde::{Deserialize, Serialize};

use crate::models::{Role, RoleId, ShiftGroup, Weekday, Worker, WorkerId};
use crate::services::{AssignOutcome, WeeklyExport, WorkerOption};

pub use crate::services::{DayPage, ExportRow, ShiftTable};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// API version
    pub version: String,
    /// Store status ("connected" or "unavailable")
    pub store: String,
}

/// The canonical week.
#[derive(Debug, Clone, Serialize)]
pub struct DaysResponse {
    pub days: Vec<Weekday>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Query parameters for `/v1/workers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkersQuery {
    /// Shift group tag (A, B or C)
    pub group: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkersResponse {
    pub workers: Vec<Worker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One role of the selected shift with its current worker and the choices for it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSlot {
    pub role: Role,
    pub worker_id: Option<WorkerId>,
    pub options: Vec<WorkerOption>,
}

/// Everything needed to edit one (day, group) shift.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftViewResponse {
    pub day: Weekday,
    pub group: ShiftGroup,
    pub heading: String,
    pub slots: Vec<RoleSlot>,
    pub workers: Vec<Worker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Request body for assigning a worker to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub worker_id: WorkerId,
}

/// `role_id -> worker_id` pair of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub role_id: RoleId,
    pub worker_id: WorkerId,
}

/// Result of an assignment.
#[derive(Debug, Clone, Serialize)]
pub struct AssignResponse {
    pub day: Weekday,
    pub group: ShiftGroup,
    pub role_id: RoleId,
    pub worker_id: WorkerId,
    /// "assigned", "unchanged" or "detached"
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_worker_id: Option<WorkerId>,
    /// Snapshot after the write, ascending role id
    pub assignments: Vec<SlotAssignment>,
}

impl AssignResponse {
    pub fn outcome_label(outcome: AssignOutcome) -> (&'static str, Option<WorkerId>) {
        match outcome {
            AssignOutcome::Assigned { previous } => ("assigned", previous),
            AssignOutcome::Unchanged => ("unchanged", None),
            AssignOutcome::Detached => ("detached", None),
        }
    }
}

/// Structured weekly export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    #[serde(flatten)]
    pub export: WeeklyExport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
