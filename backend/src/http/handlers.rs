//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer. Handlers are stateless: edits build a fresh
//! [`AssignmentRegistry`] over the shared repository for every request.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::dto::{
    AssignRequest, AssignResponse, DaysResponse, ExportResponse, HealthResponse, RoleSlot,
    RolesResponse, ShiftViewResponse, SlotAssignment, WorkersQuery, WorkersResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db;
use crate::models::{RoleId, ShiftGroup, Weekday};
use crate::services::{
    load_weekly_export, render_text, AssignmentRegistry, ReadOutcome, Selection, EXPORT_FILE_NAME,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying the degraded-read message on the text export.
pub const WARNING_HEADER: &str = "x-roster-warning";

fn parse_day(raw: &str) -> Result<Weekday, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

fn parse_group(raw: &str) -> Result<ShiftGroup, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

fn warning_of<T>(outcome: &ReadOutcome<T>) -> Option<String> {
    outcome.error.as_ref().map(ToString::to_string)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store = if db::health_check(state.repository.as_ref()).await {
        "connected"
    } else {
        "unavailable"
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store: store.to_string(),
    }))
}

// =============================================================================
// Reference data
// =============================================================================

/// GET /v1/days
pub async fn list_days() -> Json<DaysResponse> {
    Json(DaysResponse {
        days: Weekday::WEEK.to_vec(),
    })
}

/// GET /v1/roles
///
/// All roles in ascending id order.
pub async fn list_roles(State(state): State<AppState>) -> HandlerResult<RolesResponse> {
    let roles = ReadOutcome::from_result(state.repository.list_roles().await);
    Ok(Json(RolesResponse {
        warning: warning_of(&roles),
        roles: roles.data,
    }))
}

/// GET /v1/workers?group=A
pub async fn list_workers(
    State(state): State<AppState>,
    Query(query): Query<WorkersQuery>,
) -> HandlerResult<WorkersResponse> {
    let group = query.group.as_deref().map(parse_group).transpose()?;
    let workers = ReadOutcome::from_result(state.repository.list_workers(group).await);
    Ok(Json(WorkersResponse {
        warning: warning_of(&workers),
        workers: workers.data,
    }))
}

// =============================================================================
// Shift editing
// =============================================================================

/// GET /v1/days/{day}/shifts/{group}
///
/// Roles, eligible workers and the current assignments of one shift.
pub async fn get_shift(
    State(state): State<AppState>,
    Path((day, group)): Path<(String, String)>,
) -> HandlerResult<ShiftViewResponse> {
    let day = parse_day(&day)?;
    let group = parse_group(&group)?;

    let mut registry = AssignmentRegistry::new(state.repository.clone());
    let context = registry.load_context(group).await;
    let status = registry.load_assignments(day, group).await;

    let warning = context
        .error
        .as_ref()
        .or(status.warning())
        .map(ToString::to_string);

    let slots = context
        .data
        .roles
        .iter()
        .map(|role| RoleSlot {
            role: role.clone(),
            worker_id: registry.worker_for(role.id),
            options: registry.worker_options(role.id, &context.data.workers),
        })
        .collect();

    Ok(Json(ShiftViewResponse {
        day,
        group,
        heading: group.heading(),
        slots,
        workers: context.data.workers,
        warning,
    }))
}

/// PUT /v1/days/{day}/shifts/{group}/roles/{role_id}
///
/// Assign a worker to a role. Fails with 409 if the worker already covers
/// another role in the same shift. Edits of one shift are serialized.
pub async fn assign_worker(
    State(state): State<AppState>,
    Path((day, group, role_id)): Path<(String, String, i64)>,
    Json(request): Json<AssignRequest>,
) -> HandlerResult<AssignResponse> {
    let day = parse_day(&day)?;
    let group = parse_group(&group)?;
    let role_id = RoleId::new(role_id);

    let shift_lock = state.shift_lock(Selection { day, group });
    let _guard = shift_lock.lock().await;

    let mut registry = AssignmentRegistry::new(state.repository.clone());
    // Never write against a snapshot that could not be read.
    if let Some(e) = registry.load_assignments(day, group).await.warning() {
        return Err(AppError::Repository(e.clone()));
    }

    let outcome = registry.assign(role_id, request.worker_id).await?;
    tracing::info!(
        day = %day,
        group = %group,
        role_id = %role_id,
        worker_id = %request.worker_id,
        "Assignment saved"
    );

    let (label, previous_worker_id) = AssignResponse::outcome_label(outcome);
    let assignments = registry
        .snapshot()
        .map(|snapshot| {
            snapshot
                .iter()
                .map(|(role_id, worker_id)| SlotAssignment {
                    role_id: *role_id,
                    worker_id: *worker_id,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(AssignResponse {
        day,
        group,
        role_id,
        worker_id: request.worker_id,
        outcome: label.to_string(),
        previous_worker_id,
        assignments,
    }))
}

// =============================================================================
// Weekly export
// =============================================================================

/// GET /v1/export/weekly
pub async fn get_weekly_export(State(state): State<AppState>) -> HandlerResult<ExportResponse> {
    let outcome = load_weekly_export(state.repository.as_ref(), Utc::now()).await;
    Ok(Json(ExportResponse {
        warning: warning_of(&outcome),
        export: outcome.data,
    }))
}

/// GET /v1/export/weekly.txt
///
/// The weekly document as a text attachment.
pub async fn download_weekly_export(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = load_weekly_export(state.repository.as_ref(), Utc::now()).await;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(warning) = warning_of(&outcome) {
        match HeaderValue::from_str(&warning) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(WARNING_HEADER), value);
            }
            Err(_) => tracing::warn!("Export warning not representable as header: {}", warning),
        }
    }

    (headers, render_text(&outcome.data))
}
