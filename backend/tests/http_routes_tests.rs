//! End-to-end tests of the HTTP router over the local repository.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use turni::db::{
    AssignmentRepository, CatalogRepository, FullRepository, LocalRepository, RepositoryError,
    RepositoryResult, UnavailableRepository,
};
use turni::http::{create_router, AppState};
use turni::models::{Assignment, Role, ShiftGroup, Weekday, Worker};

fn router_over(repo: Arc<dyn FullRepository>) -> Router {
    create_router(AppState::new(repo))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Local store whose shift reads take a while, so concurrent requests overlap.
struct SlowReads {
    inner: Arc<LocalRepository>,
    delay: Duration,
}

#[async_trait]
impl CatalogRepository for SlowReads {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn list_roles(&self) -> RepositoryResult<Vec<Role>> {
        self.inner.list_roles().await
    }

    async fn list_workers(&self, group: Option<ShiftGroup>) -> RepositoryResult<Vec<Worker>> {
        self.inner.list_workers(group).await
    }
}

#[async_trait]
impl AssignmentRepository for SlowReads {
    async fn list_assignments(
        &self,
        day: Weekday,
        group: ShiftGroup,
    ) -> RepositoryResult<Vec<Assignment>> {
        let assignments = self.inner.list_assignments(day, group).await;
        tokio::time::sleep(self.delay).await;
        assignments
    }

    async fn list_assignments_for_days(
        &self,
        days: &[Weekday],
    ) -> RepositoryResult<Vec<Assignment>> {
        self.inner.list_assignments_for_days(days).await
    }

    async fn upsert_assignment(&self, assignment: &Assignment) -> RepositoryResult<()> {
        self.inner.upsert_assignment(assignment).await
    }
}

fn assign_uri(day: &str, group: &str, role_id: i64) -> String {
    format!("/v1/days/{}/shifts/{}/roles/{}", day, group, role_id)
}

#[tokio::test]
async fn test_health_reports_store() {
    let router = router_over(Arc::new(LocalRepository::new()));
    let (status, body) = send_json(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_days_in_canonical_order() {
    let router = router_over(Arc::new(LocalRepository::new()));
    let (status, body) = send_json(&router, Method::GET, "/v1/days", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["days"],
        json!(["Lunedì", "Martedì", "Mercoledì", "Giovedì", "Venerdì", "Sabato", "Domenica"])
    );
}

#[tokio::test]
async fn test_workers_filtered_by_group() {
    let router = router_over(Arc::new(support::seeded_repository()));

    let (status, body) = send_json(&router, Method::GET, "/v1/workers?group=a", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["workers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    let (status, _) = send_json(&router, Method::GET, "/v1/workers?group=D", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assign_and_conflict_flow() {
    let repo = Arc::new(support::seeded_repository());
    let router = router_over(repo.clone());

    let (status, body) = send_json(
        &router,
        Method::PUT,
        &assign_uri("lunedi", "A", 1),
        Some(json!({ "worker_id": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "assigned");
    assert_eq!(body["day"], "Lunedì");
    assert_eq!(body["group"], "A");

    let (status, body) = send_json(
        &router,
        Method::PUT,
        &assign_uri("lunedi", "A", 2),
        Some(json!({ "worker_id": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["details"], "held_by=1");

    let (status, body) = send_json(
        &router,
        Method::PUT,
        &assign_uri("lunedi", "A", 2),
        Some(json!({ "worker_id": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["assignments"],
        json!([
            { "role_id": 1, "worker_id": 10 },
            { "role_id": 2, "worker_id": 11 }
        ])
    );
    assert_eq!(repo.assignment_count(), 2);
}

#[tokio::test]
async fn test_shift_view_marks_busy_workers() {
    let router = router_over(Arc::new(support::seeded_repository()));
    send_json(
        &router,
        Method::PUT,
        &assign_uri("martedi", "A", 1),
        Some(json!({ "worker_id": 10 })),
    )
    .await;

    let (status, body) =
        send_json(&router, Method::GET, "/v1/days/Marted%C3%AC/shifts/A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heading"], "Turno A");

    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["worker_id"], 10);
    assert_eq!(slots[1]["worker_id"], Value::Null);

    let bart_options = slots[1]["options"].as_array().unwrap();
    assert_eq!(bart_options[0]["worker"]["name"], "Alice");
    assert_eq!(bart_options[0]["assigned_role"], 1);
    assert_eq!(bart_options[1]["assigned_role"], Value::Null);
}

#[tokio::test]
async fn test_invalid_day_is_bad_request() {
    let router = router_over(Arc::new(support::seeded_repository()));
    let (status, body) = send_json(
        &router,
        Method::PUT,
        &assign_uri("monday", "A", 1),
        Some(json!({ "worker_id": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unavailable_store_rejects_writes() {
    let repo = Arc::new(UnavailableRepository::new(RepositoryError::configuration(
        "SUPABASE_URL environment variable not set",
    )));
    let router = router_over(repo);

    let (status, body) = send_json(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "unavailable");

    let (status, body) = send_json(&router, Method::GET, "/v1/roles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!([]));

    let (status, body) = send_json(
        &router,
        Method::PUT,
        &assign_uri("lunedi", "B", 1),
        Some(json!({ "worker_id": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_degraded_read_blocks_assignment() {
    let repo = Arc::new(support::seeded_repository());
    repo.set_fail_reads(true);
    let router = router_over(repo.clone());

    let (status, body) = send_json(&router, Method::GET, "/v1/roles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["warning"].is_string());

    let (status, _) = send_json(
        &router,
        Method::PUT,
        &assign_uri("lunedi", "A", 1),
        Some(json!({ "worker_id": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(repo.upsert_attempts(), 0);
}

#[tokio::test]
async fn test_weekly_export_json_and_text() {
    let repo = Arc::new(support::seeded_repository());
    let router = router_over(repo.clone());
    send_json(
        &router,
        Method::PUT,
        &assign_uri("giovedi", "C", 2),
        Some(json!({ "worker_id": 30 })),
    )
    .await;

    let (status, body) = send_json(&router, Method::GET, "/v1/export/weekly", None).await;
    assert_eq!(status, StatusCode::OK);
    let pages = body["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 7);
    assert_eq!(pages[3]["day"], "Giovedì");
    assert_eq!(
        pages[3]["tables"][2]["rows"],
        json!([{ "role": "BART", "worker": "Dario" }])
    );
    assert_eq!(
        pages[3]["tables"][1]["rows"],
        json!([{ "role": "-", "worker": "-" }])
    );

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/export/weekly.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("Turni_Settimanali.txt"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.split('\x0c').count(), 7);
    assert!(text.contains("BART  | Dario"));
}

#[tokio::test]
async fn test_overlapping_assigns_in_one_shift_are_serialized() {
    let repo = Arc::new(support::seeded_repository());
    let router = router_over(Arc::new(SlowReads {
        inner: repo.clone(),
        delay: Duration::from_millis(20),
    }));

    let cf_uri = assign_uri("lunedi", "A", 1);
    let bart_uri = assign_uri("lunedi", "A", 2);
    let ((first, _), (second, _)) = tokio::join!(
        send_json(&router, Method::PUT, &cf_uri, Some(json!({ "worker_id": 10 }))),
        send_json(&router, Method::PUT, &bart_uri, Some(json!({ "worker_id": 10 }))),
    );

    let mut statuses = vec![first, second];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let stored = repo
        .list_assignments(Weekday::Monday, ShiftGroup::A)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].worker_id.value(), 10);
}

#[tokio::test]
async fn test_overlapping_assigns_in_different_shifts_both_succeed() {
    let repo = Arc::new(support::seeded_repository());
    let router = router_over(Arc::new(SlowReads {
        inner: repo.clone(),
        delay: Duration::from_millis(20),
    }));

    let monday_uri = assign_uri("lunedi", "A", 1);
    let tuesday_uri = assign_uri("martedi", "A", 1);
    let ((monday, _), (tuesday, _)) = tokio::join!(
        send_json(&router, Method::PUT, &monday_uri, Some(json!({ "worker_id": 10 }))),
        send_json(&router, Method::PUT, &tuesday_uri, Some(json!({ "worker_id": 10 }))),
    );

    assert_eq!(monday, StatusCode::OK);
    assert_eq!(tuesday, StatusCode::OK);
    assert_eq!(repo.assignment_count(), 2);
}
