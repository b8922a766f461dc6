//! Supabase repository implementation over the PostgREST HTTP interface.
//!
//! Connection parameters come from [`SupabaseConfig`].
//!
//! Every request carries the key twice, as `apikey` and as a bearer token.
//! Selects are `GET /rest/v1/{collection}`; upserts are `POST` with
//! `Prefer: resolution=merge-duplicates` and an `on_conflict` column list.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::db::config::SupabaseConfig;
use crate::db::repository::{
    AssignmentRepository, CatalogRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{Assignment, Role, ShiftGroup, Weekday, Worker};

mod query;
mod rows;

pub use query::RestQuery;
use rows::{canonical_assignments, ShiftRow};

/// Conflict target of the `shifts` collection.
pub const SHIFTS_CONFLICT_KEY: &str = "day,type,role_id";

const MAX_ERROR_BODY: usize = 200;

/// Request counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub total_requests: u64,
    pub failed_requests: u64,
}

/// PostgREST-backed repository.
#[derive(Clone)]
pub struct SupabaseRepository {
    client: reqwest::Client,
    config: SupabaseConfig,
    total_requests: Arc<AtomicU64>,
    failed_requests: Arc<AtomicU64>,
}

impl fmt::Debug for SupabaseRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseRepository")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl SupabaseRepository {
    /// Create a new repository.
    ///
    /// # Returns
    /// * `Ok(SupabaseRepository)` on success
    /// * `Err(RepositoryError)` if the configuration is incomplete or the
    ///   HTTP client cannot be built
    pub fn new(config: SupabaseConfig) -> RepositoryResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent("turni-backend")
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    format!("Failed to build HTTP client: {}", e),
                    ErrorContext::new("create_client"),
                )
            })?;

        log::info!("Supabase repository targeting {}", config.url);

        Ok(Self {
            client,
            config,
            total_requests: Arc::new(AtomicU64::new(0)),
            failed_requests: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
        }
    }

    /// Run a select and decode the JSON array it returns.
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &RestQuery,
        operation: &str,
    ) -> RepositoryResult<Vec<T>> {
        log::debug!(
            "{}: GET {}?{}",
            operation,
            query.collection(),
            query.to_query_string()
        );

        let context = ErrorContext::new(operation).with_entity(query.collection());
        let request = self
            .client
            .get(self.config.rest_url(query.collection()))
            .query(&query.pairs());
        let body = self.execute(request, context.clone()).await?;

        serde_json::from_str(&body).map_err(|e| RepositoryError::InternalError {
            message: format!("Failed to decode store response: {}", e),
            context,
        })
    }

    /// Insert or merge one record on `conflict_key`.
    pub async fn upsert<T: Serialize + Sync>(
        &self,
        collection: &str,
        record: &T,
        conflict_key: &str,
        context: ErrorContext,
    ) -> RepositoryResult<()> {
        log::debug!("POST {} on_conflict={}", collection, conflict_key);

        let request = self
            .client
            .post(self.config.rest_url(collection))
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record);
        self.execute(request, context).await.map(|_| ())
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        context: ErrorContext,
    ) -> RepositoryResult<String> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let result = self.send(request, context).await;
        if let Err(ref e) = result {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
            log::warn!("Store request failed: {}", e);
        }
        result
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: ErrorContext,
    ) -> RepositoryResult<String> {
        let response = request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .send()
            .await
            .map_err(|e| transport_error(e, context.clone()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, context.clone()))?;

        if status.is_success() {
            return Ok(body);
        }

        let context = context.with_details(format!("http_status={}", status.as_u16()));
        let message = format!(
            "Store returned HTTP {}: {}",
            status,
            truncate_for_error(body.trim())
        );
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(RepositoryError::configuration_with_context(message, context))
        } else {
            Err(RepositoryError::query_with_context(message, context))
        }
    }
}

fn transport_error(err: reqwest::Error, context: ErrorContext) -> RepositoryError {
    if err.is_connect() || err.is_timeout() {
        RepositoryError::connection_with_context(err.to_string(), context)
    } else {
        RepositoryError::query_with_context(err.to_string(), context)
    }
}

fn truncate_for_error(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_ERROR_BODY).collect::<String>())
    }
}

#[async_trait]
impl CatalogRepository for SupabaseRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let query = RestQuery::select("roles").columns("id").limit(1);
        match self.select::<serde_json::Value>(&query, "health_check").await {
            Ok(_) => Ok(true),
            Err(RepositoryError::ConnectionError { .. }) => Ok(false),
            Err(e) if e.is_configuration() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_roles(&self) -> RepositoryResult<Vec<Role>> {
        let query = RestQuery::select("roles").order_asc("id");
        self.select(&query, "list_roles").await
    }

    async fn list_workers(&self, group: Option<ShiftGroup>) -> RepositoryResult<Vec<Worker>> {
        let mut query = RestQuery::select("workers");
        if let Some(group) = group {
            query = query.eq("shift_group", group);
        }
        self.select(&query.order_asc("id"), "list_workers").await
    }
}

#[async_trait]
impl AssignmentRepository for SupabaseRepository {
    async fn list_assignments(
        &self,
        day: Weekday,
        group: ShiftGroup,
    ) -> RepositoryResult<Vec<Assignment>> {
        let query = RestQuery::select("shifts").eq("day", day).eq("type", group);
        let rows: Vec<ShiftRow> = self.select(&query, "list_assignments").await?;
        Ok(canonical_assignments(rows))
    }

    async fn list_assignments_for_days(
        &self,
        days: &[Weekday],
    ) -> RepositoryResult<Vec<Assignment>> {
        if days.is_empty() {
            return Ok(Vec::new());
        }
        let query = RestQuery::select("shifts").in_list("day", days.iter().copied());
        let rows: Vec<ShiftRow> = self.select(&query, "list_assignments_for_days").await?;
        Ok(canonical_assignments(rows))
    }

    async fn upsert_assignment(&self, assignment: &Assignment) -> RepositoryResult<()> {
        let context = ErrorContext::new("upsert_assignment")
            .with_entity("shifts")
            .with_entity_id(format!(
                "{}/{}/{}",
                assignment.day, assignment.group, assignment.role_id
            ));
        self.upsert("shifts", assignment, SHIFTS_CONFLICT_KEY, context)
            .await
    }
}
