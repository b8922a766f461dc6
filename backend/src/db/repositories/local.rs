//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is kept in
//! ordered maps, so listings come back sorted by id without extra work.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    Assignment, AssignmentKey, Role, RoleId, ShiftGroup, Weekday, Worker, WorkerId,
};

/// Roles and workers used to pre-populate a [`LocalRepository`].
///
/// Loaded from the JSON file named by `local.seed_file` in `repository.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSeed {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub workers: Vec<Worker>,
}

impl RosterSeed {
    /// Read a seed from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read seed file: {}", e),
                ErrorContext::new("load_seed").with_details(path.display().to_string()),
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse seed file: {}", e),
                ErrorContext::new("load_seed").with_details(path.display().to_string()),
            )
        })
    }
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use turni::db::repositories::LocalRepository;
/// use turni::models::{Role, ShiftGroup, Worker};
///
/// let repo = LocalRepository::new();
/// repo.insert_role(Role::new(1, "CF"));
/// repo.insert_worker(Worker::new(10, "Alice", ShiftGroup::A));
/// assert_eq!(repo.assignment_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    roles: BTreeMap<RoleId, Role>,
    workers: BTreeMap<WorkerId, Worker>,
    shifts: BTreeMap<AssignmentKey, WorkerId>,

    // Fault injection
    is_healthy: bool,
    fail_reads: bool,
    fail_writes: bool,

    // Number of upserts that reached the store, failed or not
    upsert_attempts: usize,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            roles: BTreeMap::new(),
            workers: BTreeMap::new(),
            shifts: BTreeMap::new(),
            is_healthy: true,
            fail_reads: false,
            fail_writes: false,
            upsert_attempts: 0,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository pre-populated with roles and workers.
    pub fn with_seed(seed: RosterSeed) -> Self {
        let repo = Self::new();
        for role in seed.roles {
            repo.insert_role(role);
        }
        for worker in seed.workers {
            repo.insert_worker(worker);
        }
        repo
    }

    /// Add or replace a role.
    pub fn insert_role(&self, role: Role) {
        self.data.write().roles.insert(role.id, role);
    }

    /// Add or replace a worker.
    pub fn insert_worker(&self, worker: Worker) {
        self.data.write().workers.insert(worker.id, worker);
    }

    /// Store an assignment directly, bypassing fault injection.
    pub fn insert_assignment(&self, assignment: Assignment) {
        self.data
            .write()
            .shifts
            .insert(assignment.key(), assignment.worker_id);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make every select fail with a query error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.data.write().fail_reads = fail;
    }

    /// Make every upsert fail with a query error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.data.write().fail_writes = fail;
    }

    /// Number of stored assignment records.
    pub fn assignment_count(&self) -> usize {
        self.data.read().shifts.len()
    }

    /// Number of upserts received, including failed ones.
    pub fn upsert_attempts(&self) -> usize {
        self.data.read().upsert_attempts
    }

    /// Clear all data, keeping the fault-injection switches.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            fail_reads: data.fail_reads,
            fail_writes: data.fail_writes,
            ..Default::default()
        };
    }

    /// Helper to check health and read switches before a select.
    fn check_readable(data: &LocalData, operation: &str, entity: &str) -> RepositoryResult<()> {
        if !data.is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Store is not healthy",
                ErrorContext::new(operation).with_entity(entity),
            ));
        }
        if data.fail_reads {
            return Err(RepositoryError::query_with_context(
                "Injected read failure",
                ErrorContext::new(operation).with_entity(entity),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_roles(&self) -> RepositoryResult<Vec<Role>> {
        let data = self.data.read();
        Self::check_readable(&data, "list_roles", "roles")?;
        Ok(data.roles.values().cloned().collect())
    }

    async fn list_workers(&self, group: Option<ShiftGroup>) -> RepositoryResult<Vec<Worker>> {
        let data = self.data.read();
        Self::check_readable(&data, "list_workers", "workers")?;
        Ok(data
            .workers
            .values()
            .filter(|worker| match group {
                Some(g) => worker.shift_group == g,
                None => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn list_assignments(
        &self,
        day: Weekday,
        group: ShiftGroup,
    ) -> RepositoryResult<Vec<Assignment>> {
        let data = self.data.read();
        Self::check_readable(&data, "list_assignments", "shifts")?;
        Ok(data
            .shifts
            .iter()
            .filter(|(key, _)| key.day == day && key.group == group)
            .map(|(key, worker_id)| Assignment::new(key.day, key.group, key.role_id, *worker_id))
            .collect())
    }

    async fn list_assignments_for_days(
        &self,
        days: &[Weekday],
    ) -> RepositoryResult<Vec<Assignment>> {
        let data = self.data.read();
        Self::check_readable(&data, "list_assignments_for_days", "shifts")?;
        Ok(data
            .shifts
            .iter()
            .filter(|(key, _)| days.contains(&key.day))
            .map(|(key, worker_id)| Assignment::new(key.day, key.group, key.role_id, *worker_id))
            .collect())
    }

    async fn upsert_assignment(&self, assignment: &Assignment) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.upsert_attempts += 1;

        let context = || {
            ErrorContext::new("upsert_assignment")
                .with_entity("shifts")
                .with_entity_id(format!(
                    "{}/{}/{}",
                    assignment.day, assignment.group, assignment.role_id
                ))
        };

        if !data.is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Store is not healthy",
                context(),
            ));
        }
        if data.fail_writes {
            return Err(RepositoryError::query_with_context(
                "Injected write failure",
                context(),
            ));
        }

        data.shifts.insert(assignment.key(), assignment.worker_id);
        Ok(())
    }
}
