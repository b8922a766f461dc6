//! Stand-in repository used when the store cannot be configured.
//!
//! Reads succeed with empty results so the surface stays usable; every write
//! fails with the configuration error captured at startup.

use async_trait::async_trait;

use crate::db::repository::*;
use crate::models::{Assignment, Role, ShiftGroup, Weekday, Worker};

/// Repository for a store whose connection parameters are missing.
#[derive(Debug, Clone)]
pub struct UnavailableRepository {
    reason: RepositoryError,
}

impl UnavailableRepository {
    pub fn new(reason: RepositoryError) -> Self {
        Self { reason }
    }

    /// The configuration problem that made the store unavailable.
    pub fn reason(&self) -> &RepositoryError {
        &self.reason
    }
}

#[async_trait]
impl CatalogRepository for UnavailableRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(false)
    }

    async fn list_roles(&self) -> RepositoryResult<Vec<Role>> {
        Ok(Vec::new())
    }

    async fn list_workers(&self, _group: Option<ShiftGroup>) -> RepositoryResult<Vec<Worker>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl AssignmentRepository for UnavailableRepository {
    async fn list_assignments(
        &self,
        _day: Weekday,
        _group: ShiftGroup,
    ) -> RepositoryResult<Vec<Assignment>> {
        Ok(Vec::new())
    }

    async fn list_assignments_for_days(
        &self,
        _days: &[Weekday],
    ) -> RepositoryResult<Vec<Assignment>> {
        Ok(Vec::new())
    }

    async fn upsert_assignment(&self, _assignment: &Assignment) -> RepositoryResult<()> {
        Err(self.reason.clone().with_operation("upsert_assignment"))
    }
}
