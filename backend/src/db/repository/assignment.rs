//! Assignment repository trait for the `shifts` collection.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Assignment, ShiftGroup, Weekday};

/// Repository trait for assignment records.
///
/// The store deduplicates on `(day, type, role_id)` only. Keeping a worker
/// to a single role per shift is the caller's job (see
/// [`crate::services::registry::AssignmentRegistry`]).
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Fetch the assignments recorded for one day and shift group.
    ///
    /// # Returns
    /// * `Ok(Vec<Assignment>)` - Possibly empty list of matching records
    /// * `Err(RepositoryError)` - If the query fails
    async fn list_assignments(
        &self,
        day: Weekday,
        group: ShiftGroup,
    ) -> RepositoryResult<Vec<Assignment>>;

    /// Fetch every assignment recorded for any of `days`, all groups.
    async fn list_assignments_for_days(&self, days: &[Weekday])
        -> RepositoryResult<Vec<Assignment>>;

    /// Insert or replace the record matching `(day, type, role_id)`.
    async fn upsert_assignment(&self, assignment: &Assignment) -> RepositoryResult<()>;
}
