//! Catalog repository trait for the reference collections.
//!
//! Roles and workers are static from the application's point of view: they
//! are only ever read.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Role, ShiftGroup, Worker};

/// Repository trait for the `roles` and `workers` collections.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is reachable and configured.
    ///
    /// # Returns
    /// - `Ok(true)` if the store answers
    /// - `Ok(false)` if the store is unusable but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Roles ====================

    /// List every role, ordered by ascending id.
    async fn list_roles(&self) -> RepositoryResult<Vec<Role>>;

    // ==================== Workers ====================

    /// List workers, ordered by ascending id.
    ///
    /// # Arguments
    /// * `group` - Restrict to one shift group's pool, or `None` for everyone
    async fn list_workers(&self, group: Option<ShiftGroup>) -> RepositoryResult<Vec<Worker>>;
}
