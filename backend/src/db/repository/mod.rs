//! Repository trait definitions for store operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`catalog`]: Read access to roles and workers
//! - [`assignment`]: Select/upsert of assignment records
//!
//! # Convenience Trait Bound
//!
//! For functions that need every capability, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn week<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let roles = repo.list_roles().await?;
//!     let shifts = repo.list_assignments_for_days(&Weekday::WEEK).await?;
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod catalog;
pub mod error;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use assignment::AssignmentRepository;
pub use catalog::CatalogRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: CatalogRepository + AssignmentRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: CatalogRepository + AssignmentRepository {}

impl std::fmt::Debug for dyn FullRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn FullRepository")
    }
}
