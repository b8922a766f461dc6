//! Store access for roles, workers and shift assignments.
//!
//! This module provides abstractions for store operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer (http/) and services (registry, export)      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼──────────────────┬────────────────┐
//!     │   Supabase    │      Local       │  Unavailable   │
//!     │  (PostgREST)  │   (in-memory)    │ (no config)    │
//!     └───────────────┴──────────────────┴────────────────┘
//! ```
//!
//! # Modules
//! - `repository`: Trait definitions and the error type
//! - `repositories::supabase`: PostgREST client
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `repositories::unavailable`: Stand-in used when connection parameters are missing
//! - `config`: Connection parameters from the environment
//! - `repo_config`: `repository.toml` support
//! - `factory`: Factory and builder for creating repository instances
//!
//! # Usage
//! ```
//! use turni::db::{RepositoryFactory, RepositoryType};
//!
//! let repo = RepositoryFactory::create(RepositoryType::Local, None);
//! # let _ = repo;
//! ```

#[cfg(not(any(feature = "supabase-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use config::SupabaseConfig;
pub use repo_config::RepositoryConfig;

// Repository trait and implementations
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::{LocalRepository, RosterSeed, UnavailableRepository};
#[cfg(feature = "supabase-repo")]
pub use repositories::{RestQuery, SupabaseRepository};
pub use repository::{
    AssignmentRepository, CatalogRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult,
};

/// Check whether the store answers, folding errors into `false`.
pub async fn health_check(repo: &dyn FullRepository) -> bool {
    match repo.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            log::warn!("Store health check failed: {}", e);
            false
        }
    }
}
