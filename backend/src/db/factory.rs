//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration. Missing connection parameters never abort the
//! process: they are logged once and produce an [`UnavailableRepository`].

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::SupabaseConfig;
use super::repo_config::RepositoryConfig;
#[cfg(feature = "supabase-repo")]
use super::repositories::SupabaseRepository;
use super::repositories::{LocalRepository, RosterSeed, UnavailableRepository};
use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Remote Supabase project over PostgREST
    Supabase,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("supabase", "remote", "local", "memory")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" | "remote" => Ok(Self::Supabase),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. When unset the store is Supabase, so missing
    /// credentials surface as an unavailable store; the local backend is
    /// opt-in only.
    ///
    /// # Errors
    /// Returns a configuration error when `REPOSITORY_TYPE` names no backend.
    pub fn from_env() -> RepositoryResult<Self> {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(val) if !val.trim().is_empty() => val.parse().map_err(|e: String| {
                RepositoryError::configuration_with_context(
                    e,
                    ErrorContext::new("repository_type_from_env").with_details(val.clone()),
                )
            }),
            _ => Ok(Self::Supabase),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use turni::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None);
/// # let _ = repo;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// A Supabase request without usable connection parameters yields an
    /// [`UnavailableRepository`].
    pub fn create(
        repo_type: RepositoryType,
        supabase_config: Option<&SupabaseConfig>,
    ) -> Arc<dyn FullRepository> {
        match repo_type {
            RepositoryType::Supabase => match supabase_config {
                Some(config) => Self::create_supabase_or_unavailable(config),
                None => Self::unavailable(RepositoryError::configuration(
                    "Supabase repository requires an endpoint URL and access key",
                )),
            },
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Create a Supabase repository.
    #[cfg(feature = "supabase-repo")]
    pub fn create_supabase(config: &SupabaseConfig) -> RepositoryResult<Arc<SupabaseRepository>> {
        let repo = SupabaseRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "supabase-repo")]
    fn create_supabase_or_unavailable(config: &SupabaseConfig) -> Arc<dyn FullRepository> {
        match Self::create_supabase(config) {
            Ok(repo) => repo as Arc<dyn FullRepository>,
            Err(e) => Self::unavailable(e),
        }
    }

    #[cfg(not(feature = "supabase-repo"))]
    fn create_supabase_or_unavailable(config: &SupabaseConfig) -> Arc<dyn FullRepository> {
        let _ = config;
        Self::unavailable(RepositoryError::configuration(
            "Supabase repository feature not enabled",
        ))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a local repository pre-populated with roles and workers.
    pub fn create_local_seeded(seed: RosterSeed) -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::with_seed(seed))
    }

    /// Wrap a configuration failure into the unavailable repository.
    ///
    /// This is the single place the failure gets logged.
    pub fn unavailable(reason: RepositoryError) -> Arc<dyn FullRepository> {
        log::error!("Store unavailable, running with empty data: {}", reason);
        Arc::new(UnavailableRepository::new(reason))
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` to determine which repository to create, and
    /// `SUPABASE_URL` / `SUPABASE_ANON_KEY` for the remote store.
    pub fn from_env() -> Arc<dyn FullRepository> {
        match RepositoryType::from_env() {
            Ok(RepositoryType::Supabase) => match SupabaseConfig::from_env() {
                Ok(config) => Self::create_supabase_or_unavailable(&config),
                Err(e) => Self::unavailable(e),
            },
            Ok(RepositoryType::Local) => {
                log::warn!("Using the in-memory store; assignments are lost on restart");
                Self::create_local()
            }
            Err(e) => Self::unavailable(e),
        }
    }

    /// Create repository from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Repository instance
    /// * `Err(RepositoryError)` - If the file, its type or its seed file cannot be read
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from the default configuration file location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    /// Create repository from a RepositoryConfig instance.
    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Supabase => match config.to_supabase_config() {
                Ok(supabase) => Ok(Self::create_supabase_or_unavailable(&supabase)),
                Err(e) => Ok(Self::unavailable(e)),
            },
            RepositoryType::Local => match config.local_seed()? {
                Some(seed) => Ok(Self::create_local_seeded(seed)),
                None => Ok(Self::create_local()),
            },
        }
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```
/// use turni::db::{RepositoryBuilder, RepositoryType, RosterSeed};
/// use turni::models::Role;
///
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .seed(RosterSeed { roles: vec![Role::new(1, "CF")], workers: vec![] })
///     .build();
/// # let _ = repo;
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    supabase_config: Option<SupabaseConfig>,
    seed: Option<RosterSeed>,
    config_error: Option<RepositoryError>,
}

impl RepositoryBuilder {
    /// Create a new repository builder with default settings.
    ///
    /// Defaults to Supabase; the local backend must be requested explicitly.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::Supabase,
            supabase_config: None,
            seed: None,
            config_error: None,
        }
    }

    /// Set the repository type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Set the Supabase configuration.
    pub fn supabase_config(mut self, config: SupabaseConfig) -> Self {
        self.supabase_config = Some(config);
        self
    }

    /// Seed data for a local repository.
    pub fn seed(mut self, seed: RosterSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Problems found here are kept and turn [`Self::build`] into an
    /// unavailable store.
    pub fn from_env(mut self) -> Self {
        match RepositoryType::from_env() {
            Ok(repo_type) => self.repo_type = repo_type,
            Err(e) => {
                self.config_error = Some(e);
                return self;
            }
        }
        if self.repo_type == RepositoryType::Supabase {
            match SupabaseConfig::from_env() {
                Ok(config) => self.supabase_config = Some(config),
                Err(e) => self.config_error = Some(e),
            }
        }
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(Self)` - Builder with loaded configuration
    /// * `Err(RepositoryError)` - If the file cannot be read or parsed
    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;

        self.repo_type = repo_config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match self.repo_type {
            RepositoryType::Supabase => match repo_config.to_supabase_config() {
                Ok(config) => self.supabase_config = Some(config),
                Err(e) => self.config_error = Some(e),
            },
            RepositoryType::Local => {
                self.seed = repo_config.local_seed()?;
            }
        }

        Ok(self)
    }

    /// Build the repository instance.
    pub fn build(self) -> Arc<dyn FullRepository> {
        if let Some(e) = self.config_error {
            return RepositoryFactory::unavailable(e);
        }
        match (self.repo_type, self.seed) {
            (RepositoryType::Local, Some(seed)) => RepositoryFactory::create_local_seeded(seed),
            (repo_type, _) => RepositoryFactory::create(repo_type, self.supabase_config.as_ref()),
        }
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
