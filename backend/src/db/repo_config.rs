//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files:
//!
//! ```toml
//! [repository]
//! type = "supabase"
//!
//! [supabase]
//! url = "https://xyz.supabase.co"
//! anon_key = "..."
//!
//! [local]
//! seed_file = "roster.json"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::SupabaseConfig;
use super::factory::RepositoryType;
use super::repositories::RosterSeed;
use super::repository::{ErrorContext, RepositoryError};

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub local: LocalSettings,
    /// Directory of the file this was read from; relative seed paths resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Supabase connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

/// Local development settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// JSON file with `roles` and `workers` arrays
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_timeout_sec() -> u64 {
    30
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                ErrorContext::new("load_config").with_details(path.display().to_string()),
            )
        })?;

        let mut config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                ErrorContext::new("load_config").with_details(path.display().to_string()),
            )
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// First `repository.toml` found in the standard locations:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn find_default_path() -> Option<PathBuf> {
        [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load repository configuration from the default location.
    ///
    /// See [`Self::find_default_path`] for the search order.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        match Self::find_default_path() {
            Some(path) => Self::from_file(&path),
            None => Err(RepositoryError::configuration(
                "No repository.toml found in standard locations",
            )),
        }
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Build the Supabase connection parameters.
    ///
    /// # Errors
    /// Returns a configuration error when the URL or key is blank.
    pub fn to_supabase_config(&self) -> Result<SupabaseConfig, RepositoryError> {
        let config = SupabaseConfig {
            url: self.supabase.url.clone(),
            anon_key: self.supabase.anon_key.clone(),
            timeout_sec: self.supabase.timeout_sec,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read the local seed file, if one is configured.
    pub fn local_seed(&self) -> Result<Option<RosterSeed>, RepositoryError> {
        let Some(ref seed_file) = self.local.seed_file else {
            return Ok(None);
        };

        let path = match self.base_dir {
            Some(ref base) if seed_file.is_relative() => base.join(seed_file),
            _ => seed_file.clone(),
        };
        RosterSeed::from_file(path).map(Some)
    }
}
