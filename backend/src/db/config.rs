//! Store connection configuration and environment variable handling.

use std::env;
use std::fmt;

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

const DEFAULT_TIMEOUT_SEC: u64 = 30;

/// Connection parameters for a Supabase project.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project endpoint, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous access key
    pub anon_key: String,
    /// Per-request timeout in seconds
    pub timeout_sec: u64,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("timeout_sec", &self.timeout_sec)
            .finish()
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }
}

impl SupabaseConfig {
    /// Create a new configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SUPABASE_URL` (required, `VITE_SUPABASE_URL` accepted as fallback)
    /// - `SUPABASE_ANON_KEY` (required, `VITE_SUPABASE_ANON_KEY` accepted as fallback)
    /// - `SUPABASE_TIMEOUT_SEC` (optional, default: 30)
    ///
    /// # Errors
    /// Returns a configuration error naming the first missing variable.
    pub fn from_env() -> RepositoryResult<Self> {
        let url = first_env(&["SUPABASE_URL", "VITE_SUPABASE_URL"]).ok_or_else(|| {
            RepositoryError::configuration_with_context(
                "SUPABASE_URL environment variable not set",
                ErrorContext::new("supabase_from_env"),
            )
        })?;
        let anon_key =
            first_env(&["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]).ok_or_else(|| {
                RepositoryError::configuration_with_context(
                    "SUPABASE_ANON_KEY environment variable not set",
                    ErrorContext::new("supabase_from_env"),
                )
            })?;

        let timeout_sec = env::var("SUPABASE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SEC);

        Ok(Self {
            url,
            anon_key,
            timeout_sec,
        })
    }

    /// Create a configuration with an endpoint and key.
    pub fn with_credentials(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            ..Default::default()
        }
    }

    /// Check that both connection parameters are present.
    pub fn validate(&self) -> RepositoryResult<()> {
        if self.url.trim().is_empty() {
            return Err(RepositoryError::configuration_with_context(
                "Supabase endpoint URL is empty",
                ErrorContext::new("validate_config").with_entity("supabase"),
            ));
        }
        if self.anon_key.trim().is_empty() {
            return Err(RepositoryError::configuration_with_context(
                "Supabase access key is empty",
                ErrorContext::new("validate_config").with_entity("supabase"),
            ));
        }
        Ok(())
    }

    /// REST endpoint of one collection.
    pub fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), collection)
    }
}

/// First non-blank value among `names`.
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
