//! Repository implementations module.
//!
//! This module contains the implementations of the repository traits:
//! - `supabase`: PostgREST client for a Supabase project
//! - `local`: In-memory implementation for unit testing and local development
//! - `unavailable`: Stand-in used when connection parameters are missing
pub mod local;
#[cfg(feature = "supabase-repo")]
pub mod supabase;
pub mod unavailable;

pub use local::{LocalRepository, RosterSeed};
#[cfg(feature = "supabase-repo")]
pub use supabase::{RequestStats, RestQuery, SupabaseRepository};
pub use unavailable::UnavailableRepository;
