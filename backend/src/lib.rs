//! # Turni Backend
//!
//! Weekly shift roster for a small operations team.
//!
//! Every day of the week has three shift groups (A, B and C). Each shift
//! staffs a fixed set of roles with workers drawn from that group's pool,
//! and a worker may hold at most one role per shift. The backend keeps
//! those assignments in a Supabase project and renders the whole week as a
//! printable document.
//!
//! ## Architecture
//!
//! - [`models`]: Roles, workers, assignments, weekdays and shift groups
//! - [`db`]: Repository traits and the Supabase, local and unavailable stores
//! - [`services`]: The assignment registry and the weekly export
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
