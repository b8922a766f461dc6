//! Roster HTTP Server Binary
//!
//! This is the main entry point for the roster REST API server.
//! It initializes the repository, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run against a Supabase project
//! SUPABASE_URL=https://xyz.supabase.co SUPABASE_ANON_KEY=... \
//!   cargo run --bin turni-server
//!
//! # Run with the local (in-memory) repository
//! REPOSITORY_TYPE=local cargo run --bin turni-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_CONFIG`: Path to a repository.toml (optional; standard locations are searched otherwise)
//! - `REPOSITORY_TYPE`: `supabase` (default) or `local` when no repository.toml is found
//! - `SUPABASE_URL` / `SUPABASE_ANON_KEY`: Store connection parameters
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use turni::db::{self, FullRepository, RepositoryConfig, RepositoryFactory};
use turni::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting roster HTTP server");

    let repository = create_repository()?;
    report_store(repository.as_ref()).await;

    // Create application state
    let state = AppState::new(repository);

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the store from an explicit config file, a discovered one, or the environment.
fn create_repository() -> anyhow::Result<Arc<dyn FullRepository>> {
    if let Ok(path) = env::var("REPOSITORY_CONFIG") {
        info!("Loading repository configuration from {}", path);
        return Ok(RepositoryFactory::from_config_file(&path)?);
    }

    match RepositoryConfig::find_default_path() {
        Some(path) => {
            info!("Loading repository configuration from {}", path.display());
            Ok(RepositoryFactory::from_config_file(&path)?)
        }
        None => Ok(RepositoryFactory::from_env()),
    }
}

/// Log how many workers the store returns, as a startup connectivity check.
async fn report_store(repository: &dyn FullRepository) {
    if !db::health_check(repository).await {
        warn!("Store is not reachable; reads will return empty data");
        return;
    }

    match repository.list_workers(None).await {
        Ok(workers) => info!("Store connected: {} workers", workers.len()),
        Err(e) => warn!("Store connection check failed: {}", e),
    }
}
