//! Nutrack
//!
//! An MCP server for nutrition tracking and analytics.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nutrack::analytics::AnalyticsEngine;
use nutrack::build_info;
use nutrack::config::Config;
use nutrack::db::{self, Database};
use nutrack::mcp::NutrackService;
use nutrack::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutrack=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let store = SqliteStore::new(database);
    let engine = AnalyticsEngine::new(Arc::new(store.clone()), config.fetch_attempts);
    let _invalidation = engine.start_invalidation();
    info!(
        user = %config.default_user_id,
        fetch_attempts = config.fetch_attempts,
        "analytics engine ready"
    );

    let service = NutrackService::new(&config, store, engine);

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
