//! Print an analytics report as JSON
//!
//! Usage: analytics_report [RANGE] [START] [END]
//!
//! RANGE is 7d, 30d, 3m, 1y or custom (default 30d). START and END are
//! YYYY-MM-DD and only used with `custom`. The user comes from NUTRACK_USER.

use std::sync::Arc;

use chrono::Local;
use tracing_subscriber::EnvFilter;

use nutrack::analytics::{AnalyticsEngine, AnalyticsError, AnalyticsQuery, TimeRange};
use nutrack::config::Config;
use nutrack::db::{migrations, Database};
use nutrack::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutrack=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let range_arg = args.first().map(String::as_str).unwrap_or("30d");
    let range = TimeRange::from_str(range_arg)
        .ok_or_else(|| AnalyticsError::UnknownRange(range_arg.to_string()))?;
    let query = AnalyticsQuery {
        range,
        start: args.get(1).cloned(),
        end: args.get(2).cloned(),
    };

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let engine = AnalyticsEngine::new(Arc::new(SqliteStore::new(database)), config.fetch_attempts);
    let today = Local::now().date_naive();
    let report = engine.report(&config.default_user_id, &query, today).await?;

    println!("{}", serde_json::to_string_pretty(report.as_ref())?);
    Ok(())
}
