//! Runtime configuration
//!
//! Read from environment variables at startup.

use std::path::PathBuf;

/// User id used when a tool call doesn't name one
pub const DEFAULT_USER_ID: &str = "local";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub default_user_id: String,
    /// Attempts per daily-log lookup before the fetch fails (1 = no retry)
    pub fetch_attempts: u32,
}

impl Config {
    /// Build the configuration from `NUTRACK_*` environment variables
    pub fn from_env() -> Self {
        let database_path = std::env::var("NUTRACK_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let default_user_id = std::env::var("NUTRACK_USER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let fetch_attempts = std::env::var("NUTRACK_FETCH_ATTEMPTS")
            .ok()
            .map(|s| parse_attempts(&s))
            .unwrap_or(1);

        Self {
            database_path,
            default_user_id,
            fetch_attempts,
        }
    }
}

fn parse_attempts(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(1).max(1)
}

/// `data/nutrack.db` next to the project root when running from `target/`
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutrack.db");
    path
}
