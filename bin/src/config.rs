//! Runtime configuration from the environment.

use std::{env, path::PathBuf};

/// Default SQLite database path.
const DEFAULT_DATABASE: &str = "ronda.db";

/// Settings read from the environment and `.env`.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// SQLite database path (`RONDA_DATABASE`, default: ronda.db)
    pub(crate) database: PathBuf,

    /// FMP API key (`FMP_API_KEY`)
    pub(crate) fmp_api_key: Option<String>,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub(crate) fn from_env() -> Self {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self {
            database: env::var("RONDA_DATABASE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_DATABASE), PathBuf::from),
            fmp_api_key: env::var("FMP_API_KEY").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Apply command-line overrides.
    pub(crate) fn with_database(mut self, database: Option<PathBuf>) -> Self {
        if let Some(db) = database {
            self.database = db;
        }
        self
    }
}
