//! Application configuration management

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::graphql::GraphqlSettings;

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => anyhow::bail!("unknown log format '{}'", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database URL, created if missing
    pub database_url: String,

    pub database_max_connections: u32,

    /// Upper bound on `first`/`last` and the default page size
    pub graphql_max_page_size: i64,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("HOST", "0.0.0.0"),

            port: var("PORT", "8000").parse().context("Invalid PORT")?,

            database_url: var("DATABASE_URL", "sqlite:crm.db"),

            database_max_connections: var("DATABASE_MAX_CONNECTIONS", "5")
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            graphql_max_page_size: var("GRAPHQL_MAX_PAGE_SIZE", "100")
                .parse()
                .context("Invalid GRAPHQL_MAX_PAGE_SIZE")?,

            log_format: var("LOG_FORMAT", "json")
                .parse()
                .context("Invalid LOG_FORMAT")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn graphql_settings(&self) -> GraphqlSettings {
        GraphqlSettings {
            max_page_size: self.graphql_max_page_size,
        }
    }
}
