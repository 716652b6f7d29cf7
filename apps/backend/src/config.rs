//! Environment configuration

use std::str::FromStr;

use anyhow::Context;

/// Runtime configuration read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub due_default_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://flashcards.db".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_max_connections: 5,
            due_default_limit: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            due_default_limit: parse_var("SRS_DUE_DEFAULT_LIMIT", defaults.due_default_limit)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service would accept at startup but fail on later.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db_max_connections < 1 {
            anyhow::bail!(
                "DB_MAX_CONNECTIONS must be at least 1, got {}",
                self.db_max_connections
            );
        }
        if self.due_default_limit < 1 {
            anyhow::bail!(
                "SRS_DUE_DEFAULT_LIMIT must be at least 1, got {}",
                self.due_default_limit
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
