//! Server configuration

use std::env;

use cascade_engine::DEFAULT_STEP_LIMIT;

/// Runtime configuration for the cascade server, sourced from the
/// environment with sensible defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// SQLite connection string for the workflow document store
    pub database_url: String,
    /// Cap on node executions per workflow run
    pub step_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite:cascade.db?mode=rwc".to_string(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `HOST`, `PORT`, `DATABASE_URL`, and
    /// `STEP_LIMIT`, falling back to defaults for anything unset or
    /// unparseable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            step_limit: env::var("STEP_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.step_limit),
        }
    }

    /// The socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.step_limit, DEFAULT_STEP_LIMIT);
    }
}
