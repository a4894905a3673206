//! Server configuration loaded from environment variables.

use anyhow::{Context, Result};

/// Runtime configuration of the judging API.
///
/// Every field except the database URL has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Public site origin used in certificate verification URLs.
    pub public_base_url: String,
    /// Program name printed in certificate headers.
    pub program_name: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on pooled database connections (default: `10`).
    pub database_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `DATABASE_URL`             | required                |
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `PUBLIC_BASE_URL`          | `http://localhost:5173` |
    /// | `PROGRAM_NAME`             | `Showcase Hackathon`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `DATABASE_MAX_CONNECTIONS` | `10`                    |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port: u16 = var("PORT", "3000")
            .parse()
            .context("PORT must be a valid u16")?;

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let database_max_connections: u32 = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        Ok(Self {
            database_url,
            host: var("HOST", "0.0.0.0"),
            port,
            public_base_url: var("PUBLIC_BASE_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            program_name: var("PROGRAM_NAME", "Showcase Hackathon"),
            request_timeout_secs,
            database_max_connections,
        })
    }

    /// URL the certificate QR code points at.
    pub fn verification_url(&self, product_id: uuid::Uuid) -> String {
        format!("{}/certificates/{}", self.public_base_url, product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_base_url, "http://localhost:5173");
        assert_eq!(config.program_name, "Showcase Hackathon");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_max_connections, 10);
    }

    #[test]
    fn test_missing_database_url() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let result = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_verification_url_trims_trailing_slash() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("PUBLIC_BASE_URL", "https://showcase.example/"),
        ]))
        .unwrap();
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.verification_url(id),
            "https://showcase.example/certificates/00000000-0000-0000-0000-000000000000"
        );
    }
}
