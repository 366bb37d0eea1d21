//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_FUNCTION_PREFIX: &str = "store-api";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Path segment that marks where API paths begin (`.../store-api/products`).
    pub function_prefix: String,
    /// Postgres URL. `None` means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl ApiConfig {
    /// Defaults with the given secret and no database. Used by tests.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: jwt_secret.into(),
            function_prefix: DEFAULT_FUNCTION_PREFIX.to_string(),
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so parsing can be tested without touching
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let function_prefix = match lookup("FUNCTION_PREFIX") {
            None => DEFAULT_FUNCTION_PREFIX.to_string(),
            Some(raw) => {
                let trimmed = raw.trim().trim_matches('/').to_string();
                if trimmed.is_empty() {
                    return Err(ConfigError::Empty { var: "FUNCTION_PREFIX" });
                }
                trimmed
            }
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            function_prefix,
            database_url: get("DATABASE_URL"),
            database_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(c.function_prefix, "store-api");
        assert_eq!(c.database_url, None);
        assert_eq!(c.database_max_connections, 5);
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("JWT_SECRET", "s3cret"),
            ("FUNCTION_PREFIX", "/shop-api/"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(c.bind_addr.port(), 3000);
        assert_eq!(c.jwt_secret, "s3cret");
        assert_eq!(c.function_prefix, "shop-api");
        assert_eq!(c.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(c.database_max_connections, 12);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(config(&[("BIND_ADDR", "nope")]), Err(ConfigError::InvalidAddr { .. })));
        assert!(matches!(
            config(&[("DATABASE_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert_eq!(
            config(&[("FUNCTION_PREFIX", " / ")]).unwrap_err(),
            ConfigError::Empty { var: "FUNCTION_PREFIX" }
        );
    }
}
