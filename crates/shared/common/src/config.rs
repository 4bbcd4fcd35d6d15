//! Shared configuration structures.
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binary before these are read); anything missing or unparsable falls back
//! to the default.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Read `key` from the environment, or `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse `key`, or `default` when unset or unparsable.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean flag: `1`, `true`, `yes` and `on` (any case) are true.
pub fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// PostgreSQL connection and pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub ssl_mode: String,
    /// Full connection URL; takes precedence over the individual parts
    #[serde(skip_serializing)]
    pub url: Option<String>,
    /// Upper bound of pooled connections
    pub max_open_conns: u32,
    /// Connections kept open while idle
    pub max_idle_conns: u32,
    pub conn_max_lifetime_secs: u64,
    pub connect_timeout_secs: u64,
    /// Log every SQL statement
    pub log_sql: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("DATABASE_HOST", &defaults.host),
            port: env_parse("DATABASE_PORT", defaults.port),
            name: env_or("DATABASE_NAME", &defaults.name),
            username: env_or("DATABASE_USERNAME", &defaults.username),
            password: env_or("DATABASE_PASSWORD", &defaults.password),
            ssl_mode: env_or("DATABASE_SSL_MODE", &defaults.ssl_mode),
            url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            max_open_conns: env_parse("DATABASE_MAX_OPEN_CONNS", defaults.max_open_conns),
            max_idle_conns: env_parse("DATABASE_MAX_IDLE_CONNS", defaults.max_idle_conns),
            conn_max_lifetime_secs: env_parse(
                "DATABASE_CONN_MAX_LIFETIME",
                defaults.conn_max_lifetime_secs,
            ),
            connect_timeout_secs: env_parse(
                "DATABASE_CONNECT_TIMEOUT",
                defaults.connect_timeout_secs,
            ),
            log_sql: env_flag("DATABASE_LOG_SQL", defaults.log_sql),
        }
    }

    /// Connection URL, built from the parts unless `url` is set.
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                self.username, self.password, self.host, self.port, self.name, self.ssl_mode
            ),
        }
    }

    /// Idle connections never exceed the pool size.
    pub fn min_connections(&self) -> u32 {
        self.max_idle_conns.min(self.max_open_conns)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "user_db".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            ssl_mode: "disable".to_string(),
            url: None,
            max_open_conns: 25,
            max_idle_conns: 25,
            conn_max_lifetime_secs: 300,
            connect_timeout_secs: 10,
            log_sql: false,
        }
    }
}

/// gRPC server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single call
    pub request_timeout_secs: u64,
    /// Require an `authorization` entry on non-public methods
    pub auth_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("SERVER_HOST", &defaults.host),
            port: env_parse("SERVER_PORT", defaults.port),
            request_timeout_secs: env_parse(
                "SERVER_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            auth_enabled: env_flag("SERVER_AUTH_ENABLED", defaults.auth_enabled),
        }
    }

    /// `host:port` for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            request_timeout_secs: 30,
            auth_enabled: false,
        }
    }
}
