//! User service configuration.

use common::{env_parse, DatabaseConfig, ServerConfig};
use domain::HashCost;

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Argon2 work factor for new password hashes
    pub hash_cost: HashCost,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = HashCost::default();
        Self {
            database: DatabaseConfig::from_env(),
            server: ServerConfig::from_env(),
            hash_cost: HashCost {
                memory_kib: env_parse("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib),
                iterations: env_parse("PASSWORD_HASH_ITERATIONS", defaults.iterations),
                parallelism: env_parse("PASSWORD_HASH_PARALLELISM", defaults.parallelism),
            },
        }
    }

    /// Override the bind address, e.g. from command line flags.
    pub fn with_addr(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}
