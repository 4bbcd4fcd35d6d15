//! Connection pool, migrations and liveness for PostgreSQL.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    EntityTrait,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use common::{AppResult, DatabaseConfig};

use super::migrations::Migrator;
use crate::grpc::DatabaseProbe;

/// Owns the pool for the lifetime of the process.
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Initialize database connection and run migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;

        // Run pending migrations
        Migrator::up(&db.connection, None).await?;
        tracing::info!("Database connected and migrations applied");

        Ok(db)
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url());
        options
            .max_connections(config.max_open_conns)
            .min_connections(config.min_connections())
            .max_lifetime(Duration::from_secs(config.conn_max_lifetime_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.log_sql);

        let connection = SeaDatabase::connect(options).await?;
        tracing::debug!(
            host = %config.host,
            database = %config.name,
            max_connections = config.max_open_conns,
            "Database pool ready"
        );
        Ok(Self { connection })
    }

    /// Handle for repositories; clones share the pool.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Revert the most recent migration only.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Every known migration in declaration order, flagged when applied.
    pub async fn migration_status(&self) -> Result<Vec<MigrationState>, DbErr> {
        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|row| row.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|migration| {
                let name = migration.name().to_string();
                MigrationState {
                    applied: applied.contains(&name),
                    name,
                }
            })
            .collect())
    }

    /// Drop every table, then apply all migrations.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.execute_unprepared("SELECT 1").await?;
        Ok(())
    }
}

/// One row of `migrate status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

impl std::fmt::Display for MigrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.applied { "[x]" } else { "[ ]" };
        write!(f, "{} {}", marker, self.name)
    }
}

#[async_trait]
impl DatabaseProbe for Database {
    async fn ping(&self) -> AppResult<()> {
        Ok(Database::ping(self).await?)
    }
}
