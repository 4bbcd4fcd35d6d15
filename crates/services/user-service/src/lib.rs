//! User Service Library
//!
//! User management over gRPC: domain service, use cases, interceptor chain,
//! gRPC adapters for the user and health services, migrations and seeding.

pub mod config;
pub mod grpc;
pub mod infra;
pub mod repository;
pub mod seed;
pub mod service;
pub mod usecase;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tonic::transport::Server;
use tracing::{info, warn};

use crate::config::UserServiceConfig;
use crate::grpc::{HealthGrpcService, InterceptorChain, UserGrpcService};
use crate::infra::Database;
use crate::repository::UserStore;
use crate::seed::SeedData;
use crate::service::UserManager;
use crate::usecase::UserUseCase;

const HTTP2_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);
const HTTP2_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(1);
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &UserServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for migration in db.migration_status().await? {
                println!("{}", migration);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Load fixture users into the database, optionally clearing it first.
pub async fn run_seed(
    config: &UserServiceConfig,
    file: &Path,
    clean: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    let store = Arc::new(UserStore::new(db.get_connection()));

    if clean {
        info!("Cleaning existing data");
        match store.purge().await {
            Ok(removed) => info!(removed, "Cleared existing users"),
            Err(err) => warn!(error = %err, "Failed to clear users"),
        }
    }

    let data = SeedData::from_file(file)?;
    let service = UserManager::new(store.clone(), config.hash_cost);
    let report = seed::seed_users(store.as_ref(), &service, &data.users).await?;

    info!(
        created = report.created,
        skipped = report.skipped,
        total = report.total,
        "Database seeding completed"
    );
    Ok(())
}

/// Run the gRPC server with the given configuration until a shutdown signal.
pub async fn run_server(config: UserServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize database
    let db = Database::connect(&config.database).await?;

    // Wire repository, domain service and use cases
    let user_repo = Arc::new(UserStore::new(db.get_connection()));
    let user_service = Arc::new(UserManager::new(user_repo.clone(), config.hash_cost));
    let usecase = UserUseCase::new(user_repo, user_service);

    let chain = InterceptorChain::new(config.server.auth_enabled);
    let user_grpc = UserGrpcService::new(usecase, chain);
    let health_grpc = HealthGrpcService::new(Arc::new(db), chain);

    let addr: SocketAddr = config.server.addr().parse()?;
    info!(
        %addr,
        auth_enabled = chain.auth_enabled(),
        "User service listening"
    );

    Server::builder()
        .http2_keepalive_interval(Some(HTTP2_KEEPALIVE_INTERVAL))
        .http2_keepalive_timeout(Some(HTTP2_KEEPALIVE_TIMEOUT))
        .tcp_keepalive(Some(TCP_KEEPALIVE))
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .add_service(proto::UserServiceServer::new(user_grpc))
        .add_service(proto::HealthServiceServer::new(health_grpc))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    info!("User service stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
