//! User Service - gRPC server for user management.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_lib::config::UserServiceConfig;
use user_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User management microservice")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gRPC server
    Serve {
        /// Bind host
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        /// Bind port
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Load development users from a JSON fixture
    Seed {
        #[arg(long, default_value = "fixtures/users.json")]
        file: PathBuf,
        /// Remove all existing users first
        #[arg(long)]
        clean: bool,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = UserServiceConfig::from_env();

    match cli.command {
        Commands::Serve { host, port } => {
            user_service_lib::run_server(config.with_addr(host, port)).await?;
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            user_service_lib::run_migrations(&config, migrate_action).await?;
        }
        Commands::Seed { file, clean } => {
            user_service_lib::run_seed(&config, &file, clean).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "user-service",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "6000",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(6000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_flags_declare_env_fallbacks() {
        let command = <Cli as clap::CommandFactory>::command();
        let serve = command.find_subcommand("serve").unwrap();
        let env_of = |id: &str| {
            serve
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("host").as_deref(), Some("SERVER_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("SERVER_PORT"));
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["user-service", "seed"]).unwrap();
        match cli.command {
            Commands::Seed { file, clean } => {
                assert_eq!(file, PathBuf::from("fixtures/users.json"));
                assert!(!clean);
            }
            _ => panic!("expected seed"),
        }
    }
}
