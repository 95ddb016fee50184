mod config;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use crm::{auth::issue_token, build_schema, seed::seed_crm_demo, users, UserRole};
use migration::{Migrator, MigratorTrait};
use platform_obs::{init_tracing, ObsConfig};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, DEV_SECRET},
    http::AppState,
};

#[derive(Parser, Debug)]
#[command(name = "crm-server", version, about = "CRM cadence and sharing server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations, then start the HTTP + GraphQL server.
    Serve {
        #[arg(long, help = "Override the BIND address")]
        bind: Option<std::net::SocketAddr>,
    },
    /// Run database migrations.
    Migrate {
        #[arg(long, value_enum, default_value_t = MigrateAction::Up)]
        action: MigrateAction,
    },
    /// Insert demo users, a lead and the Outbound-5 cadence.
    Seed,
    /// Print the GraphQL SDL.
    PrintSchema {
        #[arg(long, value_name = "FILE", help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Mint a session token for an existing user.
    IssueToken {
        #[arg(long)]
        email: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MigrateAction {
    Up,
    Down,
    Reset,
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(ObsConfig::from_env())?;
    if config.auth.jwt_secret == DEV_SECRET {
        warn!("AUTH_SECRET not set; using the development secret");
    }

    match cli.command {
        Command::PrintSchema { output } => print_schema(output),
        Command::Serve { bind } => {
            let db = connect(&config).await?;
            run_server(config, db, bind).await
        }
        Command::Migrate { action } => {
            let db = connect(&config).await?;
            migrate(&db, action).await
        }
        Command::Seed => {
            let db = connect(&config).await?;
            let seeded = seed_crm_demo(&db).await.context("seed data failed")?;
            for user in &seeded.users {
                info!(email = %user.email, role = ?user.role, "seeded user");
            }
            Ok(())
        }
        Command::IssueToken { email } => {
            let db = connect(&config).await?;
            let user = users::find_by_email(&db, &email)
                .await
                .with_context(|| format!("no user with email {email}"))?;
            if !user.is_active {
                bail!("user {} is inactive", user.email);
            }
            let token = issue_token(user.id, UserRole::from(user.role), &config.auth, Utc::now())?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    config
        .database
        .connect()
        .await
        .context("database connection failed")
}

async fn migrate(db: &DatabaseConnection, action: MigrateAction) -> Result<()> {
    match action {
        MigrateAction::Up => Migrator::up(db, None).await?,
        MigrateAction::Down => Migrator::down(db, Some(1)).await?,
        MigrateAction::Reset => Migrator::reset(db).await?,
        MigrateAction::Fresh => Migrator::fresh(db).await?,
    }
    info!(?action, "migrations finished");
    Ok(())
}

fn print_schema(output: Option<PathBuf>) -> Result<()> {
    let sdl = build_schema(Arc::new(DatabaseConnection::Disconnected)).sdl();
    match output {
        Some(path) => {
            std::fs::write(&path, sdl)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "schema written");
        }
        None => println!("{sdl}"),
    }
    Ok(())
}

async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
    bind: Option<std::net::SocketAddr>,
) -> Result<()> {
    let pending = Migrator::get_pending_migrations(&db).await?;
    if !pending.is_empty() {
        info!(pending = pending.len(), "applying pending migrations");
        Migrator::up(&db, None).await?;
    }

    let db = Arc::new(db);
    let state = AppState {
        schema: build_schema(db.clone()),
        db,
        auth: Arc::new(config.auth.clone()),
    };
    let router = http::build_router(state, &config.cors_allowed_origins);
    http::serve(bind.unwrap_or(config.bind), router).await
}
