use std::fs;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ejournal::config::{DatabaseConfig, ServerConfig};
use ejournal::server::{AppState, create_router};
use ejournal::store::{SqliteStore, Store};
use ejournal::types::{NewUser, Role};

#[derive(Parser)]
#[command(name = "ejournal")]
#[command(about = "A school electronic journal backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Path or sqlite:// URL of the journal database
        #[arg(long, env = "DATABASE_URL", default_value = "./data/ejournal.db")]
        database_url: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create the database schema
    Init {
        /// Path or sqlite:// URL of the journal database
        #[arg(long, env = "DATABASE_URL", default_value = "./data/ejournal.db")]
        database_url: String,
    },

    /// Register a teacher or student
    AddUser {
        /// Path or sqlite:// URL of the journal database
        #[arg(long, env = "DATABASE_URL", default_value = "./data/ejournal.db")]
        database_url: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        full_name: String,

        /// Either "teacher" or "student"
        #[arg(long)]
        role: String,
    },
}

fn open_store(database_url: &str) -> anyhow::Result<SqliteStore> {
    let database = DatabaseConfig::new(database_url);
    let db_path = database.db_path()?;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(SqliteStore::connect(&database)?)
}

fn run_init(database_url: &str) -> anyhow::Result<()> {
    let store = open_store(database_url)?;
    store.initialize()?;
    println!("Initialized database at {database_url}");
    Ok(())
}

fn run_add_user(
    database_url: &str,
    email: String,
    full_name: String,
    role: &str,
) -> anyhow::Result<()> {
    let role = Role::parse(role)?;
    let email = email.trim().to_string();
    let full_name = full_name.trim().to_string();
    if email.is_empty() || full_name.is_empty() {
        bail!("email and full name must not be empty");
    }

    let store = open_store(database_url)?;
    store.initialize()?;
    let id = store
        .create_user(&NewUser {
            email,
            full_name,
            role,
        })
        .context("failed to create user")?;

    println!("{id}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ejournal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { database_url } => run_init(&database_url)?,
            AdminCommands::AddUser {
                database_url,
                email,
                full_name,
                role,
            } => run_add_user(&database_url, email, full_name, &role)?,
        },
        Commands::Serve {
            host,
            port,
            database_url,
        } => {
            let config = ServerConfig {
                host,
                port,
                database_url,
            };

            // Schema must exist before the first request opens a connection.
            open_store(&config.database_url)?.initialize()?;

            let state = Arc::new(AppState::new(config.database()));
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
