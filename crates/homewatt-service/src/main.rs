//! Homewatt Service - HTTP API for household energy estimates.
//!
//! Run with: `cargo run -p homewatt-service`

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use homewatt_service::config::default_config_path;
use homewatt_service::{AppState, Config, api, seed};
use homewatt_store::Store;

/// Homewatt Service - HTTP REST API for household energy estimates.
#[derive(Parser, Debug)]
#[command(name = "homewatt-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Electricity rate per kWh (overrides config).
    #[arg(short, long, global = true)]
    rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Insert sample devices and calculations.
    Seed,

    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("homewatt_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    match &args.command {
        Some(Command::InitConfig { force }) => init_config(args.config.clone(), *force),
        Some(Command::Seed) => {
            let config = load_config(&args)?;
            let store = Store::open(&config.storage.path)?;
            let summary = seed(&store)?;
            println!(
                "Seeded {} devices and {} calculations into {}",
                summary.devices,
                summary.calculations,
                config.storage.path.display()
            );
            Ok(())
        }
        Some(Command::Run) | None => {
            let config = load_config(&args)?;
            run_server(config).await
        }
    }
}

/// Load the configuration file and apply command line overrides.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(db_path) = &args.database {
        config.storage.path = db_path.clone();
    }
    if let Some(rate) = args.rate {
        config.pricing.rate = rate;
    }

    config.validate()?;
    Ok(config)
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(default_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Opening database at {:?}", config.storage.path);
    let store = Store::open(&config.storage.path)?;

    let addr: SocketAddr = config.server.bind.parse()?;
    info!(rate = config.pricing.rate, "Using electricity rate");

    let state = AppState::new(store, config);

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
