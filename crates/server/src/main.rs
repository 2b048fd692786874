//! Lectern server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use lectern_core::config::AppConfig;
use lectern_server::bootstrap::{ensure_admin_user, seed_catalog};
use lectern_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lectern - an e-learning course platform backend
#[derive(Parser, Debug)]
#[command(name = "lecternd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "LECTERN_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Lectern v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("LECTERN_") && key != "LECTERN_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: lecternd --config /path/to/config.toml\n  \
             2. Environment variables: LECTERN_SERVER__BIND=0.0.0.0:8080 \
             LECTERN_AUTH__JWT_SECRET=... LECTERN_ADMIN__USERNAME=admin \
             LECTERN_ADMIN__EMAIL=... LECTERN_ADMIN__PASSWORD=... lecternd\n\n\
             Set LECTERN_CONFIG to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("LECTERN_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize metadata store
    let metadata = lectern_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    // First-start initialization
    ensure_admin_user(metadata.as_ref(), &config.admin).await?;
    seed_catalog(metadata.as_ref()).await?;

    // Create application state and router
    let state = AppState::new(config.clone(), metadata);
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
