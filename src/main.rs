//! mathsketch - Handwritten math recognition gateway
//!
//! Serves `POST /calculate`: canvas snapshots in, solved expressions out.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mathsketch::config::{self, AppConfig};
use mathsketch::gateway::{GeminiClient, RecognitionGateway};
use mathsketch::server;

/// mathsketch - Handwritten math recognition gateway
#[derive(Parser, Debug)]
#[command(name = "mathsketch")]
#[command(about = "HTTP gateway from canvas snapshots to solved math expressions")]
struct Args {
    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides configuration)
    #[arg(long)]
    bind: Option<String>,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // Load or create configuration
    let mut config = match args.config {
        Some(ref path) => config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => load_or_create_config(),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("mathsketch starting...");

    let model = GeminiClient::from_config(&config.model)
        .context("Failed to build model HTTP client")?;
    if !model.has_api_key() {
        warn!(
            "{} is not set; recognition requests will return an error item",
            config.model.api_key_env
        );
    }
    let gateway = Arc::new(RecognitionGateway::new(Arc::new(model)));

    server::serve(&config, gateway).await?;

    info!("mathsketch shutdown complete");
    Ok(())
}

/// Load configuration from the default location or fall back to defaults
fn load_or_create_config() -> AppConfig {
    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
