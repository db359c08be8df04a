//! Healthstream API Server
//!
//! Run with: cargo run --bin healthstream
//!
//! Configuration is read from the first of
//! `~/.config/healthstream/config.toml`, `/etc/healthstream/config.toml` and
//! `./config.toml`, or from `--config`. Environment variables
//! (`HEALTHSTREAM_API_HOST`, `HEALTHSTREAM_API_PORT`, ...) override file
//! values and `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use healthstream::api::{serve, AppState};
use healthstream::config::Config;
use healthstream::logging::init_tracing;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "healthstream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Apple Health export API server")]
struct Args {
    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging).context("initializing logging")?;

    tracing::info!("Starting Healthstream API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        gap_hours = config.sleep.gap_hours,
        vital_types = config.parser.vital_types.len(),
        "Configuration loaded"
    );

    serve(AppState::new(config)).await?;

    Ok(())
}
