//! Atelier server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start with an empty artwork directory
//! atelier-server --bind 0.0.0.0:9400
//!
//! # Seed artworks from a manifest at startup
//! atelier-server --bind 0.0.0.0:9400 --artworks artworks.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use atelier_core::MemoryDirectory;
use atelier_server::{AppState, Server, ServerConfig, load_manifest, seed_directory};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Artwork share server
#[derive(Parser, Debug)]
#[command(name = "atelier-server")]
#[command(about = "Realtime artwork share and acknowledgment server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:9400")]
    bind: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "1024")]
    max_connections: usize,

    /// JSON manifest of artworks to seed at startup
    #[arg(long)]
    artworks: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Atelier server starting");

    let directory = Arc::new(MemoryDirectory::new());

    if let Some(path) = &args.artworks {
        let seeds = load_manifest(path)?;
        let count = seed_directory(&directory, seeds);
        tracing::info!(count, manifest = %path.display(), "seeded artworks");
    } else {
        tracing::warn!("No artwork manifest given - share requests will find no content");
    }

    let config = ServerConfig { bind_address: args.bind, max_connections: args.max_connections };
    let state = AppState::new(directory);

    let server = Server::bind(config, state).await?;
    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
