//! `bulwark-relay`: wave-seed relay server for two-player matches.

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use bulwark_relay::RelayServer;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on.
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:7878")]
    bind: String,

    /// Seed for the wave seed stream. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let server = RelayServer::bind(&args.bind, seed)
        .await
        .with_context(|| format!("binding relay to {}", args.bind))?;
    tracing::info!(addr = %server.local_addr()?, seed, "relay ready");

    server.run().await.context("relay stopped")?;
    Ok(())
}
