//! Hosting Server Binary
//!
//! Runs the WebSocket relay for live bughouse rooms.
//! Clients connect, send `join` with a room id, and play.

use bughouse::*;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    let config = hosting::Config::parse();
    log::info!("{:?}", config);
    hosting::Server::run(config).await?;
    Ok(())
}
