use clap::Parser;

/// Runtime settings for the hosting server.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Bughouse room relay", long_about = None)]
pub struct Config {
    /// Address the WebSocket server listens on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8765")]
    pub bind: String,
    /// HTTP worker threads.
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
    /// Outbound frames buffered per connection before it is dropped.
    #[arg(long, env = "OUTBOUND_BUFFER", default_value_t = crate::OUTBOUND_BUFFER)]
    pub buffer: usize,
    /// Forget a room once every player in it has disconnected.
    #[arg(long, env = "EVICT_ABANDONED")]
    pub evict_abandoned: bool,
}
