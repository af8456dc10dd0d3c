use clap::Parser;

pub mod config;
pub mod main;
mod prettylog;

/// Bot dashboard data poller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Data source: http(s) base URL or local data directory
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP API port (disabled if not specified)
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Load once, print the snapshot as JSON and exit
    #[arg(long)]
    pub once: bool,
}
