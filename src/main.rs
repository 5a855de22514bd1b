//! Tablecast Server Entry Point
//!
//! Loads `.env`, parses configuration, initialises logging, then hands
//! over to [`tablecast::server::run`]. Logs go to stderr; set `RUST_LOG`
//! to change verbosity (default `info`).

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tablecast::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error
    dotenv::dotenv().ok();

    let config = ServerConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    tracing::info!(
        port = config.port,
        db_host = %config.db_host,
        db_name = %config.db_name,
        static_dir = %config.static_dir.display(),
        "Tablecast starting"
    );

    tablecast::server::run(config).await
}
