//! Fog Chess - king-capture fog-of-war chess server
//!
//! Run with: `cargo run --package fog-chess -- --listen-addr 127.0.0.1:3001`

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use fog_chess::ServerConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "fog-chess")]
#[command(about = "Fog-of-war chess server where kings are captured, not mated")]
struct Args {
    /// HTTP/WebSocket listen address.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3001")]
    listen_addr: SocketAddr,

    /// Seconds a finished game is kept before it is discarded.
    #[arg(long, env = "GRACE_PERIOD_SECS", default_value_t = 30)]
    grace_period_secs: u64,

    /// Largest accepted client frame, in bytes.
    #[arg(long, env = "MAX_FRAME_BYTES", default_value_t = 16 * 1024)]
    max_frame_bytes: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            listen_addr: args.listen_addr,
            grace_period: Duration::from_secs(args.grace_period_secs),
            max_frame_bytes: args.max_frame_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("fog_chess=info".parse()?))
        .init();

    let config = ServerConfig::from(Args::parse());
    tracing::info!(?config, "fog chess starting");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    fog_chess::server::run(config, cancel).await?;
    Ok(())
}
