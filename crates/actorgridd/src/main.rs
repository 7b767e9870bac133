//! actorgridd — the ActorGrid daemon.
//!
//! # Usage
//!
//! ```text
//! actorgridd run --config actorgrid.toml --status-interval-secs 30
//! actorgridd check-config --config actorgrid.toml
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use actorgridd::{DaemonConfig, Node};

const DEFAULT_FILTER: &str = "info,actorgridd=debug,actorgrid=debug";

#[derive(Parser)]
#[command(name = "actorgridd", about = "ActorGrid daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler and peer monitors until Ctrl-C.
    Run {
        /// Path to the TOML configuration.
        #[arg(long, default_value = "actorgrid.toml")]
        config: PathBuf,

        /// Log a status line per pool at this interval. `0` disables it.
        #[arg(long, default_value = "0")]
        status_interval_secs: u64,
    },
    /// Parse and validate a configuration, then print it with defaults filled in.
    CheckConfig {
        #[arg(long, default_value = "actorgrid.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Run {
            config,
            status_interval_secs,
        } => run(config, status_interval_secs).await,
        Command::CheckConfig { config } => {
            let config = DaemonConfig::from_file(&config)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(path: PathBuf, status_interval_secs: u64) -> anyhow::Result<()> {
    info!(config = ?path, "ActorGrid daemon starting");
    let config = DaemonConfig::from_file(&path)?;
    info!(
        peers = config.cluster.peers.len(),
        pools = config.pools.len(),
        "configuration loaded"
    );

    let node = Node::build(&config)?;

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "failed to install Ctrl-C handler");
                // Keep the sender alive; a dropped sender reads as shutdown.
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    let status_interval =
        (status_interval_secs > 0).then(|| Duration::from_secs(status_interval_secs));
    node.run(shutdown_rx, status_interval).await?;

    info!("ActorGrid daemon stopped");
    Ok(())
}
