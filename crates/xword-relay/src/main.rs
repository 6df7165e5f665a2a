//! Crossword co-solving relay: entry point.
//!
//! Accepts WebSocket connections at `ws://<bind>:<port>/?session=<id>`,
//! groups them by session id, gives each of up to three members a slot and
//! rebroadcasts every event to the other members of the same session.
//!
//! # Usage
//!
//! ```text
//! xword-relay [OPTIONS]
//!
//! Options:
//!   --bind <IP>                 Address to bind [default: 0.0.0.0]
//!   --port <PORT>               Listener port [default: 3000]
//!   --outbound-queue <N>        Per-connection outbound queue capacity [default: 128]
//!   --max-message-bytes <N>     Largest accepted frame [default: 65536]
//!   --log-level <LEVEL>         Fallback log filter when RUST_LOG is unset [default: info]
//!   --config <PATH>             Optional TOML config file
//!   --save-config <PATH>        Write the effective config to PATH and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                  | Flag                  |
//! |---------------------------|-----------------------|
//! | `XWORD_BIND`              | `--bind`              |
//! | `XWORD_PORT`              | `--port`              |
//! | `XWORD_OUTBOUND_QUEUE`    | `--outbound-queue`    |
//! | `XWORD_MAX_MESSAGE_BYTES` | `--max-message-bytes` |
//! | `XWORD_LOG_LEVEL`         | `--log-level`         |
//! | `XWORD_CONFIG`            | `--config`            |
//!
//! Flags and variables override the config file, which overrides the
//! built-in defaults.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xword_relay::domain::{load_config, save_config, RelayConfig, RelayFile, RelaySection};
use xword_relay::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Crossword co-solving relay.
#[derive(Debug, Parser)]
#[command(
    name = "xword-relay",
    about = "WebSocket relay for up to three crossword co-solvers per session",
    version
)]
struct Cli {
    /// IP address to bind.  `0.0.0.0` accepts connections on every interface.
    #[arg(long, env = "XWORD_BIND")]
    bind: Option<String>,

    /// TCP port for the WebSocket listener.
    #[arg(long, env = "XWORD_PORT")]
    port: Option<u16>,

    /// Capacity of each connection's outbound event queue.
    #[arg(long, env = "XWORD_OUTBOUND_QUEUE")]
    outbound_queue: Option<usize>,

    /// Largest accepted WebSocket message, in bytes.
    #[arg(long, env = "XWORD_MAX_MESSAGE_BYTES")]
    max_message_bytes: Option<usize>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "XWORD_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML config file.  A missing file is treated as empty.
    #[arg(long, env = "XWORD_CONFIG")]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    /// Layers the CLI values over `file` and resolves the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is not a valid IP address.
    fn into_relay_config(self, file: RelayFile) -> anyhow::Result<RelayConfig> {
        let mut section = file.relay;
        if let Some(bind) = self.bind {
            section.bind_address = bind;
        }
        if let Some(port) = self.port {
            section.port = port;
        }
        if let Some(queue) = self.outbound_queue {
            section.outbound_queue = queue;
        }
        if let Some(max) = self.max_message_bytes {
            section.max_message_bytes = max;
        }
        if let Some(level) = self.log_level {
            section.log_level = level;
        }

        Ok(section.to_relay_config()?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => {
            load_config(path).with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => RelayFile::default(),
    };
    let save_to = cli.save_config.clone();
    let config = cli.into_relay_config(file)?;

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();

    if let Some(path) = save_to {
        save_config(&path, &RelayFile { relay: RelaySection::from(&config) })
            .with_context(|| format!("failed to save config to {}", path.display()))?;
        info!("wrote effective config to {}", path.display());
        return Ok(());
    }

    info!(
        "starting xword-relay on {} (queue {}, max message {} bytes)",
        config.bind_addr, config.outbound_queue, config.max_message_bytes
    );

    // ── Graceful shutdown on Ctrl+C ───────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("xword-relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
