//! Relay configuration.
//!
//! [`RelayConfig`] is the resolved runtime configuration handed to the
//! server.  It is assembled in `main.rs` from three layers, highest priority
//! first:
//!
//! 1. command-line flags (`--port 3000`),
//! 2. `XWORD_*` environment variables (handled by `clap`'s `env` feature),
//! 3. an optional TOML file (`--config relay.toml`),
//!
//! with the built-in defaults filling whatever is left.
//!
//! # File format
//!
//! ```toml
//! [relay]
//! bind_address = "0.0.0.0"
//! port = 3000
//! outbound_queue = 128
//! max_message_bytes = 65536
//! log_level = "info"
//! ```
//!
//! Every key is optional; missing keys take their default through
//! `#[serde(default = "...")]`, so an empty file is valid.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `bind_address` is not an IP address.
    #[error("invalid bind address '{0}'")]
    InvalidAddress(String),
}

// ── Resolved runtime config ───────────────────────────────────────────────────

/// All runtime settings of the relay.
///
/// # Example
///
/// ```rust
/// use xword_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: SocketAddr,
    /// Capacity of each connection's outbound event queue.
    pub outbound_queue: usize,
    /// Largest accepted WebSocket message, in bytes.
    pub max_message_bytes: usize,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], default_port())),
            outbound_queue: default_outbound_queue(),
            max_message_bytes: default_max_message_bytes(),
            log_level: default_log_level(),
        }
    }
}

// ── File schema ───────────────────────────────────────────────────────────────

/// Top-level layout of the relay config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayFile {
    #[serde(default)]
    pub relay: RelaySection,
}

/// The `[relay]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelaySection {
    /// IP address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_outbound_queue() -> usize {
    128
}
fn default_max_message_bytes() -> usize {
    64 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            outbound_queue: default_outbound_queue(),
            max_message_bytes: default_max_message_bytes(),
            log_level: default_log_level(),
        }
    }
}

impl RelaySection {
    /// Resolves the section into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if `bind_address` is not an IP
    /// address.
    pub fn to_relay_config(&self) -> Result<RelayConfig, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.bind_address.clone()))?;
        Ok(RelayConfig {
            bind_addr: SocketAddr::new(ip, self.port),
            outbound_queue: self.outbound_queue,
            max_message_bytes: self.max_message_bytes,
            log_level: self.log_level.clone(),
        })
    }
}

impl From<&RelayConfig> for RelaySection {
    fn from(cfg: &RelayConfig) -> Self {
        Self {
            bind_address: cfg.bind_addr.ip().to_string(),
            port: cfg.bind_addr.port(),
            outbound_queue: cfg.outbound_queue,
            max_message_bytes: cfg.max_message_bytes,
            log_level: cfg.log_level.clone(),
        }
    }
}

// ── Load / save ───────────────────────────────────────────────────────────────

/// Loads the config file at `path`, returning [`RelayFile::default()`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<RelayFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RelayFile::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path` as pretty TOML, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &RelayFile) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
