//! Persistent configuration for wdakit.
//!
//! Stores client settings in `~/.wdakit/config.json`: the URL of the WDA
//! session to drive and the HTTP timeouts applied by
//! [`HttpTransport`](crate::transport::HttpTransport).
//!
//! # Example
//!
//! ```no_run
//! use wdakit_core::config::WdaConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = WdaConfig::load();
//!
//! if let Some(url) = &config.session_url {
//!     println!("Session: {url}");
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_DIRNAME: &str = ".wdakit";
const CONFIG_FILENAME: &str = "config.json";

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Returns the wdakit directory path (`~/.wdakit/`).
pub fn wdakit_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIRNAME)
}

/// Persistent wdakit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WdaConfig {
    /// Full URL of an existing WDA session, e.g.
    /// `http://localhost:8100/session/8BF16568-832F-4A14-A137-FD0CA566FC64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_url: Option<String>,

    /// Timeout for establishing the TCP connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Timeout for a whole request/response round trip. WDA calls that wait for
    /// quiescence can take tens of seconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for WdaConfig {
    fn default() -> Self {
        Self {
            session_url: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl WdaConfig {
    /// Load config from `~/.wdakit/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(wdakit_dir().join(CONFIG_FILENAME))
    }

    /// Load config from an explicit path, falling back to [`Default`].
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path.as_ref())
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.wdakit/config.json`, creating the directory.
    pub fn save(&self) -> std::io::Result<()> {
        let dir = wdakit_dir();
        std::fs::create_dir_all(&dir)?;
        self.save_to(dir.join(CONFIG_FILENAME))
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
