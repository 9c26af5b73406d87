//! Runtime configuration for the HTTP transport.
//!
//! Clients may send a base64-encoded JSON blob such as
//! `{"refreshInterval": 2000, "enableDebug": true}` in the `config` query
//! parameter of any request. A well-formed blob replaces the whole snapshot;
//! readers holding the previous `Arc` keep seeing it unchanged.

use std::sync::Arc;

use arc_swap::ArcSwap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hostmon_core::ErrorKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;
pub const MAX_REFRESH_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Milliseconds, always within [`MIN_REFRESH_INTERVAL_MS`, `MAX_REFRESH_INTERVAL_MS`].
    pub refresh_interval: u64,
    /// Log request bodies and tool calls at info level.
    pub enable_debug: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
            enable_debug: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to decode config: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to unmarshal config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ConfigurationParseFailure
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBlob {
    #[serde(default)]
    refresh_interval: Option<i64>,
    #[serde(default)]
    enable_debug: bool,
}

/// Decode and validate a `config` query value.
pub fn parse_config_blob(encoded: &str) -> Result<RuntimeConfig, ConfigError> {
    // Form decoding turns an unescaped '+' into a space.
    let encoded = encoded.trim().replace(' ', "+");
    let decoded = STANDARD.decode(encoded.as_bytes())?;
    let blob: ConfigBlob = serde_json::from_slice(&decoded)?;
    let refresh_interval = match blob.refresh_interval {
        Some(ms) => ms.clamp(MIN_REFRESH_INTERVAL_MS as i64, MAX_REFRESH_INTERVAL_MS as i64) as u64,
        None => DEFAULT_REFRESH_INTERVAL_MS,
    };
    Ok(RuntimeConfig {
        refresh_interval,
        enable_debug: blob.enable_debug,
    })
}

/// Lock-free holder of the current [`RuntimeConfig`].
pub struct ConfigStore {
    current: ArcSwap<RuntimeConfig>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl ConfigStore {
    pub fn new(initial: RuntimeConfig) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(initial)),
        }
    }

    pub fn load(&self) -> Arc<RuntimeConfig> {
        self.current.load_full()
    }

    pub fn store(&self, config: RuntimeConfig) {
        self.current.store(Arc::new(config));
    }

    /// Replace the snapshot from a query blob. On failure the previous
    /// snapshot stays and the error is logged only if debug was already on.
    pub fn apply_blob(&self, encoded: &str) -> Result<(), ConfigError> {
        match parse_config_blob(encoded) {
            Ok(config) => {
                self.store(config);
                if config.enable_debug {
                    log::info!("configuration updated: {config:?}");
                }
                Ok(())
            }
            Err(e) => {
                if self.load().enable_debug {
                    log::warn!("{}: {e}", e.kind());
                }
                Err(e)
            }
        }
    }
}
