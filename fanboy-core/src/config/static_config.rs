//! Static configuration loaded once at startup
//!
//! Read-only after the host tool starts. Every section and field has a default,
//! so an empty or partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::{BoardConfig, DefaultBoard};
use crate::types::CurveTiming;
use crate::{FanBoyError, Result};

/// Environment variable overriding the serial device path
pub const ENV_DEVICE: &str = "FANBOY_DEVICE";

/// Environment variable overriding the per-read timeout (ms)
pub const ENV_TIMEOUT_MS: &str = "FANBOY_TIMEOUT_MS";

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path
    pub device: String,
    /// Per-read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Log every transmitted and received frame
    pub debug_uart: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyACM0".to_string(),
            read_timeout_ms: DefaultBoard::DEFAULT_TIMEOUT_MS,
            debug_uart: false,
        }
    }
}

/// Read retry budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Consecutive idle reads tolerated per read step
    pub retries: u32,
    /// Idle reads tolerated while waiting for a fan curve reply
    pub curve_retries: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            curve_retries: 200,
        }
    }
}

/// Static configuration for the FanBoy host tools.
///
/// Located at `~/.config/fanboy/config.toml` by default.
///
/// ```toml
/// [serial]
/// device = "/dev/ttyACM0"
/// read_timeout_ms = 500
/// debug_uart = false
///
/// [query]
/// retries = 2
/// curve_retries = 200
///
/// [curve]
/// settle_ms = 5000
/// samples = 3
/// sample_delay_ms = 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub serial: SerialConfig,
    pub query: QueryConfig,
    /// Must match the firmware's curve timing, the host sleeps for its estimate
    pub curve: CurveTiming,
}

impl StaticConfig {
    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FanBoyError::Config(e.to_string()))
    }

    /// Load from a file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            FanBoyError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Apply `FANBOY_DEVICE` / `FANBOY_TIMEOUT_MS` overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(device) = lookup(ENV_DEVICE) {
            self.serial.device = device;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.serial.read_timeout_ms = timeout.parse().map_err(|_| {
                FanBoyError::Config(format!("{} must be an integer, got '{}'", ENV_TIMEOUT_MS, timeout))
            })?;
        }
        Ok(())
    }

    /// Reject values the transport cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.serial.device.is_empty() {
            return Err(FanBoyError::Config("serial.device must not be empty".into()));
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(FanBoyError::Config(
                "serial.read_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.curve.samples == 0 {
            return Err(FanBoyError::Config("curve.samples must be at least 1".into()));
        }
        Ok(())
    }
}
