//! Host-side configuration for FanBoy tools
//!
//! [`StaticConfig`] holds the serial, retry, and curve timing settings.
//! Priority: defaults, then the TOML file, then environment, then CLI flags
//! (applied by the binary).

mod paths;
mod static_config;

pub use paths::default_config_path;
pub use static_config::{QueryConfig, SerialConfig, StaticConfig, ENV_DEVICE, ENV_TIMEOUT_MS};
