//! FanBoy Core Library
//!
//! Wire format, shared types, and configuration for the FanBoy fan controller.
//! This crate is used by the host driver, the device firmware model, and the CLI;
//! any layout change here is a protocol break for all of them.

pub mod board;
pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use board::{
    validate_duty, validate_fan_id, validate_sensor_id, BoardConfig, DefaultBoard,
    FanBoyLeonardo, MAX_DUTY, NUM_FAN, NUM_TEMP,
};
pub use config::{default_config_path, QueryConfig, SerialConfig, StaticConfig};
pub use error::*;
pub use protocol::{Command, Reply, Request, ResultCode, Wire, SOF};
pub use types::*;
