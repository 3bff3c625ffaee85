//! Error types for the FanBoy system

use thiserror::Error;

use crate::protocol::Command;

/// Core error type for FanBoy operations
#[derive(Error, Debug)]
pub enum FanBoyError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serial port errors (open failure, I/O error on read/write)
    #[error("Serial port error: {0}")]
    Serial(String),

    /// The transport accepted fewer bytes than the frame holds
    #[error("Short write: {written} of {expected} bytes sent")]
    ShortWrite { expected: usize, written: usize },

    /// Read retry budget exhausted
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Reply frame echoed a different command tag than the one requested
    #[error("Protocol error: expected reply to command 0x{expected:02X}, got 0x{actual:02X}")]
    Protocol { expected: u8, actual: u8 },

    /// A payload could not be decoded into its wire type
    #[error("Decode error: {0}")]
    Decode(String),

    /// The device answered with a failure result code
    #[error("Device reported error for {0:?}")]
    DeviceError(Command),

    /// No valid configuration record in persistent storage
    #[error("No configuration found")]
    ConfigNotFound,

    /// Persistent storage access failed
    #[error("EEPROM error: {0}")]
    Eeprom(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fan ID out of range
    #[error("Fan ID out of range: {fan_id} (must be 0-{max})", max = max_fans - 1)]
    InvalidFanId { fan_id: u8, max_fans: usize },

    /// Sensor ID out of range
    #[error("Sensor ID out of range: {sensor_id} (must be 0-{max})", max = max_sensors - 1)]
    InvalidSensorId { sensor_id: u8, max_sensors: usize },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device disconnected (USB unplugged, power cycle, reset issued)
    #[error("Device disconnected: {0}")]
    DeviceDisconnected(String),
}

/// Result type alias for FanBoy operations
pub type Result<T> = std::result::Result<T, FanBoyError>;

impl From<toml::de::Error> for FanBoyError {
    fn from(err: toml::de::Error) -> Self {
        FanBoyError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FanBoyError = io_err.into();

        match err {
            FanBoyError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let err: FanBoyError = toml_err.into();
        assert!(matches!(err, FanBoyError::Config(_)));
    }

    #[test]
    fn test_error_display() {
        let err = FanBoyError::InvalidFanId {
            fan_id: 7,
            max_fans: 4,
        };
        assert_eq!(format!("{}", err), "Fan ID out of range: 7 (must be 0-3)");

        let err = FanBoyError::InvalidSensorId {
            sensor_id: 2,
            max_sensors: 2,
        };
        assert_eq!(format!("{}", err), "Sensor ID out of range: 2 (must be 0-1)");

        let err = FanBoyError::Protocol {
            expected: 0x01,
            actual: 0x04,
        };
        assert_eq!(
            format!("{}", err),
            "Protocol error: expected reply to command 0x01, got 0x04"
        );

        let err = FanBoyError::ShortWrite {
            expected: 4,
            written: 2,
        };
        assert_eq!(format!("{}", err), "Short write: 2 of 4 bytes sent");

        let err = FanBoyError::DeviceError(Command::FanDuty);
        assert_eq!(format!("{}", err), "Device reported error for FanDuty");

        assert_eq!(
            format!("{}", FanBoyError::ConfigNotFound),
            "No configuration found"
        );
    }
}
