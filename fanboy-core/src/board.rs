//! Board definitions
//!
//! The wire format carries fixed-size arrays for fans and sensors, so the board
//! geometry is a compile-time property shared by host and device. Each board
//! variant implements [`BoardConfig`]; [`DefaultBoard`] is the one the wire
//! layout is sized for.

/// Hardware board configuration trait
///
/// # Example
///
/// ```
/// use fanboy_core::board::{BoardConfig, FanBoyLeonardo};
///
/// const FAN_COUNT: usize = FanBoyLeonardo::FAN_COUNT;
/// const NAME: &str = FanBoyLeonardo::NAME;
/// ```
pub trait BoardConfig: Send + Sync + 'static {
    /// Human-readable board name
    const NAME: &'static str;

    /// Number of fan channels
    const FAN_COUNT: usize;

    /// Number of temperature sensor inputs
    const SENSOR_COUNT: usize;

    /// Serial communication baud rate
    const BAUD_RATE: u32;

    /// Per-read serial timeout in milliseconds
    const DEFAULT_TIMEOUT_MS: u64;

    /// Maximum duty percentage
    const MAX_DUTY: u8;

    /// Size of the on-chip EEPROM in bytes
    const EEPROM_LEN: usize;
}

/// FanBoy on an ATmega32U4 (Arduino Leonardo form factor)
///
/// - 4 PWM fan channels with tachometer inputs
/// - 2 thermistor inputs
/// - 57600 baud USB CDC serial
/// - 1 kB EEPROM
pub struct FanBoyLeonardo;

impl BoardConfig for FanBoyLeonardo {
    const NAME: &'static str = "FanBoy Leonardo";
    const FAN_COUNT: usize = 4;
    const SENSOR_COUNT: usize = 2;
    const BAUD_RATE: u32 = 57600;
    const DEFAULT_TIMEOUT_MS: u64 = 500;
    const MAX_DUTY: u8 = 100;
    const EEPROM_LEN: usize = 1024;
}

/// Board the wire layout is sized for
pub type DefaultBoard = FanBoyLeonardo;

/// Number of fans carried in every status/config/curve payload
pub const NUM_FAN: usize = DefaultBoard::FAN_COUNT;

/// Number of temperature sensors carried in every status payload
pub const NUM_TEMP: usize = DefaultBoard::SENSOR_COUNT;

/// Maximum duty percentage
pub const MAX_DUTY: u8 = DefaultBoard::MAX_DUTY;

/// Validate a fan ID against the board's fan count
pub fn validate_fan_id(fan_id: u8) -> crate::Result<()> {
    if fan_id as usize >= NUM_FAN {
        return Err(crate::FanBoyError::InvalidFanId {
            fan_id,
            max_fans: NUM_FAN,
        });
    }
    Ok(())
}

/// Validate a sensor ID against the board's sensor count
pub fn validate_sensor_id(sensor_id: u8) -> crate::Result<()> {
    if sensor_id as usize >= NUM_TEMP {
        return Err(crate::FanBoyError::InvalidSensorId {
            sensor_id,
            max_sensors: NUM_TEMP,
        });
    }
    Ok(())
}

/// Validate a duty percentage
pub fn validate_duty(duty: u8) -> crate::Result<()> {
    if duty > MAX_DUTY {
        return Err(crate::FanBoyError::InvalidInput(format!(
            "Duty must be 0-{}, got {}",
            MAX_DUTY, duty
        )));
    }
    Ok(())
}
