//! Core types and data structures for FanBoy
//!
//! Temperatures are fixed-point integers scaled by 100 in the configured
//! [`TempUnit`] (e.g. `2350` is 23.50°). The same representation is used on the
//! wire, in EEPROM, and in memory.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::board::{MAX_DUTY, NUM_FAN, NUM_TEMP};
use crate::{FanBoyError, Result};

/// Sentinel for a disconnected fan (RPM) or sensor (temperature)
pub const NCONN: u16 = 0xFFFF;

/// Duty step between fan curve sample points (%)
pub const CURVE_STEP: u8 = 10;

/// Number of sample points in a fan curve (100% down to 0%)
pub const CURVE_POINTS: usize = 100 / CURVE_STEP as usize + 1;

/// Fan control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FanMode {
    /// Fixed duty
    #[default]
    Manual = 0x00,
    /// Linear curve between two (temperature, duty) points
    Linear = 0x01,
    /// Target temperature, PID-controlled duty
    Pid = 0x02,
}

impl TryFrom<u8> for FanMode {
    type Error = FanBoyError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(FanMode::Manual),
            0x01 => Ok(FanMode::Linear),
            0x02 => Ok(FanMode::Pid),
            other => Err(FanBoyError::Decode(format!(
                "Unknown fan mode: 0x{:02X}",
                other
            ))),
        }
    }
}

impl FromStr for FanMode {
    type Err = FanBoyError;

    /// Parse a fan mode name
    ///
    /// ```
    /// use fanboy_core::FanMode;
    ///
    /// assert_eq!("manual".parse::<FanMode>().unwrap(), FanMode::Manual);
    /// assert_eq!("target".parse::<FanMode>().unwrap(), FanMode::Pid);
    /// assert!("turbo".parse::<FanMode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(FanMode::Manual),
            "linear" => Ok(FanMode::Linear),
            "pid" | "target" => Ok(FanMode::Pid),
            _ => Err(FanBoyError::InvalidInput(format!(
                "Unknown fan mode: '{}'. Valid options: manual, linear, pid",
                s
            ))),
        }
    }
}

impl std::fmt::Display for FanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanMode::Manual => write!(f, "manual"),
            FanMode::Linear => write!(f, "linear"),
            FanMode::Pid => write!(f, "pid"),
        }
    }
}

/// Temperature unit used for reporting and for control parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TempUnit {
    #[default]
    Celsius = 0x00,
    Fahrenheit = 0x01,
}

impl TempUnit {
    /// Unit letter for display
    pub fn symbol(&self) -> char {
        match self {
            TempUnit::Celsius => 'C',
            TempUnit::Fahrenheit => 'F',
        }
    }

    /// Convert a centi-degree Celsius reading into this unit (still ×100)
    pub fn from_centi_celsius(&self, centi_c: i32) -> i32 {
        match self {
            TempUnit::Celsius => centi_c,
            TempUnit::Fahrenheit => centi_c * 9 / 5 + 3200,
        }
    }
}

impl TryFrom<u8> for TempUnit {
    type Error = FanBoyError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(TempUnit::Celsius),
            0x01 => Ok(TempUnit::Fahrenheit),
            other => Err(FanBoyError::Decode(format!(
                "Unknown temperature unit: 0x{:02X}",
                other
            ))),
        }
    }
}

/// Linear control parameters: duty follows a straight line between
/// (`min_temp`, `min_duty`) and (`max_temp`, `max_duty`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearParams {
    /// Lower temperature breakpoint (×100)
    pub min_temp: u16,
    /// Duty applied at or below `min_temp` (%)
    pub min_duty: u8,
    /// Upper temperature breakpoint (×100)
    pub max_temp: u16,
    /// Duty applied at or above `max_temp` (%)
    pub max_duty: u8,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            min_temp: 2000,
            min_duty: 33,
            max_temp: 4000,
            max_duty: 80,
        }
    }
}

impl LinearParams {
    /// Check duty range and breakpoint ordering
    pub fn validate(&self) -> Result<()> {
        if self.min_duty > MAX_DUTY || self.max_duty > MAX_DUTY {
            return Err(FanBoyError::InvalidInput(format!(
                "Linear duties must be 0-{}, got {} and {}",
                MAX_DUTY, self.min_duty, self.max_duty
            )));
        }
        if self.min_temp >= self.max_temp {
            return Err(FanBoyError::InvalidInput(format!(
                "Low temperature ({}) must be below high temperature ({})",
                self.min_temp, self.max_temp
            )));
        }
        if self.min_duty > self.max_duty {
            return Err(FanBoyError::InvalidInput(format!(
                "Low duty ({}) must not exceed high duty ({})",
                self.min_duty, self.max_duty
            )));
        }
        Ok(())
    }
}

/// PID (target temperature) control parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidParams {
    /// Target temperature (×100)
    pub target_temp: u16,
    /// Lower duty clamp (%)
    pub min_duty: u8,
    /// Upper duty clamp (%)
    pub max_duty: u8,
}

impl Default for PidParams {
    fn default() -> Self {
        Self {
            target_temp: 3500,
            min_duty: 20,
            max_duty: 100,
        }
    }
}

impl PidParams {
    /// Check the duty clamp
    pub fn validate(&self) -> Result<()> {
        if self.max_duty > MAX_DUTY {
            return Err(FanBoyError::InvalidInput(format!(
                "PID max duty must be 0-{}, got {}",
                MAX_DUTY, self.max_duty
            )));
        }
        if self.min_duty > self.max_duty {
            return Err(FanBoyError::InvalidInput(format!(
                "PID min duty ({}) must not exceed max duty ({})",
                self.min_duty, self.max_duty
            )));
        }
        Ok(())
    }
}

/// Per-fan configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanConfig {
    /// Control mode
    pub mode: FanMode,
    /// Fixed duty for manual mode (%)
    pub duty: u8,
    /// Sensor this fan follows in linear/PID mode
    pub sensor: u8,
    /// Linear mode parameters
    pub linear: LinearParams,
    /// PID mode parameters
    pub pid: PidParams,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            mode: FanMode::Manual,
            duty: 50,
            sensor: 0,
            linear: LinearParams::default(),
            pid: PidParams::default(),
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Unit for reported temperatures and control parameters
    pub temp_unit: TempUnit,
    /// One entry per fan channel
    pub fans: [FanConfig; NUM_FAN],
}

/// Live state of one fan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanStatus {
    /// Currently applied duty (%)
    pub duty: u8,
    /// Measured speed, or [`NCONN`]
    pub rpm: u16,
}

impl FanStatus {
    /// Whether the fan delivered a tachometer signal
    pub fn is_connected(&self) -> bool {
        self.rpm != NCONN
    }
}

impl Default for FanStatus {
    fn default() -> Self {
        Self { duty: 0, rpm: NCONN }
    }
}

/// Snapshot of all fans and sensors, recomputed every measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub fans: [FanStatus; NUM_FAN],
    /// Temperatures (×100, configured unit), or [`NCONN`]
    pub temps: [u16; NUM_TEMP],
}

impl Default for Status {
    fn default() -> Self {
        Self {
            fans: [FanStatus::default(); NUM_FAN],
            temps: [NCONN; NUM_TEMP],
        }
    }
}

impl Status {
    /// Temperature of a sensor, `None` if disconnected or out of range
    pub fn temp(&self, sensor: usize) -> Option<u16> {
        self.temps.get(sensor).copied().filter(|t| *t != NCONN)
    }
}

/// One duty step of a fan curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Applied duty (%)
    pub duty: u8,
    /// Averaged RPM per fan at that duty
    pub rpm: [u16; NUM_FAN],
}

/// Duty-vs-RPM samples, ordered from 100% down to 0%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanCurve {
    pub points: [CurvePoint; CURVE_POINTS],
}

impl Default for FanCurve {
    fn default() -> Self {
        let mut points = [CurvePoint::default(); CURVE_POINTS];
        for (i, point) in points.iter_mut().enumerate() {
            point.duty = 100 - (i as u8) * CURVE_STEP;
        }
        Self { points }
    }
}

/// Firmware version and build timestamp
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub build: String,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build: build.into(),
        }
    }
}

/// Fan curve sampling timing, shared by the device (which sleeps through it)
/// and the host (which estimates how long to wait before polling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveTiming {
    /// Delay after each duty change before sampling (ms)
    pub settle_ms: u32,
    /// Number of RPM samples averaged per duty step
    pub samples: u8,
    /// Delay between consecutive samples (ms)
    pub sample_delay_ms: u32,
}

impl Default for CurveTiming {
    fn default() -> Self {
        Self {
            settle_ms: 5000,
            samples: 3,
            sample_delay_ms: 50,
        }
    }
}

impl CurveTiming {
    /// Minimum time the device needs to sample a whole curve
    pub fn estimated_duration(&self) -> Duration {
        let per_step = self.settle_ms as u64
            + self.samples.saturating_sub(1) as u64 * self.sample_delay_ms as u64;
        Duration::from_millis(CURVE_POINTS as u64 * per_step)
    }
}
