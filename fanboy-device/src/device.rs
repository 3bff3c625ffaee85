//! Device state and command actions
//!
//! The device runs single-threaded: the dispatcher and the periodic control
//! cycle are called from one loop, so every action sees a consistent
//! configuration. Set-operations validate, build the new configuration as a
//! copy and swap it in whole.

use fanboy_core::protocol::{Reply, Request, ResultCode};
use fanboy_core::{
    validate_duty, validate_fan_id, validate_sensor_id, Configuration, CurveTiming, FanBoyError,
    FanCurve, FanMode, LinearParams, PidParams, Result, Status, VersionInfo, NCONN, NUM_FAN,
    NUM_TEMP,
};
use tracing::{debug, info, warn};

use crate::eeprom::Eeprom;
use crate::hardware::FanHardware;
use crate::policy;
use crate::store::ConfigStore;

/// Measurement and control interval (ms)
pub const UPDATE_INTERVAL_MS: u64 = 1000;

/// Duty applied while probing for fans (%)
pub const SCAN_DUTY: u8 = 50;

/// Spin-up time before probing (ms)
pub const SCAN_SETTLE_MS: u32 = 2000;

/// RPM reads per fan before it is considered absent
pub const SCAN_TRIES: usize = 3;

/// Version reported by the firmware
pub fn firmware_version() -> VersionInfo {
    VersionInfo::new(
        env!("CARGO_PKG_VERSION"),
        option_env!("FANBOY_BUILD").unwrap_or("unknown"),
    )
}

pub struct Device<H: FanHardware, E: Eeprom> {
    hw: H,
    store: ConfigStore<E>,
    config: Configuration,
    status: Status,
    connected: [bool; NUM_FAN],
    version: VersionInfo,
    curve_timing: CurveTiming,
    last_update_ms: u64,
}

impl<H: FanHardware, E: Eeprom> Device<H, E> {
    /// Power-on sequence: defaults, stored configuration, fan scan, first
    /// control cycle
    pub fn boot(hw: H, eeprom: E) -> Result<Self> {
        let store = ConfigStore::new(eeprom)?;

        let config = match store.load() {
            Ok(config) => {
                info!("Loaded stored configuration");
                config
            }
            Err(FanBoyError::ConfigNotFound) => {
                info!("No stored configuration, using defaults");
                Configuration::default()
            }
            Err(e) => {
                warn!("Failed to read stored configuration: {}", e);
                Configuration::default()
            }
        };

        let mut device = Self {
            hw,
            store,
            config,
            status: Status::default(),
            connected: [false; NUM_FAN],
            version: firmware_version(),
            curve_timing: CurveTiming::default(),
            last_update_ms: 0,
        };
        device.scan_fans();
        device.control_cycle();
        Ok(device)
    }

    pub fn with_curve_timing(mut self, timing: CurveTiming) -> Self {
        self.curve_timing = timing;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    /// Whether the fan answered the boot scan
    pub fn is_connected(&self, fan: usize) -> bool {
        self.connected.get(fan).copied().unwrap_or(false)
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn store(&self) -> &ConfigStore<E> {
        &self.store
    }

    /// Power off: hand back the hardware and the EEPROM
    pub fn into_parts(self) -> (H, E) {
        (self.hw, self.store.into_inner())
    }

    fn scan_fans(&mut self) {
        for fan in 0..NUM_FAN {
            self.hw.set_duty(fan, SCAN_DUTY);
        }
        self.hw.delay_ms(SCAN_SETTLE_MS);

        for fan in 0..NUM_FAN {
            let mut found = false;
            for _ in 0..SCAN_TRIES {
                if self.hw.read_rpm(fan).is_some() {
                    found = true;
                    break;
                }
            }
            self.connected[fan] = found;
            debug!("Fan {} {}", fan, if found { "detected" } else { "not connected" });
        }
    }

    fn measure(&mut self) {
        for fan in 0..NUM_FAN {
            self.status.fans[fan].rpm = if self.connected[fan] {
                // A stopped fan delivers no pulses
                self.hw.read_rpm(fan).unwrap_or(0)
            } else {
                NCONN
            };
        }

        for sensor in 0..NUM_TEMP {
            self.status.temps[sensor] = match self.hw.read_temp(sensor) {
                Some(centi_c) => {
                    let value = self.config.temp_unit.from_centi_celsius(centi_c);
                    value.clamp(0, NCONN as i32 - 1) as u16
                }
                None => NCONN,
            };
        }
    }

    fn apply_fan(&mut self, fan: usize) {
        let fan_config = &self.config.fans[fan];
        let temp = self.status.temp(fan_config.sensor as usize);
        let duty = policy::fan_duty(fan_config, temp);
        self.hw.set_duty(fan, duty);
        self.status.fans[fan].duty = duty;
    }

    fn apply_all(&mut self) {
        for fan in 0..NUM_FAN {
            self.apply_fan(fan);
        }
    }

    /// Measure every fan and sensor, then apply the policy to every fan
    pub fn control_cycle(&mut self) {
        self.measure();
        self.apply_all();
        self.last_update_ms = self.hw.millis();
    }

    /// Run the control cycle if the update interval has elapsed
    pub fn update_if_due(&mut self) -> bool {
        if self.hw.millis().saturating_sub(self.last_update_ms) < UPDATE_INTERVAL_MS {
            return false;
        }
        self.control_cycle();
        true
    }

    fn commit(&mut self, next: Configuration, fan: u8) -> Result<()> {
        self.config = next;
        self.apply_fan(fan as usize);
        Ok(())
    }

    pub fn set_mode(&mut self, fan: u8, mode: FanMode) -> Result<()> {
        validate_fan_id(fan)?;
        let mut next = self.config;
        next.fans[fan as usize].mode = mode;
        self.commit(next, fan)
    }

    /// Fixed duty; switches the fan to manual mode
    pub fn set_duty(&mut self, fan: u8, duty: u8) -> Result<()> {
        validate_fan_id(fan)?;
        validate_duty(duty)?;
        let mut next = self.config;
        next.fans[fan as usize].mode = FanMode::Manual;
        next.fans[fan as usize].duty = duty;
        self.commit(next, fan)
    }

    pub fn set_map(&mut self, fan: u8, sensor: u8) -> Result<()> {
        validate_fan_id(fan)?;
        validate_sensor_id(sensor)?;
        let mut next = self.config;
        next.fans[fan as usize].sensor = sensor;
        self.commit(next, fan)
    }

    pub fn set_linear(&mut self, fan: u8, params: LinearParams) -> Result<()> {
        validate_fan_id(fan)?;
        params.validate()?;
        let mut next = self.config;
        next.fans[fan as usize].linear = params;
        self.commit(next, fan)
    }

    pub fn set_pid(&mut self, fan: u8, params: PidParams) -> Result<()> {
        validate_fan_id(fan)?;
        params.validate()?;
        let mut next = self.config;
        next.fans[fan as usize].pid = params;
        self.commit(next, fan)
    }

    pub fn save(&mut self) -> Result<()> {
        self.store.save(&self.config)?;
        Ok(())
    }

    /// Replace the active configuration with the stored one
    pub fn load(&mut self) -> Result<()> {
        self.config = self.store.load()?;
        self.control_cycle();
        Ok(())
    }

    /// Sample duty-vs-RPM from 100 % down to 0 %, then restore the policy
    ///
    /// Blocks for the whole sampling period.
    pub fn fan_curve(&mut self) -> FanCurve {
        let timing = self.curve_timing;
        let samples = timing.samples.max(1) as u32;
        let mut curve = FanCurve::default();

        for point in curve.points.iter_mut() {
            for fan in 0..NUM_FAN {
                if self.connected[fan] {
                    self.hw.set_duty(fan, point.duty);
                }
            }
            self.hw.delay_ms(timing.settle_ms);

            let mut sums = [0u32; NUM_FAN];
            for sample in 0..samples {
                if sample > 0 {
                    self.hw.delay_ms(timing.sample_delay_ms);
                }
                for (fan, sum) in sums.iter_mut().enumerate() {
                    if self.connected[fan] {
                        *sum += self.hw.read_rpm(fan).unwrap_or(0) as u32;
                    }
                }
            }

            for (fan, rpm) in point.rpm.iter_mut().enumerate() {
                *rpm = if self.connected[fan] {
                    (sums[fan] / samples) as u16
                } else {
                    NCONN
                };
            }
            debug!("Curve point {}%: {:?}", point.duty, point.rpm);
        }

        self.control_cycle();
        curve
    }

    /// Request a hard restart
    pub fn restart(&mut self) {
        info!("Restarting");
        self.hw.restart();
    }

    /// Execute a decoded request and build its reply
    ///
    /// Reset only acknowledges here; the caller restarts after the reply is
    /// on the wire.
    pub fn handle(&mut self, request: Request) -> Reply {
        let outcome = match request {
            Request::Version => return Reply::Version(self.version.clone()),
            Request::Status => return Reply::Status(self.status),
            Request::Config => return Reply::Config(self.config),
            Request::FanCurve => return Reply::Curve(self.fan_curve()),
            Request::FanMode { fan, mode } => self.set_mode(fan, mode),
            Request::FanDuty { fan, duty } => self.set_duty(fan, duty),
            Request::FanMap { fan, sensor } => self.set_map(fan, sensor),
            Request::Linear { fan, params } => self.set_linear(fan, params),
            Request::Pid { fan, params } => self.set_pid(fan, params),
            Request::Save => self.save(),
            Request::Load => self.load(),
            Request::Reset => Ok(()),
        };

        if let Err(e) = &outcome {
            warn!("{:?} rejected: {}", request.command(), e);
        }
        Reply::Result(ResultCode::from(outcome.is_ok()))
    }
}
