//! In-memory hardware model
//!
//! Fans spin proportionally to their duty up to a nominal maximum and stop
//! (no tachometer pulses) at 0 %. Time only advances through `delay_ms` or
//! [`SimulatedHardware::advance`].

use fanboy_core::{NUM_FAN, NUM_TEMP};

use crate::hardware::FanHardware;

#[derive(Debug, Clone, Default)]
pub struct SimulatedHardware {
    duties: [u8; NUM_FAN],
    max_rpm: [Option<u16>; NUM_FAN],
    temps: [Option<i32>; NUM_TEMP],
    clock_ms: u64,
    restarts: u32,
}

impl SimulatedHardware {
    /// No fans and no sensors attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fan with the given full-speed RPM
    pub fn with_fan(mut self, fan: usize, max_rpm: u16) -> Self {
        self.set_fan(fan, Some(max_rpm));
        self
    }

    /// Attach a sensor reading `centi_celsius`
    pub fn with_temp(mut self, sensor: usize, centi_celsius: i32) -> Self {
        self.set_temp(sensor, Some(centi_celsius));
        self
    }

    pub fn set_fan(&mut self, fan: usize, max_rpm: Option<u16>) {
        if let Some(slot) = self.max_rpm.get_mut(fan) {
            *slot = max_rpm;
        }
    }

    pub fn set_temp(&mut self, sensor: usize, centi_celsius: Option<i32>) {
        if let Some(slot) = self.temps.get_mut(sensor) {
            *slot = centi_celsius;
        }
    }

    /// Duty last applied to a fan
    pub fn duty(&self, fan: usize) -> u8 {
        self.duties.get(fan).copied().unwrap_or(0)
    }

    pub fn advance(&mut self, ms: u64) {
        self.clock_ms += ms;
    }

    pub fn restart_count(&self) -> u32 {
        self.restarts
    }
}

impl FanHardware for SimulatedHardware {
    fn read_rpm(&mut self, fan: usize) -> Option<u16> {
        let max = self.max_rpm.get(fan).copied().flatten()?;
        let duty = self.duty(fan) as u32;
        if duty == 0 {
            return None;
        }
        Some((max as u32 * duty / 100) as u16)
    }

    fn read_temp(&mut self, sensor: usize) -> Option<i32> {
        self.temps.get(sensor).copied().flatten()
    }

    fn set_duty(&mut self, fan: usize, duty: u8) {
        if let Some(slot) = self.duties.get_mut(fan) {
            *slot = duty.min(100);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock_ms += ms as u64;
    }

    fn millis(&self) -> u64 {
        self.clock_ms
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_follows_duty() {
        let mut hw = SimulatedHardware::new().with_fan(0, 2000);
        hw.set_duty(0, 50);
        assert_eq!(hw.read_rpm(0), Some(1000));
        hw.set_duty(0, 0);
        assert_eq!(hw.read_rpm(0), None);
    }

    #[test]
    fn test_missing_fan_and_sensor() {
        let mut hw = SimulatedHardware::new();
        hw.set_duty(1, 100);
        assert_eq!(hw.read_rpm(1), None);
        assert_eq!(hw.read_temp(0), None);
        assert_eq!(hw.read_rpm(9), None);
    }

    #[test]
    fn test_clock() {
        let mut hw = SimulatedHardware::new();
        hw.delay_ms(250);
        hw.advance(750);
        assert_eq!(hw.millis(), 1000);
    }
}
