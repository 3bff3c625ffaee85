//! Hardware seams of the device: fan/sensor I/O and the serial port

/// Fan and sensor access
///
/// Implemented by the simulator and by anything driving real PWM/tachometer
/// and thermistor channels.
pub trait FanHardware {
    /// Measured fan speed, `None` if no tachometer signal arrived
    fn read_rpm(&mut self, fan: usize) -> Option<u16>;

    /// Sensor temperature in centi-°C, `None` if the sensor is not connected
    fn read_temp(&mut self, sensor: usize) -> Option<i32>;

    /// Apply a duty percentage (0-100)
    fn set_duty(&mut self, fan: usize, duty: u8);

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Milliseconds since power-on
    fn millis(&self) -> u64;

    /// Hard restart of the device
    fn restart(&mut self);
}

/// Device end of the serial link
pub trait DevicePort {
    /// Next received byte, `None` if the RX timeout expired first
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue bytes for transmission
    fn write(&mut self, data: &[u8]);
}

impl DevicePort for Vec<u8> {
    /// Transmit-only sink; never receives
    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn write(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}
