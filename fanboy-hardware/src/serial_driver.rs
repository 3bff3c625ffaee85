//! Serial driver for low-level hardware communication
//!
//! Provides async byte I/O with the FanBoy over a USB CDC serial port.

use async_trait::async_trait;
use fanboy_core::{BoardConfig, FanBoyError, Result};
use std::marker::PhantomData;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, warn};

use crate::transport::SerialTransport;

/// Serial driver for hardware communication
pub struct SerialDriver<B: BoardConfig = fanboy_core::DefaultBoard> {
    port: SerialStream,
    port_path: String,
    timeout_duration: Duration,
    debug_uart: bool,
    _board: PhantomData<B>,
}

impl<B: BoardConfig> SerialDriver<B> {
    /// Open `port_path` at the board baud rate, 8N1 without flow control.
    ///
    /// `timeout_ms` bounds every read; a read that expires is reported as
    /// idle (0 bytes) rather than as an error.
    pub fn new(port_path: &str, timeout_ms: u64, debug_uart: bool) -> Result<Self> {
        let timeout_duration = Duration::from_millis(timeout_ms);
        debug!(
            "Opening {} at {} baud, read timeout {:?}",
            port_path,
            B::BAUD_RATE,
            timeout_duration
        );

        let port = tokio_serial::new(port_path, B::BAUD_RATE)
            .timeout(timeout_duration)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Cannot open {}: {}", port_path, e);
                FanBoyError::Serial(format!("open {}: {}", port_path, e))
            })?;

        Ok(Self {
            port,
            port_path: port_path.to_string(),
            timeout_duration,
            debug_uart,
            _board: PhantomData,
        })
    }

    fn trace_bytes(&self, direction: &str, bytes: &[u8]) {
        if self.debug_uart {
            debug!("{} {:02X?}", direction, bytes);
        }
    }
}

#[async_trait]
impl<B: BoardConfig> SerialTransport for SerialDriver<B> {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.trace_bytes("TX", data);

        let written = match timeout(self.timeout_duration, self.port.write(data)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                error!("Serial write failed: {}", e);
                return Err(FanBoyError::Serial(format!("write: {}", e)));
            }
            Err(_) => return Err(FanBoyError::Timeout("serial write stalled".to_string())),
        };

        match timeout(self.timeout_duration, self.port.flush()).await {
            Ok(Ok(())) => Ok(written),
            Ok(Err(e)) => Err(FanBoyError::Serial(format!("flush: {}", e))),
            Err(_) => Err(FanBoyError::Timeout("serial flush stalled".to_string())),
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = match timeout(self.timeout_duration, self.port.read(buf)).await {
            Err(_) => return Ok(0),
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                error!("Serial read failed: {}", e);
                return Err(FanBoyError::Serial(format!("read: {}", e)));
            }
        };

        if n == 0 {
            // A CDC port reads EOF once the board drops off the bus
            warn!("EOF on {}", self.port_path);
            return Err(FanBoyError::DeviceDisconnected(format!(
                "EOF on {}",
                self.port_path
            )));
        }

        self.trace_bytes("RX", &buf[..n]);
        Ok(n)
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        self.port
            .clear(tokio_serial::ClearBuffer::Input)
            .map_err(|e| FanBoyError::Serial(format!("clear input: {}", e)))
    }

    fn port_path(&self) -> Option<&str> {
        Some(&self.port_path)
    }
}

/// Whether `err` means the serial link is gone (unplugged, reset, powered
/// off) as opposed to a single failed exchange
pub fn is_disconnect_error(err: &FanBoyError) -> bool {
    const GONE: [&str; 5] = [
        "broken pipe",
        "no such device",
        "device not configured",
        "input/output error",
        "no such file or directory",
    ];
    match err {
        FanBoyError::DeviceDisconnected(_) => true,
        FanBoyError::Serial(msg) => {
            let msg = msg.to_lowercase();
            GONE.iter().any(|needle| msg.contains(needle))
        }
        FanBoyError::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}

/// Names of the serial ports present on this machine
pub fn available_port_names() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| FanBoyError::Serial(format!("enumerate ports: {}", e)))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_port_names() {
        // Depends on the host; just check the call doesn't panic
        let _ = available_port_names();
    }

    #[tokio::test]
    async fn test_open_missing_port_is_serial_error() {
        let result = SerialDriver::<fanboy_core::DefaultBoard>::new(
            "/dev/fanboy-does-not-exist",
            100,
            false,
        );
        assert!(matches!(result, Err(FanBoyError::Serial(_))));
    }

    #[test]
    fn test_disconnect_classification() {
        let gone = [
            FanBoyError::DeviceDisconnected("EOF on /dev/ttyACM0".to_string()),
            FanBoyError::Serial("read: Broken pipe (os error 32)".to_string()),
            FanBoyError::Serial("write: No such device (os error 19)".to_string()),
            FanBoyError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
        ];
        for err in &gone {
            assert!(is_disconnect_error(err), "{:?}", err);
        }

        let transient = [
            FanBoyError::Timeout("serial write stalled".to_string()),
            FanBoyError::Serial("read: framing error".to_string()),
            FanBoyError::Protocol {
                expected: 0x01,
                actual: 0x02,
            },
            FanBoyError::ConfigNotFound,
        ];
        for err in &transient {
            assert!(!is_disconnect_error(err), "{:?}", err);
        }
    }
}
