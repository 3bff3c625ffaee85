//! FanBoy Controller - High-level interface for fan control
//!
//! Implements the host side of the binary request/reply protocol. Every call
//! is one transaction: the request frame is sent in full, then the reply is
//! located by scanning for the start-of-frame byte, its echoed tag checked,
//! and the fixed-size payload read. The transport lock is held for the whole
//! transaction, which is what keeps replies paired with their requests.

use fanboy_core::protocol::{frame, Command, Request, ResultCode, Wire};
use fanboy_core::{
    validate_duty, validate_fan_id, validate_sensor_id, BoardConfig, Configuration, CurveTiming,
    FanBoyError, FanCurve, FanMode, LinearParams, PidParams, QueryConfig, Result, StaticConfig,
    Status, VersionInfo,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::serial_driver::{is_disconnect_error, SerialDriver};
use crate::transport::{receive_exact, send_all, sync_to_sof, SerialTransport};

/// FanBoy controller interface
///
/// Generic over the transport type, allowing real hardware (`SerialDriver`)
/// or mock transports for testing.
pub struct FanBoyController<T: SerialTransport + ?Sized = dyn SerialTransport> {
    /// `None` once a reset has been issued
    transport: Arc<Mutex<Option<Box<T>>>>,
    query: QueryConfig,
    curve: CurveTiming,
}

impl<B: BoardConfig> FanBoyController<SerialDriver<B>> {
    /// Create a new controller with the given serial driver
    pub fn new(driver: SerialDriver<B>) -> Self {
        Self::with_transport(Box::new(driver))
    }
}

impl FanBoyController {
    /// Open the configured serial device and apply the configured budgets
    pub fn open<B: BoardConfig>(config: &StaticConfig) -> Result<Self> {
        let driver = SerialDriver::<B>::new(
            &config.serial.device,
            config.serial.read_timeout_ms,
            config.serial.debug_uart,
        )?;
        info!("Connected to {} on {}", B::NAME, config.serial.device);

        let transport: Box<dyn SerialTransport> = Box::new(driver);
        Ok(Self::with_transport(transport)
            .with_query_config(config.query)
            .with_curve_timing(config.curve))
    }
}

impl<T: SerialTransport + ?Sized> FanBoyController<T> {
    /// Create a new controller with a boxed transport
    ///
    /// This is primarily useful for testing with mock transports.
    pub fn with_transport(transport: Box<T>) -> Self {
        Self {
            transport: Arc::new(Mutex::new(Some(transport))),
            query: QueryConfig::default(),
            curve: CurveTiming::default(),
        }
    }

    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    /// Curve timing must match the firmware; the host sleeps for its estimate
    pub fn with_curve_timing(mut self, curve: CurveTiming) -> Self {
        self.curve = curve;
        self
    }

    /// Whether the transport is still usable (false after a reset)
    pub async fn is_open(&self) -> bool {
        self.transport.lock().await.is_some()
    }

    /// Run one request/reply transaction and return the raw reply payload.
    ///
    /// Bare-result replies are checked here: a failure code becomes
    /// [`FanBoyError::DeviceError`].
    pub async fn execute(&self, command: Command, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() != command.request_len() {
            return Err(FanBoyError::InvalidInput(format!(
                "{:?} takes {} payload bytes, got {}",
                command,
                command.request_len(),
                payload.len()
            )));
        }

        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or_else(|| {
            FanBoyError::DeviceDisconnected("device was reset; re-open required".to_string())
        })?;

        let result = self.transaction(transport.as_mut(), command, payload).await;

        if command == Command::Reset {
            // The device restarts and re-enumerates; this handle is stale
            *guard = None;
        }

        if let Err(e) = &result {
            error!("{:?} transaction failed: {}", command, e);
            if is_disconnect_error(e) {
                warn!("Serial link lost, closing the controller");
                *guard = None;
            }
        }
        result
    }

    async fn transaction(&self, transport: &mut T, command: Command, payload: &[u8]) -> Result<Vec<u8>> {
        transport.clear_input_buffer()?;

        debug!("Sending {:?} with {} payload bytes", command, payload.len());
        send_all(transport, &frame(command, payload)).await?;

        if command == Command::FanCurve {
            let wait = self.curve.estimated_duration();
            info!("Waiting {:?} for the fan curve to be sampled", wait);
            tokio::time::sleep(wait).await;
            sync_to_sof(transport, self.query.curve_retries).await?;
        } else {
            sync_to_sof(transport, self.query.retries).await?;
        }

        let mut tag = [0u8; 1];
        receive_exact(transport, &mut tag, self.query.retries).await?;
        if tag[0] != command as u8 {
            return Err(FanBoyError::Protocol {
                expected: command as u8,
                actual: tag[0],
            });
        }

        let mut reply = vec![0u8; command.reply_len()];
        receive_exact(transport, &mut reply, self.query.retries).await?;
        debug!("Received {:?} reply ({} bytes)", command, reply.len());

        if command.has_result_reply() && !ResultCode::from_u8(reply[0]).is_ok() {
            warn!("Device reported failure for {:?}", command);
            return Err(FanBoyError::DeviceError(command));
        }

        Ok(reply)
    }

    async fn send_request(&self, request: Request) -> Result<()> {
        self.execute(request.command(), &request.payload()).await?;
        Ok(())
    }

    async fn fetch<R: Wire>(&self, command: Command) -> Result<R> {
        let payload = self.execute(command, &[]).await?;
        R::from_bytes(&payload)
    }

    /// Get firmware version and build timestamp
    pub async fn version(&self) -> Result<VersionInfo> {
        self.fetch(Command::Version).await
    }

    /// Get fan duty/RPM and temperatures
    pub async fn status(&self) -> Result<Status> {
        self.fetch(Command::Status).await
    }

    /// Get the active configuration
    pub async fn config(&self) -> Result<Configuration> {
        self.fetch(Command::Config).await
    }

    /// Set a fan's control mode
    pub async fn set_mode(&self, fan: u8, mode: FanMode) -> Result<()> {
        validate_fan_id(fan)?;
        self.send_request(Request::FanMode { fan, mode }).await
    }

    /// Set a fan's duty; the device switches the fan to manual mode
    pub async fn set_duty(&self, fan: u8, duty: u8) -> Result<()> {
        validate_fan_id(fan)?;
        validate_duty(duty)?;
        self.send_request(Request::FanDuty { fan, duty }).await
    }

    /// Map a fan to the sensor it follows
    pub async fn set_map(&self, fan: u8, sensor: u8) -> Result<()> {
        validate_fan_id(fan)?;
        validate_sensor_id(sensor)?;
        self.send_request(Request::FanMap { fan, sensor }).await
    }

    /// Set a fan's linear mode parameters
    pub async fn set_linear(&self, fan: u8, params: LinearParams) -> Result<()> {
        validate_fan_id(fan)?;
        params.validate()?;
        self.send_request(Request::Linear { fan, params }).await
    }

    /// Set a fan's PID mode parameters
    pub async fn set_pid(&self, fan: u8, params: PidParams) -> Result<()> {
        validate_fan_id(fan)?;
        params.validate()?;
        self.send_request(Request::Pid { fan, params }).await
    }

    /// Sample duty-vs-RPM for every fan
    ///
    /// Blocks for the whole sampling period (about a minute with default
    /// timing); the device answers nothing else meanwhile.
    pub async fn fan_curve(&self) -> Result<FanCurve> {
        self.fetch(Command::FanCurve).await
    }

    /// Persist the active configuration to EEPROM
    pub async fn save(&self) -> Result<()> {
        self.send_request(Request::Save).await
    }

    /// Restore the configuration from EEPROM
    pub async fn load(&self) -> Result<()> {
        match self.send_request(Request::Load).await {
            Err(FanBoyError::DeviceError(_)) => Err(FanBoyError::ConfigNotFound),
            other => other,
        }
    }

    /// Restart the device
    ///
    /// The reply is best-effort since the device restarts right after sending
    /// it. The controller is unusable afterwards.
    pub async fn reset(&self) -> Result<()> {
        match self.send_request(Request::Reset).await {
            Ok(()) => Ok(()),
            Err(
                e @ (FanBoyError::DeviceDisconnected(_)
                | FanBoyError::ShortWrite { .. }
                | FanBoyError::Serial(_)),
            ) => Err(e),
            Err(e) => {
                warn!("No clean reset acknowledgement: {}", e);
                Ok(())
            }
        }
    }
}
