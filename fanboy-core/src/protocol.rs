//! FanBoy serial wire format
//!
//! Every message is a frame:
//!
//! ```text
//! +------+---------+---------------------------+
//! | SOF  | command | payload (fixed per command)|
//! +------+---------+---------------------------+
//! ```
//!
//! There is no length field and no terminator. The payload size is implied by
//! the command tag and by the direction (request or reply), see
//! [`Command::request_len`] and [`Command::reply_len`]. A reply always echoes
//! the tag of the request it answers; that is the only correlation mechanism.
//!
//! Multi-byte integers are little-endian and structures are packed.

use bytes::{Buf, BufMut};

use crate::board::{NUM_FAN, NUM_TEMP};
use crate::types::{
    Configuration, CurvePoint, FanConfig, FanCurve, FanMode, FanStatus, LinearParams, PidParams,
    Status, TempUnit, VersionInfo, CURVE_POINTS,
};
use crate::{FanBoyError, Result};

/// Start-of-frame delimiter
pub const SOF: u8 = 0x42;

/// Frame header length (SOF + command)
pub const HEADER_LEN: usize = 2;

/// Length of the fixed version/build strings, including the NUL terminator
pub const STRL: usize = 32;

/// Tag reserved as "invalid command"; never accepted by the device
pub const CMD_INVALID: u8 = 0xFE;

/// Command tags
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Get firmware version and build timestamp (0x00)
    Version = 0x00,
    /// Get current fan duty/RPM and temperatures (0x01)
    Status = 0x01,
    /// Get configuration (0x02)
    Config = 0x02,
    /// Set fan mode (0x03)
    FanMode = 0x03,
    /// Set fan duty, implies manual mode (0x04)
    FanDuty = 0x04,
    /// Set fan to sensor mapping (0x05)
    FanMap = 0x05,
    /// Generate fan curves (0x06)
    FanCurve = 0x06,
    /// Set linear control parameters (0x07)
    Linear = 0x07,
    /// Save configuration to EEPROM (0x08)
    Save = 0x08,
    /// Load configuration from EEPROM (0x09)
    Load = 0x09,
    /// Set PID control parameters (0x0A)
    Pid = 0x0A,
    /// Reset device (0xFF)
    Reset = 0xFF,
}

impl Command {
    /// Every command, in tag order
    pub const ALL: [Command; 12] = [
        Command::Version,
        Command::Status,
        Command::Config,
        Command::FanMode,
        Command::FanDuty,
        Command::FanMap,
        Command::FanCurve,
        Command::Linear,
        Command::Save,
        Command::Load,
        Command::Pid,
        Command::Reset,
    ];

    /// Look up a command by its tag
    pub fn from_u8(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| *cmd as u8 == tag)
    }

    /// Size of the request payload following the header
    pub fn request_len(self) -> usize {
        match self {
            Command::FanMode | Command::FanDuty | Command::FanMap => 2,
            Command::Linear => 1 + LinearParams::SIZE,
            Command::Pid => 1 + PidParams::SIZE,
            Command::Version
            | Command::Status
            | Command::Config
            | Command::FanCurve
            | Command::Save
            | Command::Load
            | Command::Reset => 0,
        }
    }

    /// Size of the reply payload following the header
    pub fn reply_len(self) -> usize {
        match self {
            Command::Version => VersionInfo::SIZE,
            Command::Status => Status::SIZE,
            Command::Config => Configuration::SIZE,
            Command::FanCurve => FanCurve::SIZE,
            _ => ResultCode::SIZE,
        }
    }

    /// Whether the reply is a bare success/failure code
    pub fn has_result_reply(self) -> bool {
        !matches!(
            self,
            Command::Version | Command::Status | Command::Config | Command::FanCurve
        )
    }
}

impl TryFrom<u8> for Command {
    type Error = FanBoyError;

    fn try_from(tag: u8) -> Result<Self> {
        Self::from_u8(tag)
            .ok_or_else(|| FanBoyError::Decode(format!("Unknown command tag: 0x{:02X}", tag)))
    }
}

/// Generic success/failure reply
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok = 0x00,
    Err = 0xFF,
}

impl ResultCode {
    /// Anything other than 0x00 counts as failure
    pub fn from_u8(value: u8) -> Self {
        if value == ResultCode::Ok as u8 {
            ResultCode::Ok
        } else {
            ResultCode::Err
        }
    }

    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }
}

impl From<bool> for ResultCode {
    fn from(success: bool) -> Self {
        if success {
            ResultCode::Ok
        } else {
            ResultCode::Err
        }
    }
}

/// Fixed-layout binary encoding shared by host and device
pub trait Wire: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Append the packed representation to `buf`
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Consume exactly `SIZE` bytes from `buf`
    fn decode<B: Buf>(buf: &mut B) -> Result<Self>;

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        self.encode(&mut buf);
        buf
    }

    /// Decode from a buffer that must hold exactly `SIZE` bytes
    fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(FanBoyError::Decode(format!(
                "Expected {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        Self::decode(&mut bytes)
    }
}

fn ensure_remaining<B: Buf>(buf: &B, needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(FanBoyError::Decode(format!(
            "{} needs {} bytes, {} available",
            what,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

impl Wire for ResultCode {
    const SIZE: usize = 1;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(*self as u8);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "result")?;
        Ok(ResultCode::from_u8(buf.get_u8()))
    }
}

impl Wire for LinearParams {
    const SIZE: usize = 6;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.min_temp);
        buf.put_u8(self.min_duty);
        buf.put_u16_le(self.max_temp);
        buf.put_u8(self.max_duty);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "linear parameters")?;
        Ok(Self {
            min_temp: buf.get_u16_le(),
            min_duty: buf.get_u8(),
            max_temp: buf.get_u16_le(),
            max_duty: buf.get_u8(),
        })
    }
}

impl Wire for PidParams {
    const SIZE: usize = 4;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.target_temp);
        buf.put_u8(self.min_duty);
        buf.put_u8(self.max_duty);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "PID parameters")?;
        Ok(Self {
            target_temp: buf.get_u16_le(),
            min_duty: buf.get_u8(),
            max_duty: buf.get_u8(),
        })
    }
}

impl Wire for FanConfig {
    const SIZE: usize = 3 + LinearParams::SIZE + PidParams::SIZE;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.mode as u8);
        buf.put_u8(self.duty);
        buf.put_u8(self.sensor);
        self.linear.encode(buf);
        self.pid.encode(buf);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "fan config")?;
        let mode = FanMode::try_from(buf.get_u8())?;
        let duty = buf.get_u8();
        let sensor = buf.get_u8();
        Ok(Self {
            mode,
            duty,
            sensor,
            linear: LinearParams::decode(buf)?,
            pid: PidParams::decode(buf)?,
        })
    }
}

impl Wire for Configuration {
    const SIZE: usize = 1 + NUM_FAN * FanConfig::SIZE;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.temp_unit as u8);
        for fan in &self.fans {
            fan.encode(buf);
        }
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "configuration")?;
        let temp_unit = TempUnit::try_from(buf.get_u8())?;
        let mut fans = [FanConfig::default(); NUM_FAN];
        for fan in fans.iter_mut() {
            *fan = FanConfig::decode(buf)?;
        }
        Ok(Self { temp_unit, fans })
    }
}

impl Wire for FanStatus {
    const SIZE: usize = 3;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.duty);
        buf.put_u16_le(self.rpm);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "fan status")?;
        Ok(Self {
            duty: buf.get_u8(),
            rpm: buf.get_u16_le(),
        })
    }
}

impl Wire for Status {
    const SIZE: usize = NUM_FAN * FanStatus::SIZE + NUM_TEMP * 2;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        for fan in &self.fans {
            fan.encode(buf);
        }
        for temp in &self.temps {
            buf.put_u16_le(*temp);
        }
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "status")?;
        let mut status = Status::default();
        for fan in status.fans.iter_mut() {
            *fan = FanStatus::decode(buf)?;
        }
        for temp in status.temps.iter_mut() {
            *temp = buf.get_u16_le();
        }
        Ok(status)
    }
}

impl Wire for CurvePoint {
    const SIZE: usize = 1 + NUM_FAN * 2;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.duty);
        for rpm in &self.rpm {
            buf.put_u16_le(*rpm);
        }
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "curve point")?;
        let mut point = CurvePoint {
            duty: buf.get_u8(),
            ..Default::default()
        };
        for rpm in point.rpm.iter_mut() {
            *rpm = buf.get_u16_le();
        }
        Ok(point)
    }
}

impl Wire for FanCurve {
    const SIZE: usize = CURVE_POINTS * CurvePoint::SIZE;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        for point in &self.points {
            point.encode(buf);
        }
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "fan curve")?;
        let mut curve = FanCurve::default();
        for point in curve.points.iter_mut() {
            *point = CurvePoint::decode(buf)?;
        }
        Ok(curve)
    }
}

fn put_fixed_str<B: BufMut>(buf: &mut B, value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(STRL - 1);
    buf.put_slice(&bytes[..len]);
    buf.put_bytes(0, STRL - len);
}

fn get_fixed_str<B: Buf>(buf: &mut B) -> String {
    let mut raw = [0u8; STRL];
    buf.copy_to_slice(&mut raw);
    let end = raw.iter().position(|b| *b == 0).unwrap_or(STRL);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

impl Wire for VersionInfo {
    const SIZE: usize = 2 * STRL;

    /// Strings longer than 31 bytes are truncated
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_fixed_str(buf, &self.version);
        put_fixed_str(buf, &self.build);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, Self::SIZE, "version")?;
        Ok(Self {
            version: get_fixed_str(buf),
            build: get_fixed_str(buf),
        })
    }
}

/// Build a complete frame from a command tag and an encoded payload
pub fn frame(command: Command, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(SOF);
    buf.put_u8(command as u8);
    buf.put_slice(payload);
    buf
}

/// A decoded request, one variant per command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Version,
    Status,
    Config,
    FanMode { fan: u8, mode: FanMode },
    FanDuty { fan: u8, duty: u8 },
    FanMap { fan: u8, sensor: u8 },
    FanCurve,
    Linear { fan: u8, params: LinearParams },
    Save,
    Load,
    Pid { fan: u8, params: PidParams },
    Reset,
}

impl Request {
    /// Command tag carried by this request
    pub fn command(&self) -> Command {
        match self {
            Request::Version => Command::Version,
            Request::Status => Command::Status,
            Request::Config => Command::Config,
            Request::FanMode { .. } => Command::FanMode,
            Request::FanDuty { .. } => Command::FanDuty,
            Request::FanMap { .. } => Command::FanMap,
            Request::FanCurve => Command::FanCurve,
            Request::Linear { .. } => Command::Linear,
            Request::Save => Command::Save,
            Request::Load => Command::Load,
            Request::Pid { .. } => Command::Pid,
            Request::Reset => Command::Reset,
        }
    }

    /// Encoded request payload (without header)
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.command().request_len());
        match self {
            Request::FanMode { fan, mode } => {
                buf.put_u8(*fan);
                buf.put_u8(*mode as u8);
            }
            Request::FanDuty { fan, duty } => {
                buf.put_u8(*fan);
                buf.put_u8(*duty);
            }
            Request::FanMap { fan, sensor } => {
                buf.put_u8(*fan);
                buf.put_u8(*sensor);
            }
            Request::Linear { fan, params } => {
                buf.put_u8(*fan);
                params.encode(&mut buf);
            }
            Request::Pid { fan, params } => {
                buf.put_u8(*fan);
                params.encode(&mut buf);
            }
            Request::Version
            | Request::Status
            | Request::Config
            | Request::FanCurve
            | Request::Save
            | Request::Load
            | Request::Reset => {}
        }
        buf
    }

    /// Complete request frame
    pub fn encode_frame(&self) -> Vec<u8> {
        frame(self.command(), &self.payload())
    }

    /// Decode a request payload for a known command
    pub fn decode(command: Command, payload: &[u8]) -> Result<Self> {
        if payload.len() != command.request_len() {
            return Err(FanBoyError::Decode(format!(
                "{:?} request needs {} payload bytes, got {}",
                command,
                command.request_len(),
                payload.len()
            )));
        }

        let mut buf = payload;
        let request = match command {
            Command::Version => Request::Version,
            Command::Status => Request::Status,
            Command::Config => Request::Config,
            Command::FanCurve => Request::FanCurve,
            Command::Save => Request::Save,
            Command::Load => Request::Load,
            Command::Reset => Request::Reset,
            Command::FanMode => {
                let fan = buf.get_u8();
                let mode = FanMode::try_from(buf.get_u8())?;
                Request::FanMode { fan, mode }
            }
            Command::FanDuty => Request::FanDuty {
                fan: buf.get_u8(),
                duty: buf.get_u8(),
            },
            Command::FanMap => Request::FanMap {
                fan: buf.get_u8(),
                sensor: buf.get_u8(),
            },
            Command::Linear => {
                let fan = buf.get_u8();
                Request::Linear {
                    fan,
                    params: LinearParams::decode(&mut buf)?,
                }
            }
            Command::Pid => {
                let fan = buf.get_u8();
                Request::Pid {
                    fan,
                    params: PidParams::decode(&mut buf)?,
                }
            }
        };
        Ok(request)
    }
}

/// A decoded reply payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Version(VersionInfo),
    Status(Status),
    Config(Configuration),
    Curve(FanCurve),
    Result(ResultCode),
}

impl Reply {
    /// Encoded reply payload (without header)
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Reply::Version(version) => version.to_bytes(),
            Reply::Status(status) => status.to_bytes(),
            Reply::Config(config) => config.to_bytes(),
            Reply::Curve(curve) => curve.to_bytes(),
            Reply::Result(result) => result.to_bytes(),
        }
    }

    /// Complete reply frame echoing `command`
    pub fn encode_frame(&self, command: Command) -> Vec<u8> {
        frame(command, &self.payload())
    }

    /// Decode the reply payload for `command`
    pub fn decode(command: Command, payload: &[u8]) -> Result<Self> {
        let reply = match command {
            Command::Version => Reply::Version(VersionInfo::from_bytes(payload)?),
            Command::Status => Reply::Status(Status::from_bytes(payload)?),
            Command::Config => Reply::Config(Configuration::from_bytes(payload)?),
            Command::FanCurve => Reply::Curve(FanCurve::from_bytes(payload)?),
            _ => Reply::Result(ResultCode::from_bytes(payload)?),
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NCONN;

    #[test]
    fn test_command_values() {
        assert_eq!(Command::Version as u8, 0x00);
        assert_eq!(Command::Status as u8, 0x01);
        assert_eq!(Command::Config as u8, 0x02);
        assert_eq!(Command::FanMode as u8, 0x03);
        assert_eq!(Command::FanDuty as u8, 0x04);
        assert_eq!(Command::FanMap as u8, 0x05);
        assert_eq!(Command::FanCurve as u8, 0x06);
        assert_eq!(Command::Linear as u8, 0x07);
        assert_eq!(Command::Save as u8, 0x08);
        assert_eq!(Command::Load as u8, 0x09);
        assert_eq!(Command::Pid as u8, 0x0A);
        assert_eq!(Command::Reset as u8, 0xFF);
    }

    #[test]
    fn test_command_from_tag() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_u8(cmd as u8), Some(cmd));
        }
        assert_eq!(Command::from_u8(CMD_INVALID), None);
        assert_eq!(Command::from_u8(0x0B), None);
        assert!(matches!(
            Command::try_from(0x42),
            Err(FanBoyError::Decode(_))
        ));
    }

    #[test]
    fn test_payload_sizes_match_packed_layout() {
        assert_eq!(LinearParams::SIZE, 6);
        assert_eq!(PidParams::SIZE, 4);
        assert_eq!(FanConfig::SIZE, 13);
        assert_eq!(Configuration::SIZE, 53);
        assert_eq!(FanStatus::SIZE, 3);
        assert_eq!(Status::SIZE, 16);
        assert_eq!(CurvePoint::SIZE, 9);
        assert_eq!(FanCurve::SIZE, 99);
        assert_eq!(VersionInfo::SIZE, 64);
    }

    #[test]
    fn test_request_and_reply_lengths_per_command() {
        let expected: [(Command, usize, usize); 12] = [
            (Command::Version, 0, 64),
            (Command::Status, 0, 16),
            (Command::Config, 0, 53),
            (Command::FanMode, 2, 1),
            (Command::FanDuty, 2, 1),
            (Command::FanMap, 2, 1),
            (Command::FanCurve, 0, 99),
            (Command::Linear, 7, 1),
            (Command::Save, 0, 1),
            (Command::Load, 0, 1),
            (Command::Pid, 5, 1),
            (Command::Reset, 0, 1),
        ];
        for (cmd, req, rep) in expected {
            assert_eq!(cmd.request_len(), req, "request length of {:?}", cmd);
            assert_eq!(cmd.reply_len(), rep, "reply length of {:?}", cmd);
        }
    }

    #[test]
    fn test_linear_params_byte_layout() {
        let params = LinearParams {
            min_temp: 0x0102,
            min_duty: 0x03,
            max_temp: 0x0405,
            max_duty: 0x06,
        };
        assert_eq!(params.to_bytes(), vec![0x02, 0x01, 0x03, 0x05, 0x04, 0x06]);
    }

    #[test]
    fn test_status_byte_layout() {
        let mut status = Status::default();
        status.fans[0] = FanStatus {
            duty: 42,
            rpm: 1200,
        };
        status.temps[0] = 2350;

        let bytes = status.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..3], &[42, 0xB0, 0x04]);
        // Disconnected fans report NCONN
        assert_eq!(&bytes[4..6], &[0xFF, 0xFF]);
        assert_eq!(&bytes[12..14], &[0x2E, 0x09]);
        assert_eq!(&bytes[14..16], &[0xFF, 0xFF]);

        let decoded = Status::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, status);
        assert_eq!(decoded.fans[1].rpm, NCONN);
    }

    #[test]
    fn test_request_frame_layout() {
        let frame = Request::FanDuty { fan: 2, duty: 42 }.encode_frame();
        assert_eq!(frame, vec![SOF, 0x04, 2, 42]);

        let frame = Request::Status.encode_frame();
        assert_eq!(frame, vec![SOF, 0x01]);

        let frame = Request::Pid {
            fan: 1,
            params: PidParams {
                target_temp: 3000,
                min_duty: 10,
                max_duty: 90,
            },
        }
        .encode_frame();
        assert_eq!(frame, vec![SOF, 0x0A, 1, 0xB8, 0x0B, 10, 90]);
    }

    #[test]
    fn test_every_request_layout_decodes_back() {
        let requests = [
            Request::Version,
            Request::Status,
            Request::Config,
            Request::FanMode {
                fan: 3,
                mode: FanMode::Linear,
            },
            Request::FanDuty { fan: 0, duty: 100 },
            Request::FanMap { fan: 1, sensor: 1 },
            Request::FanCurve,
            Request::Linear {
                fan: 2,
                params: LinearParams::default(),
            },
            Request::Save,
            Request::Load,
            Request::Pid {
                fan: 0,
                params: PidParams::default(),
            },
            Request::Reset,
        ];

        for request in requests {
            let cmd = request.command();
            let payload = request.payload();
            assert_eq!(payload.len(), cmd.request_len(), "{:?}", cmd);
            assert_eq!(Request::decode(cmd, &payload).unwrap(), request);
        }
    }

    #[test]
    fn test_request_decode_rejects_wrong_length() {
        let result = Request::decode(Command::FanDuty, &[0]);
        assert!(matches!(result, Err(FanBoyError::Decode(_))));

        let result = Request::decode(Command::Status, &[0]);
        assert!(matches!(result, Err(FanBoyError::Decode(_))));
    }

    #[test]
    fn test_request_decode_rejects_unknown_mode() {
        let result = Request::decode(Command::FanMode, &[0, 7]);
        assert!(matches!(result, Err(FanBoyError::Decode(_))));
    }

    #[test]
    fn test_configuration_layout_roundtrip() {
        let mut config = Configuration::default();
        config.temp_unit = TempUnit::Fahrenheit;
        config.fans[2].mode = FanMode::Pid;
        config.fans[2].sensor = 1;
        config.fans[3].linear.max_temp = 6000;

        let bytes = config.to_bytes();
        assert_eq!(bytes.len(), Configuration::SIZE);
        assert_eq!(bytes[0], TempUnit::Fahrenheit as u8);
        // fan 2 starts after the unit byte and two fan records
        assert_eq!(bytes[1 + 2 * FanConfig::SIZE], FanMode::Pid as u8);
        assert_eq!(Configuration::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_configuration_decode_rejects_bad_unit() {
        let mut bytes = Configuration::default().to_bytes();
        bytes[0] = 0x07;
        assert!(Configuration::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_version_strings_are_nul_padded_and_truncated() {
        let version = VersionInfo::new("1.2.3", "x".repeat(40));
        let bytes = version.to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[0..5], b"1.2.3");
        assert!(bytes[5..32].iter().all(|b| *b == 0));
        assert_eq!(bytes[63], 0);

        let decoded = VersionInfo::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.version, "1.2.3");
        assert_eq!(decoded.build.len(), STRL - 1);
    }

    #[test]
    fn test_reply_decode_by_command() {
        let reply = Reply::decode(Command::Save, &[0x00]).unwrap();
        assert_eq!(reply, Reply::Result(ResultCode::Ok));

        let reply = Reply::decode(Command::FanDuty, &[0x17]).unwrap();
        assert_eq!(reply, Reply::Result(ResultCode::Err));

        let curve = FanCurve::default();
        let reply = Reply::decode(Command::FanCurve, &curve.to_bytes()).unwrap();
        assert_eq!(reply, Reply::Curve(curve));

        assert!(Reply::decode(Command::Status, &[0u8; 3]).is_err());
    }

    #[test]
    fn test_reply_frame_echoes_command() {
        let frame = Reply::Result(ResultCode::Ok).encode_frame(Command::Load);
        assert_eq!(frame, vec![SOF, Command::Load as u8, 0x00]);
    }

    #[test]
    fn test_result_code_any_nonzero_is_failure() {
        assert!(ResultCode::from_u8(0x00).is_ok());
        assert!(!ResultCode::from_u8(0x01).is_ok());
        assert!(!ResultCode::from_u8(0xFF).is_ok());
        assert_eq!(ResultCode::from(true), ResultCode::Ok);
        assert_eq!(ResultCode::from(false), ResultCode::Err);
    }
}
