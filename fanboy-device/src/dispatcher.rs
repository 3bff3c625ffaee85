//! Byte-fed command dispatcher
//!
//! Reassembles request frames from the serial byte stream and answers each
//! one with a reply frame echoing the command tag. Frames carry no length,
//! so the payload size comes from the tag; an unknown tag cannot be skipped
//! and is dropped without a reply.

use fanboy_core::protocol::{Command, Reply, Request, ResultCode, SOF};
use tracing::{debug, trace, warn};

use crate::device::Device;
use crate::eeprom::Eeprom;
use crate::hardware::{DevicePort, FanHardware};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DispatchState {
    /// Waiting for SOF
    Idle,
    /// Got SOF, waiting for the command tag
    AwaitingCommand,
    /// Reading the fixed-size request payload
    ReadingPayload { command: Command, payload: Vec<u8> },
}

/// Request frame state machine
#[derive(Debug, Clone)]
pub struct Dispatcher {
    state: DispatchState,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Idle,
        }
    }

    /// True between frames
    pub fn is_idle(&self) -> bool {
        self.state == DispatchState::Idle
    }

    /// Feed one received byte; a completed request is executed and answered
    /// on `port`
    pub fn feed<H, E, P>(&mut self, byte: u8, device: &mut Device<H, E>, port: &mut P)
    where
        H: FanHardware,
        E: Eeprom,
        P: DevicePort + ?Sized,
    {
        match std::mem::replace(&mut self.state, DispatchState::Idle) {
            DispatchState::Idle => {
                if byte == SOF {
                    self.state = DispatchState::AwaitingCommand;
                } else {
                    trace!("Discarding 0x{:02X} outside a frame", byte);
                }
            }
            DispatchState::AwaitingCommand => match Command::from_u8(byte) {
                Some(command) if command.request_len() == 0 => {
                    Self::dispatch(command, &[], device, port);
                }
                Some(command) => {
                    self.state = DispatchState::ReadingPayload {
                        command,
                        payload: Vec::with_capacity(command.request_len()),
                    };
                }
                None => warn!("Unknown command 0x{:02X}, frame dropped", byte),
            },
            DispatchState::ReadingPayload {
                command,
                mut payload,
            } => {
                payload.push(byte);
                if payload.len() == command.request_len() {
                    Self::dispatch(command, &payload, device, port);
                } else {
                    self.state = DispatchState::ReadingPayload { command, payload };
                }
            }
        }
    }

    /// The RX timeout expired: drop any partial frame
    pub fn rx_timeout(&mut self) {
        if !self.is_idle() {
            warn!("Receive timeout inside a frame, aborting");
            self.state = DispatchState::Idle;
        }
    }

    /// Handle one read from the port; returns whether a byte arrived
    pub fn poll<H, E, P>(&mut self, device: &mut Device<H, E>, port: &mut P) -> bool
    where
        H: FanHardware,
        E: Eeprom,
        P: DevicePort + ?Sized,
    {
        match port.read_byte() {
            Some(byte) => {
                self.feed(byte, device, port);
                true
            }
            None => {
                self.rx_timeout();
                false
            }
        }
    }

    /// One iteration of the firmware main loop
    pub fn step<H, E, P>(&mut self, device: &mut Device<H, E>, port: &mut P)
    where
        H: FanHardware,
        E: Eeprom,
        P: DevicePort + ?Sized,
    {
        self.poll(device, port);
        device.update_if_due();
    }

    fn dispatch<H, E, P>(command: Command, payload: &[u8], device: &mut Device<H, E>, port: &mut P)
    where
        H: FanHardware,
        E: Eeprom,
        P: DevicePort + ?Sized,
    {
        debug!("Dispatching {:?}", command);

        let reply = match Request::decode(command, payload) {
            Ok(request) => device.handle(request),
            Err(e) => {
                warn!("Malformed {:?} request: {}", command, e);
                Reply::Result(ResultCode::Err)
            }
        };
        port.write(&reply.encode_frame(command));

        if command == Command::Reset {
            device.restart();
        }
    }
}
