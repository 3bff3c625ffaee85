//! fanboy-hardware
//!
//! Host-side crate that contains the low-level serial transport and the
//! protocol driver for the FanBoy. The CLI uses it to talk to the device.
//!
//! Public API:
//! - `controller::FanBoyController`: one method per wire command
//! - `serial_driver::SerialDriver`: tokio-serial backed transport
//! - `transport::SerialTransport`: byte transport seam, mockable in tests

pub mod controller;
pub mod serial_driver;
pub mod transport;

pub use controller::FanBoyController;
pub use serial_driver::{available_port_names, is_disconnect_error, SerialDriver};
pub use transport::{receive_exact, send_all, sync_to_sof, SerialTransport};

#[cfg(test)]
pub mod test_utils;
