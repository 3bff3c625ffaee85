//! fanboy-device
//!
//! Device side of the FanBoy: the command dispatcher, the device state with
//! its control policy, and the wear-rotated EEPROM configuration store. The
//! hardware is reached through [`FanHardware`] and [`DevicePort`], so the
//! same code runs against [`sim::SimulatedHardware`] in tests.
//!
//! ```
//! use fanboy_core::protocol::{Command, SOF};
//! use fanboy_device::{Device, Dispatcher, MemoryEeprom};
//! use fanboy_device::sim::SimulatedHardware;
//!
//! let hw = SimulatedHardware::new().with_fan(0, 2000);
//! let mut device = Device::boot(hw, MemoryEeprom::new(1024)).unwrap();
//! let mut dispatcher = Dispatcher::new();
//!
//! let mut reply = Vec::new();
//! for byte in [SOF, Command::FanDuty as u8, 0, 42] {
//!     dispatcher.feed(byte, &mut device, &mut reply);
//! }
//! assert_eq!(reply, vec![SOF, Command::FanDuty as u8, 0x00]);
//! assert_eq!(device.status().fans[0].duty, 42);
//! ```

pub mod crc8;
pub mod device;
pub mod dispatcher;
pub mod eeprom;
pub mod hardware;
pub mod policy;
pub mod sim;
pub mod store;

pub use device::{firmware_version, Device};
pub use dispatcher::Dispatcher;
pub use eeprom::{Eeprom, MemoryEeprom};
pub use hardware::{DevicePort, FanHardware};
pub use store::{ConfigStore, PersistedRecord};
