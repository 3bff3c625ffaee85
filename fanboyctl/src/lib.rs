//! FanBoy CLI Library
//!
//! Argument definitions, command handlers and output formatting for the
//! `fanboyctl` binary. Protocol logic lives in `fanboy-hardware`.

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;
