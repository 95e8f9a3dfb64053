//! Types shared between the lowRISC I/O drivers and their consumers.
//!
//! - [`input`]: standardized key codes, key events and modifier synthesis results
//! - [`device`]: device identity and memory-region descriptors
//! - [`error`]: the driver error type

#![no_std]

pub mod device;
pub mod error;
pub mod input;

pub use device::{DeviceId, DeviceKind, MemRegion};
pub use error::DriverError;
pub use input::{KeyCode, KeyEvent, Modifiers, Translation};
