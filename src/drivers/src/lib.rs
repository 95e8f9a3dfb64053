//! lowRISC I/O adapters
//!
//! Drivers for the memory-mapped peripherals of the lowRISC FPGA SoC.
//!
//! # Architecture
//!
//! - `fifo`: the polled status/data FIFO shared by both keyboards
//! - `input`: scancode keyboard, fake (serial) keyboard and the key emitter
//! - `console`: the 128x31 text grid with its optional serial echo
//! - `tty`: bridge between the platform console and a tty flip buffer
//! - `poll`: timer-driven servicing of polled devices
//! - `registry`: claims on device kinds and MMIO regions
//! - `arch`: platform-specific code (SBI console)
//!
//! # Safety
//!
//! This is a `#![no_std]` crate. Register access goes through `mmio`, whose
//! constructors are `unsafe` and document the mapping invariants they rely on.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod console;
pub mod fifo;
pub mod input;
pub mod logger;
pub mod mmio;
pub mod poll;
pub mod registry;
pub mod tty;

#[cfg(any(test, feature = "test"))]
pub mod testutil;

pub use config::{DriverConfig, FifoLayout};
pub use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};

/// Initializes the logging path.
///
/// Called early in boot, before any device is probed. On riscv64 log records
/// go to the SBI console.
pub fn init(config: &DriverConfig) -> Result<(), DriverError> {
    #[cfg(target_arch = "riscv64")]
    logger::init(arch::riscv64::SbiConsole, config.log_level)?;

    #[cfg(not(target_arch = "riscv64"))]
    log::set_max_level(config.log_level);

    Ok(())
}
