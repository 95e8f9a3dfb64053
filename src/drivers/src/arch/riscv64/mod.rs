//! riscv64 architecture support.
//!
//! Provides the SBI console used as the fallback serial channel and as the
//! log destination.

pub mod sbi;

pub use sbi::SbiConsole;
