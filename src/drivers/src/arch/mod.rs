//! Architecture-specific implementations.
//!
//! This module provides platform abstractions for different target architectures.
//! Currently supported: riscv64.

#[cfg(target_arch = "riscv64")]
pub mod riscv64;

#[cfg(target_arch = "riscv64")]
pub use riscv64::*;
