//! System-wide error types for the lowRISC drivers.

use core::fmt;

/// Errors reported by device probing, mapping and console access.
///
/// Per-poll paths never produce these: an empty FIFO or an untranslatable
/// code is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DriverError {
    /// The requested memory region overlaps one that is already claimed.
    RegionBusy,
    /// A single-instance device was probed a second time.
    AlreadyProbed,
    /// The register window could not be mapped.
    MapFailed,
    /// A console write targeted a cell outside the text grid.
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
    /// The event consumer refused an event.
    SinkRejected,
    /// The tty has not been opened.
    NotOpen,
    /// A global facility was initialized twice.
    AlreadyInitialized,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::RegionBusy => write!(f, "memory region already claimed"),
            DriverError::AlreadyProbed => write!(f, "only one instance allowed"),
            DriverError::MapFailed => write!(f, "cannot map register window"),
            DriverError::OutOfRange { row, col } => {
                write!(f, "cell ({}, {}) outside text grid", row, col)
            }
            DriverError::SinkRejected => write!(f, "event rejected by consumer"),
            DriverError::NotOpen => write!(f, "tty not open"),
            DriverError::AlreadyInitialized => write!(f, "already initialized"),
        }
    }
}
