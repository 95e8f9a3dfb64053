//! Driver configuration.
//!
//! Register layouts are fixed by the RTL and exposed as constants; the
//! remaining knobs are gathered in [`DriverConfig`].

use log::LevelFilter;

/// Status bit that is clear while the FIFO holds at least one entry.
pub const FIFO_EMPTY: u32 = 1 << 9;

/// Status bit that is set when a scancode entry reports a key release.
pub const KEY_RELEASE: u32 = 1 << 8;

/// Register layout of one polled FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoLayout {
    /// Byte offset of the combined status/data register.
    pub status_offset: usize,
    /// Byte offset written to advance the FIFO read pointer.
    pub ack_offset: usize,
    /// Mask applied to the data word after the pop.
    pub data_mask: u32,
}

impl FifoLayout {
    /// Scancode keyboard: the status register is also the pop register.
    pub const KEYBOARD: FifoLayout = FifoLayout {
        status_offset: 0,
        ack_offset: 0,
        data_mask: !FIFO_EMPTY,
    };

    /// Serial conduit of the fake keyboard: pop lives 0x200 doublewords up.
    pub const FAKE_KEYBOARD: FifoLayout = FifoLayout {
        status_offset: 0,
        ack_offset: 0x200 * 8,
        data_mask: 0x7F,
    };
}

/// Runtime knobs shared by all adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Interval between polls of each input device, in milliseconds.
    pub poll_interval_ms: u32,
    /// Upper bound on FIFO entries discarded while probing.
    pub drain_limit: usize,
    /// Maximum level passed to the logger.
    pub log_level: LevelFilter,
    /// Mirror text console output onto the fake keyboard's serial conduit.
    pub shadow_console: bool,
}

impl DriverConfig {
    /// The configuration used on the reference FPGA deployment.
    pub const fn reference() -> Self {
        Self {
            poll_interval_ms: 100,
            drain_limit: 512,
            log_level: LevelFilter::Info,
            shadow_console: true,
        }
    }

    /// Poll interval expressed in timer ticks.
    pub const fn poll_interval_ticks(&self, ticks_per_ms: u64) -> u64 {
        (self.poll_interval_ms as u64).saturating_mul(ticks_per_ms)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_polls_ten_times_a_second() {
        let config = DriverConfig::default();
        assert_eq!(config.poll_interval_ticks(1), 100);
        assert_eq!(config.poll_interval_ticks(10_000), 1_000_000);
        assert_eq!(config.poll_interval_ticks(u64::MAX), u64::MAX);
    }

    #[test]
    fn fake_keyboard_pop_register_sits_above_status() {
        assert_eq!(FifoLayout::FAKE_KEYBOARD.ack_offset, 0x1000);
        assert_eq!(FifoLayout::KEYBOARD.ack_offset, FifoLayout::KEYBOARD.status_offset);
        assert_eq!(FifoLayout::KEYBOARD.data_mask & FIFO_EMPTY, 0);
    }
}
