//! lowRISC Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details.
//! Drivers are written against these traits so that the same decode logic runs
//! over real memory-mapped registers and over host-side test doubles.

#![no_std]

/// Trait for a window of 32-bit memory-mapped registers.
///
/// Offsets are in bytes from the start of the window.
pub trait RegisterBlock {
    /// Reads the 32-bit register at `offset`.
    fn read32(&mut self, offset: usize) -> u32;
    /// Writes `value` to the 32-bit register at `offset`.
    fn write32(&mut self, offset: usize, value: u32);
}

impl<R: RegisterBlock + ?Sized> RegisterBlock for &mut R {
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Trait for the backing storage of a text-mode screen.
///
/// Each cell is a 16-bit value holding a glyph and its attribute bits.
pub trait CellBuffer {
    /// Number of addressable cells.
    fn cell_count(&self) -> usize;
    /// Reads the cell at `index`. `index` must be below `cell_count()`.
    fn read_cell(&self, index: usize) -> u16;
    /// Writes the cell at `index`. `index` must be below `cell_count()`.
    fn write_cell(&mut self, index: usize, value: u16);
}

impl<const N: usize> CellBuffer for [u16; N] {
    fn cell_count(&self) -> usize {
        N
    }

    fn read_cell(&self, index: usize) -> u16 {
        self[index]
    }

    fn write_cell(&mut self, index: usize, value: u16) {
        self[index] = value;
    }
}

/// Trait for a serial port or similar character-based communication channel.
pub trait Serial {
    /// Writes a single byte to the serial port.
    fn write_byte(&mut self, byte: u8);
    /// Reads a single byte from the serial port, if available.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Trait for a text-based console output.
pub trait Console {
    /// Writes a string to the console.
    fn write_str(&mut self, s: &str);
    /// Clears the console screen.
    fn clear(&mut self);
}

/// Trait for a system timer.
pub trait Timer {
    /// Returns the number of ticks since the system started.
    fn current_ticks(&self) -> u64;
}
