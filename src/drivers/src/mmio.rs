//! Volatile access to memory-mapped register windows.

use core::ptr;
use log::warn;
use lowrisc_common::{DriverError, MemRegion};
use lowrisc_hal::{CellBuffer, RegisterBlock};

/// A mapped window of 32-bit device registers.
pub struct MmioRegion {
    base: *mut u32,
    size: usize,
}

// SAFETY: MmioRegion only touches device memory through volatile accesses,
// and the owner serializes use through `&mut self`.
unsafe impl Send for MmioRegion {}

impl MmioRegion {
    /// Wraps an already-mapped register window.
    ///
    /// Fails with [`DriverError::MapFailed`] for a null or misaligned base.
    ///
    /// # Safety
    ///
    /// `region.start` must be the virtual address of a live device mapping of
    /// at least `region.size` bytes that stays mapped for the lifetime of the
    /// returned value, and nothing else may alias it as ordinary memory.
    pub unsafe fn new(region: MemRegion) -> Result<Self, DriverError> {
        if region.start == 0 || region.start % core::mem::align_of::<u32>() != 0 {
            return Err(DriverError::MapFailed);
        }
        Ok(Self {
            base: region.start as *mut u32,
            size: region.size,
        })
    }

    /// Size of the window in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    fn slot(&self, offset: usize) -> Option<*mut u32> {
        let in_range = offset % 4 == 0 && offset.checked_add(4).is_some_and(|end| end <= self.size);
        // SAFETY: offset was checked against the mapped size above.
        in_range.then(|| unsafe { self.base.add(offset / 4) })
    }
}

impl RegisterBlock for MmioRegion {
    fn read32(&mut self, offset: usize) -> u32 {
        match self.slot(offset) {
            // SAFETY: slot() only yields addresses inside the mapped window.
            Some(reg) => unsafe { ptr::read_volatile(reg) },
            None => {
                warn!("mmio: read at {:#x} outside {:#x}-byte window", offset, self.size);
                u32::MAX
            }
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        match self.slot(offset) {
            // SAFETY: slot() only yields addresses inside the mapped window.
            Some(reg) => unsafe { ptr::write_volatile(reg, value) },
            None => warn!("mmio: write at {:#x} outside {:#x}-byte window", offset, self.size),
        }
    }
}

/// A mapped text page of 16-bit character cells.
pub struct MmioCells {
    base: *mut u16,
    cells: usize,
}

// SAFETY: as for MmioRegion; access is serialized by the console lock.
unsafe impl Send for MmioCells {}

impl MmioCells {
    /// Wraps an already-mapped text page of `region.size / 2` cells.
    ///
    /// # Safety
    ///
    /// Same contract as [`MmioRegion::new`].
    pub unsafe fn new(region: MemRegion) -> Result<Self, DriverError> {
        if region.start == 0 || region.start % core::mem::align_of::<u16>() != 0 {
            return Err(DriverError::MapFailed);
        }
        Ok(Self {
            base: region.start as *mut u16,
            cells: region.size / 2,
        })
    }
}

impl CellBuffer for MmioCells {
    fn cell_count(&self) -> usize {
        self.cells
    }

    fn read_cell(&self, index: usize) -> u16 {
        assert!(index < self.cells, "cell index out of bounds");
        // SAFETY: index is below the mapped cell count.
        unsafe { ptr::read_volatile(self.base.add(index)) }
    }

    fn write_cell(&mut self, index: usize, value: u16) {
        assert!(index < self.cells, "cell index out of bounds");
        // SAFETY: index is below the mapped cell count.
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}
