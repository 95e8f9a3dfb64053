//! Device identity and resource descriptors.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// A unique identifier for a probed device instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId(u32);

impl DeviceId {
    /// Generate the next unique DeviceId.
    pub fn next() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        DeviceId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// The adapters this workspace provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    /// PS/2-derived scancode keyboard.
    Keyboard,
    /// Serial-driven key-event synthesizer and shadow console.
    FakeKeyboard,
    /// Serial console/tty bridge.
    Uart,
    /// Text-mode video console.
    Vga,
}

impl DeviceKind {
    /// Device-tree compatible string / driver name.
    pub const fn driver_name(self) -> &'static str {
        match self {
            DeviceKind::Keyboard => "lowrisc-keyb",
            DeviceKind::FakeKeyboard => "lowrisc-fake",
            DeviceKind::Uart => "lowrisc-uart",
            DeviceKind::Vga => "lowrisc-vga",
        }
    }

    /// Whether at most one instance of this kind may be probed.
    pub const fn single_instance(self) -> bool {
        matches!(self, DeviceKind::FakeKeyboard)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}

/// A physical memory range reserved by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemRegion {
    /// Start address of the memory range.
    pub start: usize,
    /// Size of the memory range in bytes.
    pub size: usize,
}

impl MemRegion {
    /// Creates a region descriptor.
    pub const fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// One past the last byte of the region, saturating at the address-space end.
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.size)
    }

    /// Returns true if the two regions share at least one byte.
    pub const fn overlaps(&self, other: &MemRegion) -> bool {
        self.size != 0 && other.size != 0 && self.start < other.end() && other.start < self.end()
    }
}

impl fmt::Display for MemRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}-{:#X}", self.start, self.end().saturating_sub(1))
    }
}
