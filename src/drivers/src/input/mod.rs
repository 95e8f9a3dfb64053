//! Keyboard front-ends.
//!
//! Two producers feed the same [`KeySink`]:
//!
//! - [`keyboard`]: PS/2-derived scancodes translated through [`scancode`]
//! - [`fake`]: US-ASCII bytes from a serial conduit translated through [`ascii`]
//!
//! Both hand their translations to [`emitter`], which orders the key-state
//! transitions. Nothing here blocks or keeps history beyond one poll.

pub mod ascii;
pub mod emitter;
pub mod fake;
pub mod keyboard;
pub mod scancode;

pub use ascii::AsciiKeyTranslator;
pub use emitter::KeyEventEmitter;
pub use fake::{FakeKeyboard, ShadowConsole};
pub use keyboard::ScancodeKeyboard;
pub use scancode::ScancodeTranslator;

use lowrisc_common::{DriverError, KeyCode, KeyEvent};

/// Consumer of key-state transitions (the host input layer).
pub trait KeySink {
    /// Deliver one transition. An `Err` is not retried.
    fn report(&mut self, event: KeyEvent) -> Result<(), DriverError>;

    /// Marks the end of the transitions produced by one poll.
    fn sync(&mut self) {}
}

impl<S: KeySink + ?Sized> KeySink for &mut S {
    fn report(&mut self, event: KeyEvent) -> Result<(), DriverError> {
        (**self).report(event)
    }

    fn sync(&mut self) {
        (**self).sync()
    }
}

/// A polled keyboard front-end.
pub trait InputDevice {
    /// Identity registered with the input layer.
    fn identity(&self) -> &InputId;

    /// Services at most one pending item, reporting any transitions to `sink`.
    ///
    /// Returns whether an item was consumed.
    fn service<S: KeySink + ?Sized>(&mut self, sink: &mut S) -> bool;
}

/// An input device paired with the sink it reports to.
pub struct Bound<D, S> {
    /// The front-end.
    pub device: D,
    /// Where its transitions go.
    pub sink: S,
}

impl<D: InputDevice, S: KeySink> Bound<D, S> {
    /// Pairs `device` with `sink`.
    pub fn new(device: D, sink: S) -> Self {
        Self { device, sink }
    }

    /// Services one pending item.
    pub fn service_once(&mut self) -> bool {
        self.device.service(&mut self.sink)
    }
}

/// Bus type reported to the input layer.
pub const BUS_HOST: u16 = 0x19;

/// Identity an input device registers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputId {
    /// Device name, matching the device-tree compatible string.
    pub name: &'static str,
    /// Physical path.
    pub phys: &'static str,
    /// Bus type.
    pub bustype: u16,
    /// Vendor id.
    pub vendor: u16,
    /// Product id.
    pub product: u16,
    /// Version.
    pub version: u16,
}

impl InputId {
    const fn lowrisc(name: &'static str, phys: &'static str) -> Self {
        Self {
            name,
            phys,
            bustype: BUS_HOST,
            vendor: 0x0001,
            product: 0x0001,
            version: 0x0100,
        }
    }
}

/// Iterator over every key code a front-end may report (all but reserved).
pub fn supported_keys() -> impl Iterator<Item = KeyCode> {
    (1..=KeyCode::MAX).filter_map(KeyCode::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_but_reserved_is_supported() {
        assert_eq!(supported_keys().count(), 127);
        assert!(supported_keys().all(|code| !code.is_reserved()));
        assert_eq!(supported_keys().last(), Some(KeyCode::new(KeyCode::MAX).unwrap()));
    }

    #[test]
    fn identities_share_the_lowrisc_ids() {
        assert_eq!(keyboard::IDENTITY.name, "lowrisc-keyb");
        assert_eq!(fake::IDENTITY.phys, "lowrisc-fake/input0");
        assert_eq!(keyboard::IDENTITY.bustype, BUS_HOST);
        assert_eq!(fake::IDENTITY.version, 0x0100);
    }
}
