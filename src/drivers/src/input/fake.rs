//! Serial-driven keyboard (`lowrisc-fake`) and the shadow console.
//!
//! Characters arriving on a serial conduit are turned into synthetic key
//! taps so the board can be driven headless without a keyboard attached.
//! The same conduit carries an approximation of console output back out:
//! see [`ShadowConsole`].

use super::{AsciiKeyTranslator, InputDevice, InputId, KeyEventEmitter, KeySink};
use crate::config::FifoLayout;
use crate::fifo::FifoReader;
use crate::registry::DeviceRegistry;
use log::{debug, info};
use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};
use lowrisc_hal::{RegisterBlock, Serial};
use spin::Mutex;

/// Input identity of the serial-driven keyboard.
pub const IDENTITY: InputId = InputId::lowrisc("lowrisc-fake", "lowrisc-fake/input0");

/// Byte offset of the conduit's transmit register.
const TX_OFFSET: usize = 0;

struct Conduit<R, F> {
    fifo: Option<FifoReader<R>>,
    fallback: F,
}

/// Both directions of the serial conduit behind one lock.
///
/// Until a fake keyboard is probed the register window is unknown, and
/// output goes to the platform `fallback` console instead.
pub struct ShadowConsole<R, F> {
    inner: Mutex<Conduit<R, F>>,
}

impl<R: RegisterBlock, F: Serial> ShadowConsole<R, F> {
    /// Creates an unattached conduit that writes through `fallback`.
    pub const fn new(fallback: F) -> Self {
        Self {
            inner: Mutex::new(Conduit {
                fifo: None,
                fallback,
            }),
        }
    }

    /// Hands the conduit its register window.
    pub fn attach(&self, regs: R) -> Result<(), DriverError> {
        let mut conduit = self.inner.lock();
        if conduit.fifo.is_some() {
            return Err(DriverError::AlreadyProbed);
        }
        conduit.fifo = Some(FifoReader::new(regs, FifoLayout::FAKE_KEYBOARD));
        Ok(())
    }

    /// Takes the register window back, reverting output to the fallback.
    pub fn detach(&self) -> Option<R> {
        self.inner.lock().fifo.take().map(FifoReader::into_inner)
    }

    /// Whether a register window is attached.
    pub fn is_attached(&self) -> bool {
        self.inner.lock().fifo.is_some()
    }

    /// Sends one character out of the conduit.
    ///
    /// Only the US-ASCII subset is transmitted.
    pub fn putchar(&self, ch: u8) {
        let mut conduit = self.inner.lock();
        match conduit.fifo.as_mut() {
            Some(fifo) => fifo.registers().write32(TX_OFFSET, u32::from(ch & 0x7F)),
            None => conduit.fallback.write_byte(ch),
        }
    }

    /// Pops one received byte, if any.
    pub fn poll(&self) -> Option<u8> {
        let mut conduit = self.inner.lock();
        let fifo = conduit.fifo.as_mut()?;
        fifo.poll().map(|data| data as u8)
    }
}

/// A probed serial-driven keyboard.
pub struct FakeKeyboard<'a, R, F> {
    id: DeviceId,
    conduit: &'a ShadowConsole<R, F>,
    translator: AsciiKeyTranslator,
}

impl<'a, R: RegisterBlock, F: Serial> FakeKeyboard<'a, R, F> {
    /// Claims `region` and attaches its register window to `conduit`.
    ///
    /// Only one instance may exist at a time.
    pub fn probe(
        registry: &mut DeviceRegistry,
        region: MemRegion,
        regs: R,
        conduit: &'a ShadowConsole<R, F>,
    ) -> Result<Self, DriverError> {
        let id = registry.claim(DeviceKind::FakeKeyboard, region)?;
        if let Err(e) = conduit.attach(regs) {
            registry.release(id);
            return Err(e);
        }
        info!("fake: fake_keyboard at {}", region);

        Ok(Self {
            id,
            conduit,
            translator: AsciiKeyTranslator,
        })
    }

    /// Registry id of this keyboard.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Services at most one received byte, emitting a complete tap for it.
    ///
    /// Returns whether a byte was consumed.
    pub fn service<S: KeySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let Some(byte) = self.conduit.poll() else {
            return false;
        };

        let translation = self.translator.translate(byte);
        let accepted = KeyEventEmitter::emit_tap(&translation, sink);
        debug!("fake: byte 0x{:02x} -> {:?} ({} accepted)", byte, translation, accepted);
        true
    }
}

impl<R: RegisterBlock, F: Serial> InputDevice for FakeKeyboard<'_, R, F> {
    fn identity(&self) -> &InputId {
        &IDENTITY
    }

    fn service<S: KeySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        FakeKeyboard::service(self, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockFifo, MockSerial, RecordingSink};
    use alloc::vec;
    use lowrisc_common::{KeyCode, KeyEvent};

    const REGION: MemRegion = MemRegion::new(0x4200_0000, 0x2000);

    fn fake_fifo() -> MockFifo {
        MockFifo::with_ack_offset(&[], FifoLayout::FAKE_KEYBOARD.ack_offset)
    }

    #[test]
    fn uppercase_is_bracketed_by_shift() {
        let fifo = fake_fifo();
        let shadow = ShadowConsole::new(MockSerial::new());
        let mut registry = DeviceRegistry::new();
        let mut kbd = FakeKeyboard::probe(&mut registry, REGION, fifo.clone(), &shadow).unwrap();
        let mut sink = RecordingSink::new();

        fifo.push(u32::from(b'A'));
        assert!(kbd.service(&mut sink));
        assert_eq!(
            sink.events(),
            vec![
                KeyEvent::press(KeyCode::LEFTSHIFT),
                KeyEvent::press(KeyCode::A),
                KeyEvent::release(KeyCode::A),
                KeyEvent::release(KeyCode::LEFTSHIFT),
            ]
        );
        assert_eq!(sink.syncs(), 1);
    }

    #[test]
    fn unmapped_byte_is_consumed_without_events() {
        let fifo = fake_fifo();
        let shadow = ShadowConsole::new(MockSerial::new());
        let mut registry = DeviceRegistry::new();
        let mut kbd = FakeKeyboard::probe(&mut registry, REGION, fifo.clone(), &shadow).unwrap();
        let mut sink = RecordingSink::new();

        fifo.push(0x1C);
        assert!(kbd.service(&mut sink));
        assert!(sink.events().is_empty());
        assert!(!kbd.service(&mut sink));
    }

    #[test]
    fn only_one_instance_allowed() {
        let shadow = ShadowConsole::new(MockSerial::new());
        let mut registry = DeviceRegistry::new();
        let _first = FakeKeyboard::probe(&mut registry, REGION, fake_fifo(), &shadow).unwrap();

        let other = MemRegion::new(0x4300_0000, 0x2000);
        let err = FakeKeyboard::probe(&mut registry, other, fake_fifo(), &shadow).err();
        assert_eq!(err, Some(DriverError::AlreadyProbed));
    }

    #[test]
    fn failed_attach_releases_the_claim() {
        let shadow = ShadowConsole::new(MockSerial::new());
        shadow.attach(fake_fifo()).unwrap();
        let mut registry = DeviceRegistry::new();

        let err = FakeKeyboard::probe(&mut registry, REGION, fake_fifo(), &shadow).err();
        assert_eq!(err, Some(DriverError::AlreadyProbed));
        assert!(registry.is_empty());
    }

    #[test]
    fn shadow_output_falls_back_until_attached() {
        let serial = MockSerial::new();
        let shadow = ShadowConsole::new(serial.clone());
        let fifo = fake_fifo();

        shadow.putchar(b'h');
        assert!(!shadow.is_attached());
        assert_eq!(serial.transmitted(), b"h");
        assert_eq!(shadow.poll(), None);

        shadow.attach(fifo.clone()).unwrap();
        assert!(shadow.is_attached());
        shadow.putchar(b'i' | 0x80);
        assert_eq!(serial.transmitted(), b"h");
        assert_eq!(fifo.written_at(TX_OFFSET), vec![u32::from(b'i')]);

        assert!(shadow.detach().is_some());
        assert!(!shadow.is_attached());
        shadow.putchar(b'!');
        assert_eq!(serial.transmitted(), b"h!");
    }
}
