//! PS/2-derived scancode keyboard (`lowrisc-keyb`).
//!
//! The board's USB HID controller converts the keyboard to raw scancodes and
//! pushes them into a FIFO. Each FIFO entry carries one key transition: the
//! low byte is the scancode and bit 8 is set for a release.

use super::{InputDevice, InputId, KeyEventEmitter, KeySink, ScancodeTranslator};
use crate::config::{DriverConfig, FifoLayout};
use crate::fifo::FifoReader;
use crate::registry::DeviceRegistry;
use log::{debug, info};
use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};
use lowrisc_hal::RegisterBlock;

/// Input identity of the scancode keyboard.
pub const IDENTITY: InputId = InputId::lowrisc("lowrisc-keyb", "lowrisc-kbd/input0");

/// A probed scancode keyboard.
pub struct ScancodeKeyboard<R> {
    id: DeviceId,
    fifo: FifoReader<R>,
    translator: ScancodeTranslator,
}

impl<R: RegisterBlock> ScancodeKeyboard<R> {
    /// Claims `region`, takes over its register window and discards any
    /// input that was queued before the driver came up.
    pub fn probe(
        registry: &mut DeviceRegistry,
        region: MemRegion,
        regs: R,
        config: &DriverConfig,
    ) -> Result<Self, DriverError> {
        let id = registry.claim(DeviceKind::Keyboard, region)?;
        info!("keyb: hid_keyboard at {}", region);

        let mut fifo = FifoReader::new(regs, FifoLayout::KEYBOARD);
        let cleared = fifo.drain(config.drain_limit);
        if cleared > 0 {
            info!("keyb: cleared {} pending entries", cleared);
        }

        Ok(Self {
            id,
            fifo,
            translator: ScancodeTranslator::new(),
        })
    }

    /// Registry id of this keyboard.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Services at most one FIFO entry.
    ///
    /// Emits at most one directional event. Returns whether an entry was
    /// consumed, including entries that translate to nothing.
    pub fn service<S: KeySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let Some(word) = self.fifo.poll() else {
            return false;
        };

        if let Some(entry) = self.translator.entry(word) {
            debug!("keyb: input event key {:?}", entry.lower as char);
        }
        if let Some(event) = self.translator.decode(word) {
            KeyEventEmitter::emit_key(event.code, event.pressed, sink);
        }
        true
    }
}

impl<R: RegisterBlock> InputDevice for ScancodeKeyboard<R> {
    fn identity(&self) -> &InputId {
        &IDENTITY
    }

    fn service<S: KeySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        ScancodeKeyboard::service(self, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KEY_RELEASE;
    use crate::testutil::{MockFifo, RecordingSink};
    use alloc::vec;
    use lowrisc_common::{KeyCode, KeyEvent};

    const REGION: MemRegion = MemRegion::new(0x4100_0000, 0x1000);

    fn probe(fifo: &MockFifo) -> ScancodeKeyboard<MockFifo> {
        let mut registry = DeviceRegistry::new();
        ScancodeKeyboard::probe(&mut registry, REGION, fifo.clone(), &DriverConfig::default())
            .expect("probe")
    }

    #[test]
    fn probe_discards_stale_input() {
        let fifo = MockFifo::new(&[0x1C, 0x1C | KEY_RELEASE]);
        let mut kbd = probe(&fifo);
        let mut sink = RecordingSink::new();

        assert!(fifo.is_empty());
        assert!(!kbd.service(&mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn press_produces_a_single_event() {
        let fifo = MockFifo::new(&[]);
        let mut kbd = probe(&fifo);
        let mut sink = RecordingSink::new();

        fifo.push(0x1C);
        assert!(kbd.service(&mut sink));
        assert_eq!(sink.events(), vec![KeyEvent::press(KeyCode::A)]);
        assert_eq!(sink.syncs(), 1);

        fifo.push(0x1C | KEY_RELEASE);
        assert!(kbd.service(&mut sink));
        assert_eq!(
            sink.events(),
            vec![KeyEvent::press(KeyCode::A), KeyEvent::release(KeyCode::A)]
        );
    }

    #[test]
    fn caps_lock_is_consumed_silently() {
        let fifo = MockFifo::new(&[]);
        let mut kbd = probe(&fifo);
        let mut sink = RecordingSink::new();

        fifo.push(0x58);
        fifo.push(0x58 | KEY_RELEASE);
        assert!(kbd.service(&mut sink));
        assert!(kbd.service(&mut sink));
        assert!(sink.events().is_empty());
        assert_eq!(sink.syncs(), 0);
    }

    #[test]
    fn quiescent_fifo_emits_nothing() {
        let fifo = MockFifo::new(&[]);
        let mut kbd = probe(&fifo);
        let mut sink = RecordingSink::new();

        for _ in 0..10 {
            assert!(!kbd.service(&mut sink));
        }
        assert!(sink.events().is_empty());
        assert!(fifo.writes().is_empty());
    }

    #[test]
    fn second_keyboard_on_same_region_is_busy() {
        let mut registry = DeviceRegistry::new();
        let config = DriverConfig::default();
        ScancodeKeyboard::probe(&mut registry, REGION, MockFifo::new(&[]), &config).unwrap();

        let err = ScancodeKeyboard::probe(&mut registry, REGION, MockFifo::new(&[]), &config)
            .err();
        assert_eq!(err, Some(DriverError::RegionBusy));
    }
}
