//! Ordering of key-state transitions.

use super::KeySink;
use log::debug;
use lowrisc_common::{KeyCode, KeyEvent, Modifiers, Translation};

/// Turns translations into ordered transitions on a [`KeySink`].
///
/// Delivery is fire-and-forget: a rejected event is traced and the sequence
/// carries on, so a tap is never left half-emitted on our side.
pub struct KeyEventEmitter;

impl KeyEventEmitter {
    /// Emits a complete tap for a serial-path translation.
    ///
    /// Order: modifier presses, key press, key release, modifier releases.
    /// Returns the number of events the sink accepted.
    pub fn emit_tap<S: KeySink + ?Sized>(translation: &Translation, sink: &mut S) -> usize {
        let (code, modifiers) = match *translation {
            Translation::Mapped { code, modifiers } => (code, modifiers),
            Translation::Unmapped(_) => return 0,
        };

        let mut accepted = 0;
        for (flag, key) in Modifiers::KEYS {
            if modifiers.contains(flag) {
                accepted += Self::deliver(sink, KeyEvent::press(key));
            }
        }
        accepted += Self::deliver(sink, KeyEvent::press(code));
        accepted += Self::deliver(sink, KeyEvent::release(code));
        for (flag, key) in Modifiers::KEYS {
            if modifiers.contains(flag) {
                accepted += Self::deliver(sink, KeyEvent::release(key));
            }
        }
        sink.sync();
        accepted
    }

    /// Emits exactly one directional transition for a scancode-path key.
    pub fn emit_key<S: KeySink + ?Sized>(code: KeyCode, pressed: bool, sink: &mut S) -> bool {
        let accepted = Self::deliver(sink, KeyEvent { code, pressed }) == 1;
        sink.sync();
        accepted
    }

    fn deliver<S: KeySink + ?Sized>(sink: &mut S, event: KeyEvent) -> usize {
        match sink.report(event) {
            Ok(()) => 1,
            Err(e) => {
                debug!("input: {:?} dropped: {}", event, e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingSink;
    use alloc::vec;

    #[test]
    fn plain_tap_is_press_then_release() {
        let mut sink = RecordingSink::new();
        let t = Translation::Mapped {
            code: KeyCode::A,
            modifiers: Modifiers::empty(),
        };

        assert_eq!(KeyEventEmitter::emit_tap(&t, &mut sink), 2);
        assert_eq!(
            sink.events(),
            vec![KeyEvent::press(KeyCode::A), KeyEvent::release(KeyCode::A)]
        );
        assert_eq!(sink.syncs(), 1);
    }

    #[test]
    fn modifiers_bracket_the_key() {
        let mut sink = RecordingSink::new();
        let t = Translation::Mapped {
            code: KeyCode::KEY_1,
            modifiers: Modifiers::CTRL | Modifiers::SHIFT,
        };

        KeyEventEmitter::emit_tap(&t, &mut sink);
        assert_eq!(
            sink.events(),
            vec![
                KeyEvent::press(KeyCode::LEFTCTRL),
                KeyEvent::press(KeyCode::LEFTSHIFT),
                KeyEvent::press(KeyCode::KEY_1),
                KeyEvent::release(KeyCode::KEY_1),
                KeyEvent::release(KeyCode::LEFTCTRL),
                KeyEvent::release(KeyCode::LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn unmapped_emits_nothing() {
        let mut sink = RecordingSink::new();
        assert_eq!(
            KeyEventEmitter::emit_tap(&Translation::Unmapped(0), &mut sink),
            0
        );
        assert!(sink.events().is_empty());
        assert_eq!(sink.syncs(), 0);
    }

    #[test]
    fn rejected_events_do_not_stop_the_sequence() {
        let mut sink = RecordingSink::new();
        sink.reject_next(1);
        let t = Translation::Mapped {
            code: KeyCode::A,
            modifiers: Modifiers::SHIFT,
        };

        assert_eq!(KeyEventEmitter::emit_tap(&t, &mut sink), 3);
        assert_eq!(
            sink.events(),
            vec![
                KeyEvent::press(KeyCode::A),
                KeyEvent::release(KeyCode::A),
                KeyEvent::release(KeyCode::LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn scancode_path_emits_one_event() {
        let mut sink = RecordingSink::new();
        assert!(KeyEventEmitter::emit_key(KeyCode::A, false, &mut sink));
        assert_eq!(sink.events(), vec![KeyEvent::release(KeyCode::A)]);
        assert_eq!(sink.syncs(), 1);
    }
}
