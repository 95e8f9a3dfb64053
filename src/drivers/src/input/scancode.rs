//! Scancode-to-key translation for the PS/2-derived keyboard.
//!
//! The keyboard RTL delivers raw set 2 make codes. They are mapped to
//! standard key codes through a fixed table built at compile time; any
//! layout change means regenerating the table.

use crate::config::KEY_RELEASE;
use log::debug;
use lowrisc_common::{KeyCode, KeyEvent};

/// Number of raw codes the table covers.
pub const TABLE_LEN: usize = 0x84;

/// Caps lock is never reported.
pub const SUPPRESSED: KeyCode = KeyCode::CAPSLOCK;

/// One row of the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScancodeEntry {
    /// Standard key code, or reserved if the raw code is unused.
    pub code: KeyCode,
    /// Glyph without shift, 0 if the key has none.
    pub lower: u8,
    /// Glyph with shift, 0 if the key has none.
    pub upper: u8,
}

impl ScancodeEntry {
    /// An unused table slot.
    pub const NONE: ScancodeEntry = ScancodeEntry::key(KeyCode::RESERVED);

    /// A key without glyphs.
    pub const fn key(code: KeyCode) -> Self {
        Self {
            code,
            lower: 0,
            upper: 0,
        }
    }

    /// A key with lower and upper case glyphs.
    pub const fn glyph(code: KeyCode, lower: u8, upper: u8) -> Self {
        Self { code, lower, upper }
    }
}

const fn build_table() -> [ScancodeEntry; TABLE_LEN] {
    use ScancodeEntry as E;

    let mut t = [E::NONE; TABLE_LEN];
    t[0x01] = E::key(KeyCode::F9);
    t[0x03] = E::key(KeyCode::F5);
    t[0x04] = E::key(KeyCode::F3);
    t[0x05] = E::key(KeyCode::F1);
    t[0x06] = E::key(KeyCode::F2);
    t[0x07] = E::key(KeyCode::F12);
    t[0x09] = E::key(KeyCode::F10);
    t[0x0A] = E::key(KeyCode::F8);
    t[0x0B] = E::key(KeyCode::F6);
    t[0x0C] = E::key(KeyCode::F4);
    t[0x0D] = E::glyph(KeyCode::TAB, b'\t', b'\t');
    t[0x0E] = E::glyph(KeyCode::GRAVE, b'`', b'~');
    t[0x11] = E::key(KeyCode::LEFTALT);
    t[0x12] = E::key(KeyCode::LEFTSHIFT);
    t[0x14] = E::key(KeyCode::LEFTCTRL);
    t[0x15] = E::glyph(KeyCode::Q, b'q', b'Q');
    t[0x16] = E::glyph(KeyCode::KEY_1, b'1', b'!');
    t[0x1A] = E::glyph(KeyCode::Z, b'z', b'Z');
    t[0x1B] = E::glyph(KeyCode::S, b's', b'S');
    t[0x1C] = E::glyph(KeyCode::A, b'a', b'A');
    t[0x1D] = E::glyph(KeyCode::W, b'w', b'W');
    t[0x1E] = E::glyph(KeyCode::KEY_2, b'2', b'@');
    t[0x21] = E::glyph(KeyCode::C, b'c', b'C');
    t[0x22] = E::glyph(KeyCode::X, b'x', b'X');
    t[0x23] = E::glyph(KeyCode::D, b'd', b'D');
    t[0x24] = E::glyph(KeyCode::E, b'e', b'E');
    t[0x25] = E::glyph(KeyCode::KEY_4, b'4', b'$');
    t[0x26] = E::glyph(KeyCode::KEY_3, b'3', b'#');
    t[0x29] = E::glyph(KeyCode::SPACE, b' ', b' ');
    t[0x2A] = E::glyph(KeyCode::V, b'v', b'V');
    t[0x2B] = E::glyph(KeyCode::F, b'f', b'F');
    t[0x2C] = E::glyph(KeyCode::T, b't', b'T');
    t[0x2D] = E::glyph(KeyCode::R, b'r', b'R');
    t[0x2E] = E::glyph(KeyCode::KEY_5, b'5', b'%');
    t[0x31] = E::glyph(KeyCode::N, b'n', b'N');
    t[0x32] = E::glyph(KeyCode::B, b'b', b'B');
    t[0x33] = E::glyph(KeyCode::H, b'h', b'H');
    t[0x34] = E::glyph(KeyCode::G, b'g', b'G');
    t[0x35] = E::glyph(KeyCode::Y, b'y', b'Y');
    t[0x36] = E::glyph(KeyCode::KEY_6, b'6', b'^');
    t[0x3A] = E::glyph(KeyCode::M, b'm', b'M');
    t[0x3B] = E::glyph(KeyCode::J, b'j', b'J');
    t[0x3C] = E::glyph(KeyCode::U, b'u', b'U');
    t[0x3D] = E::glyph(KeyCode::KEY_7, b'7', b'&');
    t[0x3E] = E::glyph(KeyCode::KEY_8, b'8', b'*');
    t[0x41] = E::glyph(KeyCode::COMMA, b',', b'<');
    t[0x42] = E::glyph(KeyCode::K, b'k', b'K');
    t[0x43] = E::glyph(KeyCode::I, b'i', b'I');
    t[0x44] = E::glyph(KeyCode::O, b'o', b'O');
    t[0x45] = E::glyph(KeyCode::KEY_0, b'0', b')');
    t[0x46] = E::glyph(KeyCode::KEY_9, b'9', b'(');
    t[0x49] = E::glyph(KeyCode::DOT, b'.', b'>');
    t[0x4A] = E::glyph(KeyCode::SLASH, b'/', b'?');
    t[0x4B] = E::glyph(KeyCode::L, b'l', b'L');
    t[0x4C] = E::glyph(KeyCode::SEMICOLON, b';', b':');
    t[0x4D] = E::glyph(KeyCode::P, b'p', b'P');
    t[0x4E] = E::glyph(KeyCode::MINUS, b'-', b'_');
    t[0x52] = E::glyph(KeyCode::APOSTROPHE, b'\'', b'"');
    t[0x54] = E::glyph(KeyCode::LEFTBRACE, b'[', b'{');
    t[0x55] = E::glyph(KeyCode::EQUAL, b'=', b'+');
    t[0x58] = E::key(KeyCode::CAPSLOCK);
    t[0x59] = E::key(KeyCode::RIGHTSHIFT);
    t[0x5A] = E::glyph(KeyCode::ENTER, b'\r', b'\r');
    t[0x5B] = E::glyph(KeyCode::RIGHTBRACE, b']', b'}');
    t[0x5D] = E::glyph(KeyCode::BACKSLASH, b'\\', b'|');
    t[0x61] = E::glyph(KeyCode::KEY_102ND, b'\\', b'|');
    t[0x66] = E::glyph(KeyCode::BACKSPACE, 0x08, 0x08);
    t[0x69] = E::glyph(KeyCode::KP1, b'1', b'1');
    t[0x6B] = E::glyph(KeyCode::KP4, b'4', b'4');
    t[0x6C] = E::glyph(KeyCode::KP7, b'7', b'7');
    t[0x70] = E::glyph(KeyCode::KP0, b'0', b'0');
    t[0x71] = E::glyph(KeyCode::KPDOT, b'.', b'.');
    t[0x72] = E::glyph(KeyCode::KP2, b'2', b'2');
    t[0x73] = E::glyph(KeyCode::KP5, b'5', b'5');
    t[0x74] = E::glyph(KeyCode::KP6, b'6', b'6');
    t[0x75] = E::glyph(KeyCode::KP8, b'8', b'8');
    t[0x76] = E::glyph(KeyCode::ESC, 0x1B, 0x1B);
    t[0x77] = E::key(KeyCode::NUMLOCK);
    t[0x78] = E::key(KeyCode::F11);
    t[0x79] = E::glyph(KeyCode::KPPLUS, b'+', b'+');
    t[0x7A] = E::glyph(KeyCode::KP3, b'3', b'3');
    t[0x7B] = E::glyph(KeyCode::KPMINUS, b'-', b'-');
    t[0x7C] = E::glyph(KeyCode::KPASTERISK, b'*', b'*');
    t[0x7D] = E::glyph(KeyCode::KP9, b'9', b'9');
    t[0x7E] = E::key(KeyCode::SCROLLLOCK);
    t[0x83] = E::key(KeyCode::F7);
    t
}

/// The US layout table, indexed by raw scancode.
pub static SCANCODES: [ScancodeEntry; TABLE_LEN] = build_table();

/// Maps raw scancodes to standard key codes.
#[derive(Debug, Clone, Copy)]
pub struct ScancodeTranslator {
    table: &'static [ScancodeEntry],
}

impl Default for ScancodeTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScancodeTranslator {
    /// Translator over the built-in US table.
    pub const fn new() -> Self {
        Self { table: &SCANCODES }
    }

    /// Translator over a custom table.
    pub const fn with_table(table: &'static [ScancodeEntry]) -> Self {
        Self { table }
    }

    /// Table row for a raw code. The release bit and anything above the
    /// low byte are ignored; codes past the table end have no row.
    pub fn entry(&self, raw: u32) -> Option<&'static ScancodeEntry> {
        self.table.get((raw & 0xFF) as usize)
    }

    /// Standard key code for `raw`, or `None` if it is unused or suppressed.
    ///
    /// `key_up` only annotates the trace; direction is never inferred here.
    pub fn translate(&self, raw: u32, key_up: bool) -> Option<KeyCode> {
        let entry = self.entry(raw)?;
        if entry.code == SUPPRESSED {
            debug!("keyb: caps lock {} ignored", if key_up { "up" } else { "down" });
            return None;
        }
        if entry.code.is_reserved() {
            debug!("keyb: scancode {:#04x} not translated", raw & 0xFF);
            return None;
        }
        Some(entry.code)
    }

    /// Decodes one FIFO data word into a key event.
    pub fn decode(&self, word: u32) -> Option<KeyEvent> {
        let key_up = word & KEY_RELEASE != 0;
        let code = self.translate(word, key_up)?;
        Some(KeyEvent {
            code,
            pressed: !key_up,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_past_the_table_translate_to_nothing() {
        let t = ScancodeTranslator::new();
        for raw in TABLE_LEN as u32..=0xFF {
            assert_eq!(t.translate(raw, false), None);
            assert_eq!(t.translate(raw | KEY_RELEASE, true), None);
        }
    }

    #[test]
    fn every_raw_code_is_safe() {
        let t = ScancodeTranslator::new();
        for raw in 0..=0x3FFu32 {
            if let Some(code) = t.translate(raw, false) {
                assert!(!code.is_reserved());
                assert!(code.as_u8() <= KeyCode::MAX);
            }
        }
    }

    #[test]
    fn caps_lock_is_suppressed_both_ways() {
        let t = ScancodeTranslator::new();
        assert_eq!(t.entry(0x58).map(|e| e.code), Some(KeyCode::CAPSLOCK));
        assert_eq!(t.decode(0x58), None);
        assert_eq!(t.decode(0x58 | KEY_RELEASE), None);
    }

    #[test]
    fn release_bit_selects_direction() {
        let t = ScancodeTranslator::new();
        assert_eq!(t.decode(0x1C), Some(KeyEvent::press(KeyCode::A)));
        assert_eq!(t.decode(0x1C | KEY_RELEASE), Some(KeyEvent::release(KeyCode::A)));
    }

    #[test]
    fn trace_glyph_and_emitted_code_share_a_row() {
        let t = ScancodeTranslator::new();
        for raw in 0..TABLE_LEN as u32 {
            for word in [raw, raw | KEY_RELEASE] {
                let entry = t.entry(word).expect("inside table");
                let expected = (!entry.code.is_reserved() && entry.code != SUPPRESSED)
                    .then_some(entry.code);
                assert_eq!(t.decode(word).map(|e| e.code), expected);
            }
        }
    }

    #[test]
    fn letters_carry_both_cases() {
        let entry = SCANCODES[0x21];
        assert_eq!(entry, ScancodeEntry::glyph(KeyCode::C, b'c', b'C'));
        assert_eq!(SCANCODES[0x16].upper, b'!');
    }

    #[test]
    fn custom_table_fixture() {
        static FIXTURE: [ScancodeEntry; 2] = [
            ScancodeEntry::NONE,
            ScancodeEntry::glyph(KeyCode::Q, b'q', b'Q'),
        ];
        let t = ScancodeTranslator::with_table(&FIXTURE);
        assert_eq!(t.translate(1, false), Some(KeyCode::Q));
        assert_eq!(t.translate(0, false), None);
        assert_eq!(t.translate(2, false), None);
    }
}
