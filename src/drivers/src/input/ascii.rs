//! US-ASCII byte to key translation for the serial-driven keyboard.
//!
//! The serial conduit carries characters, not key transitions, so the
//! modifiers that produced a character have to be reconstructed from the
//! character itself.

use log::debug;
use lowrisc_common::{KeyCode, Modifiers, Translation};

/// Characters typed with shift held on the US layout.
///
/// Digits and punctuation share a key with their shifted form, so this set
/// cannot be derived from ASCII case bits.
pub const SHIFTED_SYMBOLS: &[u8] = b"!\"#$%^&*<>~@+_(){}|:?";

/// Control characters Ctrl-A through Ctrl-Z.
const CONTROL_RANGE: core::ops::RangeInclusive<u8> = 1..=26;

const fn build_table() -> [KeyCode; 128] {
    let mut t = [KeyCode::RESERVED; 128];
    t[0x1B] = KeyCode::ESC;
    t[b'1' as usize] = KeyCode::KEY_1;
    t[b'!' as usize] = KeyCode::KEY_1;
    t[b'2' as usize] = KeyCode::KEY_2;
    t[b'@' as usize] = KeyCode::KEY_2;
    t[b'3' as usize] = KeyCode::KEY_3;
    t[b'#' as usize] = KeyCode::KEY_3;
    t[b'4' as usize] = KeyCode::KEY_4;
    t[b'$' as usize] = KeyCode::KEY_4;
    t[b'5' as usize] = KeyCode::KEY_5;
    t[b'%' as usize] = KeyCode::KEY_5;
    t[b'6' as usize] = KeyCode::KEY_6;
    t[b'^' as usize] = KeyCode::KEY_6;
    t[b'7' as usize] = KeyCode::KEY_7;
    t[b'&' as usize] = KeyCode::KEY_7;
    t[b'8' as usize] = KeyCode::KEY_8;
    t[b'*' as usize] = KeyCode::KEY_8;
    t[b'9' as usize] = KeyCode::KEY_9;
    t[b'(' as usize] = KeyCode::KEY_9;
    t[b'0' as usize] = KeyCode::KEY_0;
    t[b')' as usize] = KeyCode::KEY_0;
    t[b'-' as usize] = KeyCode::MINUS;
    t[b'_' as usize] = KeyCode::MINUS;
    t[b'=' as usize] = KeyCode::EQUAL;
    t[b'+' as usize] = KeyCode::EQUAL;
    t[0x7F] = KeyCode::BACKSPACE;
    t[b'\t' as usize] = KeyCode::TAB;
    t[b'[' as usize] = KeyCode::LEFTBRACE;
    t[b'{' as usize] = KeyCode::LEFTBRACE;
    t[b']' as usize] = KeyCode::RIGHTBRACE;
    t[b'}' as usize] = KeyCode::RIGHTBRACE;
    t[b'\r' as usize] = KeyCode::ENTER;
    t[b';' as usize] = KeyCode::SEMICOLON;
    t[b':' as usize] = KeyCode::SEMICOLON;
    t[b'\'' as usize] = KeyCode::APOSTROPHE;
    t[b'"' as usize] = KeyCode::APOSTROPHE;
    t[b'`' as usize] = KeyCode::GRAVE;
    t[b'~' as usize] = KeyCode::GRAVE;
    t[b'\\' as usize] = KeyCode::BACKSLASH;
    t[b'|' as usize] = KeyCode::BACKSLASH;
    t[b',' as usize] = KeyCode::COMMA;
    t[b'<' as usize] = KeyCode::COMMA;
    t[b'.' as usize] = KeyCode::DOT;
    t[b'>' as usize] = KeyCode::DOT;
    t[b'/' as usize] = KeyCode::SLASH;
    t[b'?' as usize] = KeyCode::SLASH;
    t[b' ' as usize] = KeyCode::SPACE;

    // Letters: both cases share a key.
    const LETTERS: [KeyCode; 26] = [
        KeyCode::A, KeyCode::B, KeyCode::C, KeyCode::D, KeyCode::E, KeyCode::F,
        KeyCode::G, KeyCode::H, KeyCode::I, KeyCode::J, KeyCode::K, KeyCode::L,
        KeyCode::M, KeyCode::N, KeyCode::O, KeyCode::P, KeyCode::Q, KeyCode::R,
        KeyCode::S, KeyCode::T, KeyCode::U, KeyCode::V, KeyCode::W, KeyCode::X,
        KeyCode::Y, KeyCode::Z,
    ];
    let mut i = 0;
    while i < LETTERS.len() {
        t[b'a' as usize + i] = LETTERS[i];
        t[b'A' as usize + i] = LETTERS[i];
        i += 1;
    }
    t
}

/// Key for each 7-bit character; reserved where the layout has none.
pub static ASCII_KEYS: [KeyCode; 128] = build_table();

/// Whether `ch` is typed with shift held.
pub fn is_shifted(ch: u8) -> bool {
    ch.is_ascii_uppercase() || SHIFTED_SYMBOLS.contains(&ch)
}

/// Maps serial bytes to keys plus synthesized modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiKeyTranslator;

impl AsciiKeyTranslator {
    /// Translates one raw byte from the conduit.
    pub fn translate(&self, byte: u8) -> Translation {
        let mut ch = byte & 0x7F;
        let mut modifiers = Modifiers::empty();

        // The conduit forwards the already-reduced control code; recover
        // the letter that was typed with it.
        if CONTROL_RANGE.contains(&ch) {
            modifiers |= Modifiers::CTRL;
            ch = ch + b'a' - 1;
        }

        let code = ASCII_KEYS[ch as usize];
        if code.is_reserved() {
            debug!("fake: input 0x{:x} not translated", ch);
            return Translation::Unmapped(ch);
        }

        if is_shifted(ch) {
            modifiers |= Modifiers::SHIFT;
        }
        Translation::Mapped { code, modifiers }
    }
}
