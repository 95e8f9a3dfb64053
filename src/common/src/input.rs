//! Standardized key identifiers and the events built from them.
//!
//! Key codes follow the PC/AT set 1 numbering, which is also the numbering
//! used by the host input layer, so a code can be handed over unchanged.

use bitflags::bitflags;
use core::fmt;

/// A layout-independent logical key identifier in the range 0–127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyCode(u8);

impl KeyCode {
    /// Highest valid code.
    pub const MAX: u8 = 127;

    /// Creates a key code, rejecting values above [`KeyCode::MAX`].
    pub const fn new(code: u8) -> Option<Self> {
        if code <= Self::MAX {
            Some(KeyCode(code))
        } else {
            None
        }
    }

    /// Returns the numeric code.
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Code 0 means "no key" and is never reported.
    pub const fn is_reserved(self) -> bool {
        self.0 == 0
    }

    pub const RESERVED: KeyCode = KeyCode(0);
    pub const ESC: KeyCode = KeyCode(0x01);
    pub const KEY_1: KeyCode = KeyCode(0x02);
    pub const KEY_2: KeyCode = KeyCode(0x03);
    pub const KEY_3: KeyCode = KeyCode(0x04);
    pub const KEY_4: KeyCode = KeyCode(0x05);
    pub const KEY_5: KeyCode = KeyCode(0x06);
    pub const KEY_6: KeyCode = KeyCode(0x07);
    pub const KEY_7: KeyCode = KeyCode(0x08);
    pub const KEY_8: KeyCode = KeyCode(0x09);
    pub const KEY_9: KeyCode = KeyCode(0x0A);
    pub const KEY_0: KeyCode = KeyCode(0x0B);
    pub const MINUS: KeyCode = KeyCode(0x0C);
    pub const EQUAL: KeyCode = KeyCode(0x0D);
    pub const BACKSPACE: KeyCode = KeyCode(0x0E);
    pub const TAB: KeyCode = KeyCode(0x0F);
    pub const Q: KeyCode = KeyCode(0x10);
    pub const W: KeyCode = KeyCode(0x11);
    pub const E: KeyCode = KeyCode(0x12);
    pub const R: KeyCode = KeyCode(0x13);
    pub const T: KeyCode = KeyCode(0x14);
    pub const Y: KeyCode = KeyCode(0x15);
    pub const U: KeyCode = KeyCode(0x16);
    pub const I: KeyCode = KeyCode(0x17);
    pub const O: KeyCode = KeyCode(0x18);
    pub const P: KeyCode = KeyCode(0x19);
    pub const LEFTBRACE: KeyCode = KeyCode(0x1A);
    pub const RIGHTBRACE: KeyCode = KeyCode(0x1B);
    pub const ENTER: KeyCode = KeyCode(0x1C);
    pub const LEFTCTRL: KeyCode = KeyCode(0x1D);
    pub const A: KeyCode = KeyCode(0x1E);
    pub const S: KeyCode = KeyCode(0x1F);
    pub const D: KeyCode = KeyCode(0x20);
    pub const F: KeyCode = KeyCode(0x21);
    pub const G: KeyCode = KeyCode(0x22);
    pub const H: KeyCode = KeyCode(0x23);
    pub const J: KeyCode = KeyCode(0x24);
    pub const K: KeyCode = KeyCode(0x25);
    pub const L: KeyCode = KeyCode(0x26);
    pub const SEMICOLON: KeyCode = KeyCode(0x27);
    pub const APOSTROPHE: KeyCode = KeyCode(0x28);
    pub const GRAVE: KeyCode = KeyCode(0x29);
    pub const LEFTSHIFT: KeyCode = KeyCode(0x2A);
    pub const BACKSLASH: KeyCode = KeyCode(0x2B);
    pub const Z: KeyCode = KeyCode(0x2C);
    pub const X: KeyCode = KeyCode(0x2D);
    pub const C: KeyCode = KeyCode(0x2E);
    pub const V: KeyCode = KeyCode(0x2F);
    pub const B: KeyCode = KeyCode(0x30);
    pub const N: KeyCode = KeyCode(0x31);
    pub const M: KeyCode = KeyCode(0x32);
    pub const COMMA: KeyCode = KeyCode(0x33);
    pub const DOT: KeyCode = KeyCode(0x34);
    pub const SLASH: KeyCode = KeyCode(0x35);
    pub const RIGHTSHIFT: KeyCode = KeyCode(0x36);
    pub const KPASTERISK: KeyCode = KeyCode(0x37);
    pub const LEFTALT: KeyCode = KeyCode(0x38);
    pub const SPACE: KeyCode = KeyCode(0x39);
    pub const CAPSLOCK: KeyCode = KeyCode(0x3A);
    pub const F1: KeyCode = KeyCode(0x3B);
    pub const F2: KeyCode = KeyCode(0x3C);
    pub const F3: KeyCode = KeyCode(0x3D);
    pub const F4: KeyCode = KeyCode(0x3E);
    pub const F5: KeyCode = KeyCode(0x3F);
    pub const F6: KeyCode = KeyCode(0x40);
    pub const F7: KeyCode = KeyCode(0x41);
    pub const F8: KeyCode = KeyCode(0x42);
    pub const F9: KeyCode = KeyCode(0x43);
    pub const F10: KeyCode = KeyCode(0x44);
    pub const NUMLOCK: KeyCode = KeyCode(0x45);
    pub const SCROLLLOCK: KeyCode = KeyCode(0x46);
    pub const KP7: KeyCode = KeyCode(0x47);
    pub const KP8: KeyCode = KeyCode(0x48);
    pub const KP9: KeyCode = KeyCode(0x49);
    pub const KPMINUS: KeyCode = KeyCode(0x4A);
    pub const KP4: KeyCode = KeyCode(0x4B);
    pub const KP5: KeyCode = KeyCode(0x4C);
    pub const KP6: KeyCode = KeyCode(0x4D);
    pub const KPPLUS: KeyCode = KeyCode(0x4E);
    pub const KP1: KeyCode = KeyCode(0x4F);
    pub const KP2: KeyCode = KeyCode(0x50);
    pub const KP3: KeyCode = KeyCode(0x51);
    pub const KP0: KeyCode = KeyCode(0x52);
    pub const KPDOT: KeyCode = KeyCode(0x53);
    pub const KEY_102ND: KeyCode = KeyCode(0x56);
    pub const F11: KeyCode = KeyCode(0x57);
    pub const F12: KeyCode = KeyCode(0x58);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// A single key-state transition handed to the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    /// Which key changed state.
    pub code: KeyCode,
    /// True for press, false for release.
    pub pressed: bool,
}

impl KeyEvent {
    /// A key-down event.
    pub const fn press(code: KeyCode) -> Self {
        Self { code, pressed: true }
    }

    /// A key-up event.
    pub const fn release(code: KeyCode) -> Self {
        Self {
            code,
            pressed: false,
        }
    }
}

bitflags! {
    /// Modifiers synthesized for a single decoded byte.
    ///
    /// These are never sustained state: they are inferred per byte and
    /// released within the same decode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL  = 1 << 0;
        const SHIFT = 1 << 1;
    }
}

impl Modifiers {
    /// Modifier keys in acquisition order, paired with the flag that selects them.
    pub const KEYS: [(Modifiers, KeyCode); 2] = [
        (Modifiers::CTRL, KeyCode::LEFTCTRL),
        (Modifiers::SHIFT, KeyCode::LEFTSHIFT),
    ];
}

/// Result of translating one serial byte into a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Translation {
    /// The byte names a physical key, possibly with synthesized modifiers.
    Mapped {
        /// The primary key.
        code: KeyCode,
        /// Modifiers to bracket the key with.
        modifiers: Modifiers,
    },
    /// The (masked) byte has no key on the fixed layout.
    Unmapped(u8),
}

impl Translation {
    /// Whether a control modifier was synthesized.
    pub fn control_modifier(&self) -> bool {
        matches!(self, Translation::Mapped { modifiers, .. } if modifiers.contains(Modifiers::CTRL))
    }

    /// Whether a shift modifier was synthesized.
    pub fn shift_modifier(&self) -> bool {
        matches!(self, Translation::Mapped { modifiers, .. } if modifiers.contains(Modifiers::SHIFT))
    }

    /// The primary key code, if the byte was mapped.
    pub fn code(&self) -> Option<KeyCode> {
        match self {
            Translation::Mapped { code, .. } => Some(*code),
            Translation::Unmapped(_) => None,
        }
    }
}
