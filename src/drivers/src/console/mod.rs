//! Text-mode video console (`lowrisc-vga`).
//!
//! - [`vga`]: the character grid, its bounds checks and the shadow echo
//!
//! The global console lives behind a spinlock so that structural changes
//! (scrolling) and single-cell writes never interleave.

pub mod vga;

pub use vga::{ShadowSink, TextConsole, COLUMNS, PAGE_CELLS, ROWS};

use crate::mmio::MmioCells;
use core::fmt::{self, Write};
use lowrisc_common::DriverError;
use spin::{Mutex, Once};

/// Global console instance, set once the text page has been mapped.
pub static CONSOLE: Once<Mutex<TextConsole<'static, MmioCells>>> = Once::new();

/// Installs the global console.
///
/// Fails with [`DriverError::AlreadyInitialized`] if one is already installed.
pub fn install(console: TextConsole<'static, MmioCells>) -> Result<(), DriverError> {
    let mut installed = false;
    CONSOLE.call_once(|| {
        installed = true;
        Mutex::new(console)
    });
    if installed {
        Ok(())
    } else {
        Err(DriverError::AlreadyInitialized)
    }
}

/// Runs `f` with the global console locked.
///
/// Returns `None` if no console is installed.
pub fn with_console<T>(f: impl FnOnce(&mut TextConsole<'static, MmioCells>) -> T) -> Option<T> {
    CONSOLE.get().map(|console| f(&mut console.lock()))
}

/// Prints to the text console without a newline.
#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the text console with a newline.
#[macro_export]
macro_rules! console_println {
    () => ($crate::console_print!("\n"));
    ($($arg:tt)*) => ($crate::console_print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    with_console(|console| {
        let _ = console.write_fmt(args);
    });
}
