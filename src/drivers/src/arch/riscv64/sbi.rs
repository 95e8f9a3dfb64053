//! Legacy SBI console calls.

use core::arch::asm;
use lowrisc_hal::Serial;

/// Legacy extension: write one character.
const CONSOLE_PUTCHAR: usize = 0x01;
/// Legacy extension: read one character, negative when none is pending.
const CONSOLE_GETCHAR: usize = 0x02;

#[inline]
fn sbi_call_legacy(eid: usize, arg0: usize) -> isize {
    let ret: isize;
    // SAFETY: legacy console calls take one argument in a0, return in a0 and
    // touch no memory owned by the kernel.
    unsafe {
        asm!(
            "ecall",
            inlateout("a0") arg0 as isize => ret,
            in("a7") eid,
            options(nostack),
        );
    }
    ret
}

/// The firmware console reached through SBI.
///
/// Usable before any device has been probed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SbiConsole;

impl Serial for SbiConsole {
    fn write_byte(&mut self, byte: u8) {
        sbi_call_legacy(CONSOLE_PUTCHAR, usize::from(byte));
    }

    fn read_byte(&mut self) -> Option<u8> {
        let ret = sbi_call_legacy(CONSOLE_GETCHAR, 0);
        (ret >= 0).then_some(ret as u8)
    }
}
