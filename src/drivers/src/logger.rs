//! `log` backend writing to a serial console.
//!
//! Records are formatted as `[LEVEL] target: message` and written through
//! whatever [`Serial`] was installed by [`init`]. Until then, records and
//! [`serial_print!`](crate::serial_print) output are discarded.

use alloc::boxed::Box;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record};
use lowrisc_common::DriverError;
use lowrisc_hal::Serial;
use spin::Mutex;

type Sink = Box<dyn Serial + Send>;

struct SerialLogger {
    out: Mutex<Option<Sink>>,
}

static LOGGER: SerialLogger = SerialLogger {
    out: Mutex::new(None),
};

/// Adapts a [`Serial`] to `fmt::Write`.
struct SerialWriter<'a>(&'a mut dyn Serial);

impl Write for SerialWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.write_byte(b'\r');
            }
            self.0.write_byte(byte);
        }
        Ok(())
    }
}

/// Formats one record onto `out`.
pub fn write_record(out: &mut dyn Serial, record: &Record) {
    let _ = writeln!(
        SerialWriter(out),
        "[{:<5}] {}: {}",
        record.level(),
        record.target(),
        record.args()
    );
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(out) = self.out.lock().as_mut() {
            write_record(out.as_mut(), record);
        }
    }

    fn flush(&self) {}
}

/// Installs `sink` as the destination of all log records.
///
/// Can only succeed once; later calls return [`DriverError::AlreadyInitialized`].
pub fn init(sink: impl Serial + Send + 'static, level: LevelFilter) -> Result<(), DriverError> {
    log::set_logger(&LOGGER).map_err(|_| DriverError::AlreadyInitialized)?;
    *LOGGER.out.lock() = Some(Box::new(sink));
    log::set_max_level(level);
    Ok(())
}

/// Prints to the log console without a newline.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::logger::_print(format_args!($($arg)*))
    };
}

/// Prints to the log console with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    if let Some(out) = LOGGER.out.lock().as_mut() {
        let _ = SerialWriter(out.as_mut()).write_fmt(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{LogCapture, MockSerial};
    use log::Level;

    #[test]
    fn record_layout() {
        let serial = MockSerial::new();
        let mut out = serial.clone();
        write_record(
            &mut out,
            &Record::builder()
                .level(Level::Warn)
                .target("vga")
                .args(format_args!("out of range write at ({}, {})", 31, 0))
                .build(),
        );

        assert_eq!(
            serial.transmitted(),
            b"[WARN ] vga: out of range write at (31, 0)\r\n"
        );
    }

    #[test]
    fn init_succeeds_only_once() {
        let log = LogCapture::install();
        assert_eq!(
            init(MockSerial::new(), LevelFilter::Off),
            Err(DriverError::AlreadyInitialized)
        );

        log::info!("sink kept after refused init");
        assert!(log.contains("[INFO ] lowrisc_drivers::logger::tests: sink kept after refused init"));
    }

    #[test]
    fn serial_println_reaches_the_sink() {
        let log = LogCapture::install();
        crate::serial_println!("uart at {:#x}", 0x4100_2000);
        assert!(log.contains("uart at 0x41002000"));
    }
}
