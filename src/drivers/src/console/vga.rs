//! Character grid on the lowRISC text page.
//!
//! The page is 4096 16-bit cells; the visible grid is 128 columns by 31
//! rows at the start of it. Each cell holds a glyph in the low byte and an
//! attribute in the high byte.

use crate::config::DriverConfig;
use crate::input::ShadowConsole;
use crate::registry::DeviceRegistry;
use core::fmt;
use log::{info, warn};
use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};
use lowrisc_hal::{CellBuffer, Console, RegisterBlock, Serial};

/// Number of columns in the text grid.
pub const COLUMNS: usize = 128;

/// Number of rows in the text grid.
pub const ROWS: usize = 31;

/// Number of cells in the mapped text page.
pub const PAGE_CELLS: usize = 4096;

/// Default attribute: light grey on black.
const DEFAULT_ATTRIBUTE: u8 = 0x07;

/// Glyph shown for bytes that have no printable form.
const PLACEHOLDER: u8 = 0xFE;

const BACKSPACE: u8 = 0x08;

/// Receiver of the serial rendering of console output.
pub trait ShadowSink: Sync {
    /// Sends one character.
    fn putchar(&self, ch: u8);
}

impl<R, F> ShadowSink for ShadowConsole<R, F>
where
    R: RegisterBlock + Send,
    F: Serial + Send,
{
    fn putchar(&self, ch: u8) {
        ShadowConsole::putchar(self, ch)
    }
}

/// Approximates cursor movement on a dumb serial terminal.
///
/// Only backspace, carriage return, space and newline are available, so the
/// rendering is a best effort: full-screen programs will not look right.
struct ShadowEcho<'a> {
    sink: &'a dyn ShadowSink,
    col: isize,
    row: isize,
}

impl ShadowEcho<'_> {
    fn put(&mut self, ch: u8, row: usize, col: usize) {
        let (row, col) = (row as isize, col as isize);
        let overwrite = col == self.col;

        if overwrite {
            self.sink.putchar(BACKSPACE);
        } else if col < self.col {
            self.sink.putchar(b'\r');
        } else if col > self.col + 1 {
            self.sink.putchar(b' ');
        }
        if row > self.row {
            self.sink.putchar(b'\n');
        }
        self.sink.putchar(ch);

        if overwrite {
            self.sink.putchar(BACKSPACE);
            self.col = col - 1;
        } else {
            self.col = col;
        }
        self.row = row;
    }

    fn scrolled(&mut self) {
        self.row -= 1;
    }
}

/// Text console over a page of character cells.
pub struct TextConsole<'a, B> {
    id: Option<DeviceId>,
    cells: B,
    attribute: u8,
    /// Cursor column used by the [`Console`] writer.
    column_position: usize,
    shadow: Option<ShadowEcho<'a>>,
}

impl<'a, B: CellBuffer> TextConsole<'a, B> {
    /// Wraps a text page. The page must hold at least the visible grid.
    pub fn new(cells: B) -> Result<Self, DriverError> {
        if cells.cell_count() < COLUMNS * ROWS {
            return Err(DriverError::MapFailed);
        }
        Ok(Self {
            id: None,
            cells,
            attribute: DEFAULT_ATTRIBUTE,
            column_position: 0,
            shadow: None,
        })
    }

    /// Claims `region`, wraps its text page and blanks the grid.
    ///
    /// `shadow` is attached only when the configuration enables the echo.
    pub fn probe(
        registry: &mut DeviceRegistry,
        region: MemRegion,
        cells: B,
        config: &DriverConfig,
        shadow: Option<&'a dyn ShadowSink>,
    ) -> Result<Self, DriverError> {
        let mut console = Self::new(cells)?;
        console.id = Some(registry.claim(DeviceKind::Vga, region)?);
        info!("vga: {}x{} text console at {}", COLUMNS, ROWS, region);

        if let Some(sink) = shadow.filter(|_| config.shadow_console) {
            console = console.with_shadow(sink);
        }
        console.clear_screen();
        Ok(console)
    }

    /// Registry id, if the console was probed rather than built directly.
    pub fn id(&self) -> Option<DeviceId> {
        self.id
    }

    /// Mirrors every character put on the grid to `sink`.
    pub fn with_shadow(mut self, sink: &'a dyn ShadowSink) -> Self {
        self.shadow = Some(ShadowEcho { sink, col: 0, row: 0 });
        self
    }

    /// Name reported to the console layer.
    pub fn startup(&self) -> &'static str {
        "lowrisc device"
    }

    /// Grid size as `(columns, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (COLUMNS, ROWS)
    }

    /// Sets the attribute byte used by the [`Console`] writer.
    pub fn set_attribute(&mut self, attribute: u8) {
        self.attribute = attribute;
    }

    fn index(row: usize, col: usize) -> Result<usize, DriverError> {
        if row < ROWS && col < COLUMNS {
            Ok(row * COLUMNS + col)
        } else {
            Err(DriverError::OutOfRange { row, col })
        }
    }

    /// Writes one cell. Out-of-range targets are logged and dropped.
    pub fn write_cell(&mut self, row: usize, col: usize, glyph: u16) -> Result<(), DriverError> {
        let index = Self::index(row, col).inspect_err(|_| {
            warn!("vga: out of range write at ({}, {})", row, col);
        })?;
        self.cells.write_cell(index, glyph);
        Ok(())
    }

    /// Reads one cell of the grid.
    pub fn read_cell(&self, row: usize, col: usize) -> Option<u16> {
        Self::index(row, col).ok().map(|i| self.cells.read_cell(i))
    }

    /// Writes one cell and mirrors it to the shadow sink, if any.
    pub fn put_char(&mut self, glyph: u16, row: usize, col: usize) -> Result<(), DriverError> {
        self.write_cell(row, col, glyph)?;
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.put(glyph as u8, row, col);
        }
        Ok(())
    }

    /// Writes a run of cells along one row starting at `col`.
    ///
    /// Stops at the first cell outside the grid; returns how many were written.
    pub fn putcs(&mut self, glyphs: &[u16], row: usize, col: usize) -> usize {
        glyphs
            .iter()
            .enumerate()
            .take_while(|&(i, &glyph)| self.put_char(glyph, row, col + i).is_ok())
            .count()
    }

    /// Moves every row up by one and blanks the last row.
    pub fn scroll_up(&mut self) {
        for index in COLUMNS..COLUMNS * ROWS {
            let cell = self.cells.read_cell(index);
            self.cells.write_cell(index - COLUMNS, cell);
        }
        self.clear_row(ROWS - 1);
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.scrolled();
        }
    }

    fn clear_row(&mut self, row: usize) {
        debug_assert!(row < ROWS, "row index out of bounds");
        for col in 0..COLUMNS {
            self.cells.write_cell(row * COLUMNS + col, 0);
        }
    }

    /// Blanks the whole grid.
    pub fn clear_screen(&mut self) {
        for row in 0..ROWS {
            self.clear_row(row);
        }
        self.column_position = 0;
    }

    /// Gives the backing page back.
    pub fn into_inner(self) -> B {
        self.cells
    }

    /// Writes a single byte at the cursor on the bottom row.
    ///
    /// Handles newlines and automatic line wrapping.
    pub fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            byte => {
                if self.column_position >= COLUMNS {
                    self.new_line();
                }
                let glyph = u16::from(self.attribute) << 8 | u16::from(byte);
                let col = self.column_position;
                debug_assert!(col < COLUMNS, "column index out of bounds");
                let _ = self.put_char(glyph, ROWS - 1, col);
                self.column_position += 1;
            }
        }
    }

    fn new_line(&mut self) {
        self.scroll_up();
        self.column_position = 0;
    }
}

impl<B: CellBuffer> fmt::Write for TextConsole<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.write_byte(byte),
                _ => self.write_byte(PLACEHOLDER),
            }
        }
        Ok(())
    }
}

impl<B: CellBuffer> Console for TextConsole<'_, B> {
    fn write_str(&mut self, s: &str) {
        let _ = <Self as fmt::Write>::write_str(self, s);
    }

    fn clear(&mut self) {
        self.clear_screen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use crate::testutil::LogCapture;
    use alloc::vec::Vec;
    use spin::Mutex;

    type Page = Box<[u16; PAGE_CELLS]>;

    struct BoxedPage(Page);

    impl CellBuffer for BoxedPage {
        fn cell_count(&self) -> usize {
            PAGE_CELLS
        }

        fn read_cell(&self, index: usize) -> u16 {
            self.0[index]
        }

        fn write_cell(&mut self, index: usize, value: u16) {
            self.0[index] = value;
        }
    }

    fn console<'a>() -> TextConsole<'a, BoxedPage> {
        TextConsole::new(BoxedPage(Box::new([0; PAGE_CELLS]))).expect("page fits grid")
    }

    #[derive(Default)]
    struct Echo(Mutex<Vec<u8>>);

    impl ShadowSink for Echo {
        fn putchar(&self, ch: u8) {
            self.0.lock().push(ch);
        }
    }

    #[test]
    fn out_of_range_writes_touch_nothing() {
        let log = LogCapture::install();
        let mut con = console();
        assert_eq!(
            con.write_cell(ROWS, 0, 0x41),
            Err(DriverError::OutOfRange { row: ROWS, col: 0 })
        );
        assert_eq!(
            con.write_cell(0, COLUMNS, 0x41),
            Err(DriverError::OutOfRange { row: 0, col: COLUMNS })
        );
        assert!(con.write_cell(usize::MAX, usize::MAX, 0x41).is_err());
        assert!(log.contains("[WARN ] lowrisc_drivers::console::vga: vga: out of range write at (31, 0)"));
        assert!(log.contains("[WARN ] lowrisc_drivers::console::vga: vga: out of range write at (0, 128)"));

        let page = con.into_inner();
        assert!(page.0.iter().all(|&c| c == 0));
    }

    #[test]
    fn cells_land_row_major() {
        let mut con = console();
        con.write_cell(2, 5, 0x41).unwrap();
        con.write_cell(ROWS - 1, COLUMNS - 1, 0x42).unwrap();

        assert_eq!(con.read_cell(2, 5), Some(0x41));
        let page = con.into_inner();
        assert_eq!(page.0[2 * COLUMNS + 5], 0x41);
        assert_eq!(page.0[COLUMNS * ROWS - 1], 0x42);
    }

    #[test]
    fn scroll_moves_rows_up_and_blanks_the_last() {
        let mut con = console();
        con.write_cell(0, 0, 0x30).unwrap();
        con.write_cell(1, 3, 0x31).unwrap();
        con.write_cell(ROWS - 1, 7, 0x32).unwrap();

        con.scroll_up();

        assert_eq!(con.read_cell(0, 0), Some(0));
        assert_eq!(con.read_cell(0, 3), Some(0x31));
        assert_eq!(con.read_cell(ROWS - 2, 7), Some(0x32));
        assert!((0..COLUMNS).all(|c| con.read_cell(ROWS - 1, c) == Some(0)));
    }

    #[test]
    fn small_page_is_rejected() {
        let page = [0u16; 16];
        assert_eq!(TextConsole::new(page).err(), Some(DriverError::MapFailed));
    }

    #[test]
    fn putcs_stops_at_the_right_edge() {
        let mut con = console();
        let glyphs = [0x41u16; 4];
        assert_eq!(con.putcs(&glyphs, 0, COLUMNS - 2), 2);
        assert_eq!(con.read_cell(0, COLUMNS - 1), Some(0x41));
    }

    #[test]
    fn writer_wraps_and_scrolls() {
        let mut con = console();
        Console::write_str(&mut con, "hi\nok");

        let attr = u16::from(DEFAULT_ATTRIBUTE) << 8;
        assert_eq!(con.read_cell(ROWS - 2, 0), Some(attr | u16::from(b'h')));
        assert_eq!(con.read_cell(ROWS - 2, 1), Some(attr | u16::from(b'i')));
        assert_eq!(con.read_cell(ROWS - 1, 0), Some(attr | u16::from(b'o')));
        assert_eq!(con.read_cell(ROWS - 1, 1), Some(attr | u16::from(b'k')));
    }

    #[test]
    fn shadow_echo_follows_the_cursor() {
        let echo = Echo::default();
        let mut con = console().with_shadow(&echo);

        con.put_char(u16::from(b'a'), 0, 1).unwrap();
        con.put_char(u16::from(b'b'), 0, 2).unwrap();
        // Skipping a column renders as a space.
        con.put_char(u16::from(b'c'), 0, 4).unwrap();
        // Moving left returns to column 0 first.
        con.put_char(u16::from(b'd'), 1, 0).unwrap();

        assert_eq!(echo.0.lock().as_slice(), b"ab c\r\nd");
    }

    #[test]
    fn shadow_echo_overwrite_in_place() {
        let echo = Echo::default();
        let mut con = console().with_shadow(&echo);

        con.put_char(u16::from(b'x'), 0, 1).unwrap();
        con.put_char(u16::from(b'y'), 0, 1).unwrap();

        assert_eq!(echo.0.lock().as_slice(), b"x\x08y\x08");
    }

    #[test]
    fn shadow_echo_tracks_scrolling() {
        let echo = Echo::default();
        let mut con = console().with_shadow(&echo);

        con.put_char(u16::from(b'a'), 5, 1).unwrap();
        con.scroll_up();
        // Same screen row as before the scroll is now one row further down.
        con.put_char(u16::from(b'b'), 5, 2).unwrap();

        assert_eq!(echo.0.lock().as_slice(), b"\na\nb");
    }

    #[test]
    fn probe_honours_shadow_switch() {
        use crate::config::DriverConfig;
        use crate::registry::DeviceRegistry;

        let mut registry = DeviceRegistry::new();
        let echo = Echo::default();
        let quiet = DriverConfig {
            shadow_console: false,
            ..DriverConfig::reference()
        };
        let region = MemRegion::new(0x4100_0000, 0x2000);

        let mut con = TextConsole::probe(
            &mut registry,
            region,
            BoxedPage(Box::new([0x41; PAGE_CELLS])),
            &quiet,
            Some(&echo),
        )
        .unwrap();
        con.put_char(u16::from(b'a'), 0, 1).unwrap();

        assert!(echo.0.lock().is_empty());
        assert_eq!(con.read_cell(ROWS - 1, COLUMNS - 1), Some(0));
        assert!(registry.is_claimed(DeviceKind::Vga));
        assert!(con.id().is_some_and(|id| registry.release(id)));
        assert!(registry.is_empty());
    }

    #[test]
    fn reports_name_and_grid() {
        let con = console();
        assert_eq!(con.startup(), "lowrisc device");
        assert_eq!(con.dimensions(), (128, 31));
        assert_eq!(con.id(), None);
    }

    #[test]
    fn writer_uses_the_current_attribute() {
        let mut con = console();
        con.set_attribute(0x1F);
        fmt::Write::write_str(&mut con, "ok\n").unwrap();

        assert_eq!(con.read_cell(ROWS - 2, 0), Some(0x1F6F));
        assert_eq!(con.read_cell(ROWS - 2, 1), Some(0x1F6B));
        assert_eq!(con.read_cell(ROWS - 1, 0), Some(0));
    }
}
