//! Polled hardware FIFO behind a status/data register pair.
//!
//! Every adapter in this crate talks to its device the same way: read the
//! status word, and if the "empty" bit is clear, write the pop register to
//! advance the read pointer and read the data word again. The probe read and
//! the post-pop read may be served from different storage cells, so the pop
//! write always sits between them.

use crate::config::{FifoLayout, FIFO_EMPTY};
use log::{trace, warn};
use lowrisc_hal::RegisterBlock;

/// Reader for one polled FIFO.
pub struct FifoReader<R> {
    regs: R,
    layout: FifoLayout,
}

impl<R: RegisterBlock> FifoReader<R> {
    /// Wraps a register window with the given layout.
    pub fn new(regs: R, layout: FifoLayout) -> Self {
        Self { regs, layout }
    }

    /// Whether the status register reports at least one pending entry.
    ///
    /// Has no side effect on the FIFO.
    pub fn has_data(&mut self) -> bool {
        self.regs.read32(self.layout.status_offset) & FIFO_EMPTY == 0
    }

    /// Pops one entry, returning its masked data word.
    ///
    /// Returns `None` without touching the FIFO when it is empty.
    pub fn poll(&mut self) -> Option<u32> {
        if !self.has_data() {
            trace!("fifo: empty");
            return None;
        }
        // The written value is ignored by the hardware; the write itself pops.
        self.regs.write32(self.layout.ack_offset, 0);
        let data = self.regs.read32(self.layout.status_offset) & self.layout.data_mask;
        Some(data)
    }

    /// Discards pending entries, popping at most `limit` of them.
    ///
    /// Returns the number of entries discarded. Hitting the limit means the
    /// status bit never cleared; that is reported and otherwise ignored.
    pub fn drain(&mut self, limit: usize) -> usize {
        let mut discarded = 0;
        while discarded < limit && self.has_data() {
            self.regs.write32(self.layout.ack_offset, 0);
            discarded += 1;
        }
        if discarded == limit && self.has_data() {
            warn!("fifo: still not empty after discarding {} entries", limit);
        }
        discarded
    }

    /// Direct access to the underlying register window.
    pub fn registers(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Gives the register window back.
    pub fn into_inner(self) -> R {
        self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Access, MockFifo};

    #[test]
    fn empty_fifo_has_no_side_effect() {
        let mut fifo = MockFifo::new(&[]);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::KEYBOARD);

        assert_eq!(reader.poll(), None);
        assert_eq!(reader.poll(), None);
        assert!(fifo.writes().is_empty());
    }

    #[test]
    fn pop_happens_between_probe_and_fetch() {
        let mut fifo = MockFifo::new(&[0x1C]);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::KEYBOARD);

        assert_eq!(reader.poll(), Some(0x1C));
        assert_eq!(
            fifo.accesses(),
            &[Access::Read(0), Access::Write(0, 0), Access::Read(0)]
        );
    }

    #[test]
    fn fake_keyboard_pops_at_its_own_offset() {
        let mut fifo = MockFifo::with_ack_offset(&[b'a' as u32 | 0x80], 0x1000);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::FAKE_KEYBOARD);

        assert_eq!(reader.poll(), Some(b'a' as u32));
        assert_eq!(fifo.writes(), [(0x1000, 0)]);
        assert!(fifo.is_empty());
    }

    #[test]
    fn entries_come_out_once_in_order() {
        let mut fifo = MockFifo::new(&[1, 2, 3]);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::KEYBOARD);

        assert_eq!(reader.poll(), Some(1));
        assert_eq!(reader.poll(), Some(2));
        assert_eq!(reader.poll(), Some(3));
        assert_eq!(reader.poll(), None);
    }

    #[test]
    fn drain_is_bounded_on_stuck_hardware() {
        let mut fifo = MockFifo::stuck(0x55);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::KEYBOARD);

        assert_eq!(reader.drain(8), 8);
    }

    #[test]
    fn drain_stops_when_empty() {
        let mut fifo = MockFifo::new(&[1, 2]);
        let mut reader = FifoReader::new(&mut fifo, FifoLayout::KEYBOARD);

        assert_eq!(reader.drain(64), 2);
        assert_eq!(reader.poll(), None);
    }
}
