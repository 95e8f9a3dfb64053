//! Test infrastructure for the lowRISC drivers.
//!
//! Host-side stand-ins for the hardware and for the layers the drivers hand
//! their output to. Every double is cheap to clone and clones share state,
//! so a test can give one handle to a driver and inspect it through another.
//!
//! # Usage
//!
//! Integration tests enable the `test` feature:
//!
//! ```rust,ignore
//! use lowrisc_drivers::testutil::{MockFifo, RecordingSink};
//! ```

use crate::config::FIFO_EMPTY;
use crate::input::KeySink;
use crate::logger;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use log::LevelFilter;
use lowrisc_common::{DriverError, KeyEvent};
use lowrisc_hal::{RegisterBlock, Serial, Timer};
use spin::{Mutex, Once};

/// One register access seen by a [`MockFifo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read at a byte offset.
    Read(usize),
    /// Write of a value at a byte offset.
    Write(usize, u32),
}

#[derive(Debug, Default)]
struct FifoState {
    pending: VecDeque<u32>,
    latched: u32,
    stuck: bool,
    ack_offset: usize,
    accesses: Vec<Access>,
}

/// A polled hardware FIFO.
///
/// Reading offset 0 returns the last popped entry with bit 9 clear while more
/// entries are pending. Writing the pop offset moves the next entry into the
/// data latch. Other writes are only recorded.
#[derive(Debug, Clone, Default)]
pub struct MockFifo {
    state: Arc<Mutex<FifoState>>,
}

impl MockFifo {
    /// A FIFO pre-loaded with `entries`, popped by writes to offset 0.
    pub fn new(entries: &[u32]) -> Self {
        Self::with_ack_offset(entries, 0)
    }

    /// A FIFO pre-loaded with `entries`, popped by writes to `ack_offset`.
    pub fn with_ack_offset(entries: &[u32], ack_offset: usize) -> Self {
        let state = FifoState {
            pending: entries.iter().copied().collect(),
            ack_offset,
            ..FifoState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A FIFO whose status never reports empty and always yields `value`.
    pub fn stuck(value: u32) -> Self {
        let fifo = Self::new(&[]);
        {
            let mut state = fifo.state.lock();
            state.stuck = true;
            state.latched = value;
        }
        fifo
    }

    /// Queue another entry.
    pub fn push(&self, entry: u32) {
        self.state.lock().pending.push_back(entry);
    }

    /// Whether no entries are pending.
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock();
        !state.stuck && state.pending.is_empty()
    }

    /// Every access so far, in order.
    pub fn accesses(&self) -> Vec<Access> {
        self.state.lock().accesses.clone()
    }

    /// Every write so far as `(offset, value)`.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state
            .lock()
            .accesses
            .iter()
            .filter_map(|a| match *a {
                Access::Write(offset, value) => Some((offset, value)),
                Access::Read(_) => None,
            })
            .collect()
    }

    /// Values written at `offset`.
    pub fn written_at(&self, offset: usize) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|&(o, _)| o == offset)
            .map(|(_, v)| v)
            .collect()
    }
}

impl RegisterBlock for MockFifo {
    fn read32(&mut self, offset: usize) -> u32 {
        let mut state = self.state.lock();
        state.accesses.push(Access::Read(offset));
        if offset != 0 {
            return u32::MAX;
        }
        let empty = !state.stuck && state.pending.is_empty();
        state.latched | if empty { FIFO_EMPTY } else { 0 }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let mut state = self.state.lock();
        state.accesses.push(Access::Write(offset, value));
        if offset == state.ack_offset && !state.stuck {
            if let Some(next) = state.pending.pop_front() {
                state.latched = next;
            }
        }
    }
}

#[derive(Debug, Default)]
struct SinkState {
    events: Vec<KeyEvent>,
    syncs: usize,
    reject: usize,
}

/// A [`KeySink`] that records what it accepts.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` events.
    pub fn reject_next(&self, count: usize) {
        self.state.lock().reject = count;
    }

    /// Accepted events, in delivery order.
    pub fn events(&self) -> Vec<KeyEvent> {
        self.state.lock().events.clone()
    }

    /// Number of sync markers received.
    pub fn syncs(&self) -> usize {
        self.state.lock().syncs
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.events.clear();
        state.syncs = 0;
    }
}

impl KeySink for RecordingSink {
    fn report(&mut self, event: KeyEvent) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.reject > 0 {
            state.reject -= 1;
            return Err(DriverError::SinkRejected);
        }
        state.events.push(event);
        Ok(())
    }

    fn sync(&mut self) {
        self.state.lock().syncs += 1;
    }
}

#[derive(Debug, Default)]
struct SerialState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

/// A scripted serial port.
#[derive(Debug, Clone, Default)]
pub struct MockSerial {
    state: Arc<Mutex<SerialState>>,
}

impl MockSerial {
    /// A port with nothing to receive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for `read_byte`.
    pub fn feed(&self, bytes: &[u8]) {
        self.state.lock().rx.extend(bytes.iter().copied());
    }

    /// Everything written so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.lock().tx.clone()
    }
}

impl Serial for MockSerial {
    fn write_byte(&mut self, byte: u8) {
        self.state.lock().tx.push(byte);
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.state.lock().rx.pop_front()
    }
}

/// A timer that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimer {
    ticks: AtomicU64,
}

impl ManualTimer {
    /// A timer at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `ticks`.
    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl Timer for ManualTimer {
    fn current_ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

static LOG_SERIAL: Once<MockSerial> = Once::new();

/// Everything the global logger has written, shared by all tests in a binary.
#[derive(Debug, Clone)]
pub struct LogCapture {
    serial: MockSerial,
}

impl LogCapture {
    /// Installs the serial logger over a [`MockSerial`] at trace level.
    ///
    /// The first call installs it; later calls return handles to the same
    /// capture.
    pub fn install() -> Self {
        let serial = LOG_SERIAL.call_once(|| {
            let serial = MockSerial::new();
            let _ = logger::init(serial.clone(), LevelFilter::Trace);
            serial
        });
        Self {
            serial: serial.clone(),
        }
    }

    /// Logged lines so far, without line terminators.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.serial.transmitted())
            .split("\r\n")
            .map(String::from)
            .collect()
    }

    /// Whether `line` was logged verbatim.
    pub fn contains(&self, line: &str) -> bool {
        self.lines().iter().any(|l| l == line)
    }
}
