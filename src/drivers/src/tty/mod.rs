//! Serial console tty bridge (`lowrisc-uart`).
//!
//! Characters from the platform console are pushed into a tty flip buffer
//! while the tty is open; tty writes go straight back out to the platform
//! console. [`TtyBridge::service`] is safe to call from both the interrupt
//! handler and a poller: the only shared critical section is the flip
//! buffer insert plus push.
//!
//! - [`flip`]: the default flip buffer and its async reader

pub mod flip;

pub use flip::{FlipBuffer, TtyStream};

use crate::poll::Pollable;
use crate::registry::DeviceRegistry;
use core::sync::atomic::{AtomicU32, Ordering};
use log::{info, trace};
use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};
use lowrisc_hal::Serial;
use spin::Mutex;

/// Space always advertised to writers.
pub const WRITE_ROOM: usize = 1024;

/// Receiving end of the tty (the line discipline's flip buffer).
pub trait TtyPort {
    /// Queue one received character. Returns false if it was dropped.
    fn insert_flip_char(&mut self, ch: u8) -> bool;
    /// Make queued characters visible to the reader.
    fn flip_buffer_push(&mut self);
}

/// Bridges a platform serial console to a tty.
pub struct TtyBridge<S, P> {
    id: DeviceId,
    console: Mutex<S>,
    port: Mutex<P>,
    open_count: AtomicU32,
}

impl<S: Serial, P: TtyPort> TtyBridge<S, P> {
    /// Claims `region` and binds `console` to `port`.
    pub fn probe(
        registry: &mut DeviceRegistry,
        region: MemRegion,
        console: S,
        port: P,
    ) -> Result<Self, DriverError> {
        let id = registry.claim(DeviceKind::Uart, region)?;
        info!("uart: console bridge at {}", region);
        Ok(Self {
            id,
            console: Mutex::new(console),
            port: Mutex::new(port),
            open_count: AtomicU32::new(0),
        })
    }

    /// Registry id of this bridge.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Opens the tty.
    pub fn open(&self) {
        self.open_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Closes the tty. Closing more often than opening is reported but harmless.
    pub fn close(&self) -> Result<(), DriverError> {
        self.open_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| DriverError::NotOpen)
    }

    /// Whether at least one opener is active.
    pub fn is_open(&self) -> bool {
        self.open_count.load(Ordering::Acquire) > 0
    }

    /// Moves at most one character from the console to the tty.
    ///
    /// Returns whether a character was read, whether or not it was delivered.
    pub fn service(&self) -> bool {
        let Some(ch) = self.console.lock().read_byte() else {
            return false;
        };
        if ch == 0 || !self.is_open() {
            trace!("uart: discarding 0x{:02x}", ch);
            return true;
        }

        let mut port = self.port.lock();
        if !port.insert_flip_char(ch) {
            trace!("uart: tty refused 0x{:02x}", ch);
        }
        port.flip_buffer_push();
        true
    }

    /// Sends `buf` to the console, 7 bits per character.
    pub fn write(&self, buf: &[u8]) -> usize {
        let mut console = self.console.lock();
        for &byte in buf {
            console.write_byte(byte & 0x7F);
        }
        buf.len()
    }

    /// Space available for [`write`](Self::write).
    pub fn write_room(&self) -> usize {
        WRITE_ROOM
    }
}

impl<S: Serial, P: TtyPort> Pollable for TtyBridge<S, P> {
    fn service_once(&mut self) -> bool {
        self.service()
    }

    fn name(&self) -> &'static str {
        DeviceKind::Uart.driver_name()
    }
}
