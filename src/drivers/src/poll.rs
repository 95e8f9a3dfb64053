//! Periodic servicing of polled devices.
//!
//! The drivers never block or sleep: each device exposes one entry point
//! that services at most one pending item. A [`Poller`] calls those entry
//! points at a fixed interval from whatever loop or timer interrupt the
//! host provides.

use crate::input::{Bound, InputDevice, KeySink};
use alloc::vec::Vec;
use log::trace;

/// Something that can be serviced once per poll.
pub trait Pollable {
    /// Services at most one pending item. Returns whether one was consumed.
    fn service_once(&mut self) -> bool;

    /// Name used in traces.
    fn name(&self) -> &'static str;
}

impl<D: InputDevice, S: KeySink> Pollable for Bound<D, S> {
    fn service_once(&mut self) -> bool {
        Bound::service_once(self)
    }

    fn name(&self) -> &'static str {
        self.device.identity().name
    }
}

struct Slot<'a> {
    device: &'a mut dyn Pollable,
    interval: u64,
    next_due: u64,
}

/// Fixed-interval scheduler for [`Pollable`] devices.
///
/// Devices are serviced in registration order; a device that is due is
/// serviced exactly once per [`tick`](Poller::tick), however late the tick.
#[derive(Default)]
pub struct Poller<'a> {
    slots: Vec<Slot<'a>>,
}

impl<'a> Poller<'a> {
    /// Create a poller with no devices.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Adds `device`, first due at `now`, then every `interval` ticks.
    pub fn add(&mut self, device: &'a mut dyn Pollable, interval: u64, now: u64) {
        self.slots.push(Slot {
            device,
            interval: interval.max(1),
            next_due: now,
        });
    }

    /// Services every device due at `now`.
    ///
    /// Returns how many of them consumed an item.
    pub fn tick(&mut self, now: u64) -> usize {
        let mut consumed = 0;
        for slot in self.slots.iter_mut().filter(|s| s.next_due <= now) {
            if slot.device.service_once() {
                trace!("poll: {} serviced", slot.device.name());
                consumed += 1;
            }
            slot.next_due = now.saturating_add(slot.interval);
        }
        consumed
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no device is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
