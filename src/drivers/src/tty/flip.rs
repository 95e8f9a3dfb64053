//! Receive-side flip buffer and its async stream.

use super::TtyPort;
use alloc::sync::Arc;
use core::{
    pin::Pin,
    sync::atomic::{AtomicUsize, Ordering},
    task::{Context, Poll},
};
use crossbeam_queue::ArrayQueue;
use futures_util::{stream::Stream, task::AtomicWaker};
use log::debug;

/// Default capacity of a [`FlipBuffer`].
pub const FLIP_CAPACITY: usize = 256;

/// Bounded queue of received characters.
///
/// Characters become visible to readers when the buffer is pushed.
pub struct FlipBuffer {
    queue: ArrayQueue<u8>,
    unpushed: AtomicUsize,
    waker: AtomicWaker,
}

impl FlipBuffer {
    /// Create a buffer holding up to `capacity` characters.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            unpushed: AtomicUsize::new(0),
            waker: AtomicWaker::new(),
        }
    }

    /// Create a shared buffer with the default capacity.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(FLIP_CAPACITY))
    }

    /// Add one character. A full buffer drops it.
    pub fn insert(&self, ch: u8) -> bool {
        if self.queue.push(ch).is_err() {
            debug!("tty: flip buffer full; dropping 0x{:02x}", ch);
            false
        } else {
            self.unpushed.fetch_add(1, Ordering::Relaxed);
            true
        }
    }

    /// Hand everything inserted so far to the reader.
    pub fn push(&self) {
        if self.unpushed.swap(0, Ordering::AcqRel) > 0 {
            self.waker.wake();
        }
    }

    /// Take one character, if any.
    pub fn pop(&self) -> Option<u8> {
        self.queue.pop()
    }

    /// Number of buffered characters.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// An async stream over this buffer.
    pub fn stream(self: &Arc<Self>) -> TtyStream {
        TtyStream {
            buffer: Arc::clone(self),
        }
    }
}

impl TtyPort for Arc<FlipBuffer> {
    fn insert_flip_char(&mut self, ch: u8) -> bool {
        self.insert(ch)
    }

    fn flip_buffer_push(&mut self) {
        self.push()
    }
}

/// A stream of characters received by the tty.
pub struct TtyStream {
    buffer: Arc<FlipBuffer>,
}

impl Stream for TtyStream {
    type Item = u8;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<u8>> {
        // fast path
        if let Some(ch) = self.buffer.pop() {
            return Poll::Ready(Some(ch));
        }

        self.buffer.waker.register(cx.waker());
        match self.buffer.pop() {
            Some(ch) => {
                self.buffer.waker.take();
                Poll::Ready(Some(ch))
            }
            None => Poll::Pending,
        }
    }
}
