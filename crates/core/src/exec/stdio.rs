//! Virtualized standard streams.
//!
//! Guest I/O never touches host descriptors. Each stream is a shared
//! in-memory byte queue: the host side holds one handle to feed input
//! or drain output, the emulator holds the other. A stream can be
//! closed by the host to signal end-of-input, which is how a guest
//! `read` distinguishes "no data yet" (suspend) from "no data ever"
//! (return zero).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    buf: VecDeque<u8>,
    closed: bool,
}

/// A cloneable handle to one virtual byte stream.
#[derive(Debug, Clone, Default)]
pub struct VirtStream {
    inner: Arc<Mutex<Inner>>,
}

impl VirtStream {
    /// Creates an empty, open stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` to the queue.
    pub fn write(&self, bytes: &[u8]) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.buf.extend(bytes);
    }

    /// Removes and returns up to `max` queued bytes.
    pub fn read(&self, max: usize) -> Vec<u8> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let take = max.min(inner.buf.len());
        inner.buf.drain(..take).collect()
    }

    /// Removes and returns everything currently queued.
    pub fn read_all(&self) -> Vec<u8> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.buf.drain(..).collect()
    }

    /// Marks the stream as ended; queued bytes remain readable.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.closed = true;
    }

    /// Whether the host has closed the stream.
    pub fn is_closed(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.closed
    }

    /// Number of bytes currently queued.
    pub fn available(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.buf.len()
    }
}
