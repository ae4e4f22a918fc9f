//! Subscriber entries
//!
//! This module defines the per-connection state stored in the registry.

use std::io::{self, Write};
use std::os::unix::net::UnixStream;

/// Registry-assigned subscriber identifier
pub type SubscriberId = u64;

/// Destination that accepts non-blocking writes
pub trait LineSink {
    /// Write as much of `buf` as possible without waiting
    ///
    /// Returns the number of bytes written, like `write(2)` on a
    /// non-blocking descriptor.
    fn try_send(&self, buf: &[u8]) -> io::Result<usize>;
}

/// Accepted connections are detached from the reactor and written directly;
/// the descriptor stays in non-blocking mode.
impl LineSink for UnixStream {
    fn try_send(&self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }
}

/// One connected reader
#[derive(Debug)]
pub struct Subscriber<S> {
    /// Identifier for log messages
    pub id: SubscriberId,
    sink: S,
    alive: bool,
}

impl<S: LineSink> Subscriber<S> {
    /// Wrap a freshly accepted connection
    pub fn new(id: SubscriberId, sink: S) -> Self {
        Self {
            id,
            sink,
            alive: true,
        }
    }

    /// Check if the last write went through completely
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Write the whole line or mark the subscriber dead
    ///
    /// Returns `true` if all bytes were written.
    pub(super) fn deliver(&mut self, line: &[u8]) -> bool {
        if !self.alive {
            return false;
        }

        match self.sink.try_send(line) {
            Ok(n) if n == line.len() => true,
            Ok(n) => {
                tracing::debug!(
                    subscriber = self.id,
                    written = n,
                    len = line.len(),
                    "Incomplete write, dropping subscriber"
                );
                self.alive = false;
                false
            }
            Err(e) => {
                tracing::debug!(subscriber = self.id, error = %e, "Write failed, dropping subscriber");
                self.alive = false;
                false
            }
        }
    }
}
