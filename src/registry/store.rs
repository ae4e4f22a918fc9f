//! Registry implementation
//!
//! [`SubscriberSet`] does the write-then-prune bookkeeping over any
//! [`LineSink`]; [`BroadcastRegistry`] pairs it with the listening socket.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::{UnixListener as StdUnixListener, UnixStream as StdUnixStream};
use std::path::Path;

use tokio::net::UnixListener;

use crate::error::{Error, Result};
use crate::protocol::ProtocolLine;

use super::error::AcceptError;
use super::subscriber::{LineSink, Subscriber, SubscriberId};

/// Live subscribers, index addressed
#[derive(Debug)]
pub struct SubscriberSet<S> {
    subscribers: Vec<Subscriber<S>>,
    next_id: SubscriberId,
}

impl<S: LineSink> SubscriberSet<S> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a subscriber and return its id
    pub fn insert(&mut self, sink: S) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber::new(id, sink));
        id
    }

    /// Write `line` to every live subscriber
    ///
    /// Returns the number of subscribers that received the whole line.
    /// The others are marked dead; call [`prune`](Self::prune) afterwards.
    pub fn broadcast(&mut self, line: &[u8]) -> usize {
        self.subscribers
            .iter_mut()
            .map(|sub| sub.deliver(line))
            .filter(|delivered| *delivered)
            .count()
    }

    /// Drop every dead subscriber
    ///
    /// Returns the number removed.
    pub fn prune(&mut self) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.is_alive());
        before - self.subscribers.len()
    }

    /// Check if a subscriber is still registered
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.iter().any(|sub| sub.id == id)
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if there are no subscribers
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<S: LineSink> Default for SubscriberSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind the distribution socket
///
/// Removes a stale socket file first and makes the new one world writable
/// so unprivileged clients can connect. Runs before the async runtime
/// exists; adopt the result with [`BroadcastRegistry::from_std`].
pub fn bind_socket(path: impl AsRef<Path>) -> Result<StdUnixListener> {
    let path = path.as_ref();
    let bind_err = |source| Error::Bind {
        path: path.to_path_buf(),
        source,
    };

    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed stale socket"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove stale socket"),
    }

    let listener = StdUnixListener::bind(path).map_err(bind_err)?;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o666)) {
        tracing::warn!(path = %path.display(), error = %e, "Could not chmod socket");
    }

    listener.set_nonblocking(true).map_err(bind_err)?;
    Ok(listener)
}

/// Listening socket plus its subscribers
#[derive(Debug)]
pub struct BroadcastRegistry {
    listener: UnixListener,
    subscribers: SubscriberSet<StdUnixStream>,
}

impl BroadcastRegistry {
    /// Bind `path` and start with no subscribers
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_std(bind_socket(path)?)
    }

    /// Adopt a listener bound by [`bind_socket`]
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_std(listener: StdUnixListener) -> Result<Self> {
        Ok(Self {
            listener: UnixListener::from_std(listener)?,
            subscribers: SubscriberSet::new(),
        })
    }

    /// Wait for and register one subscriber
    ///
    /// Returns `Ok(None)` for a transient failure. Cancel safe.
    pub async fn accept(&mut self) -> Result<Option<SubscriberId>> {
        match self.listener.accept().await {
            Ok((stream, _)) => {
                let stream = match stream.into_std() {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not detach subscriber socket");
                        return Ok(None);
                    }
                };
                let id = self.subscribers.insert(stream);
                tracing::debug!(
                    subscriber = id,
                    subscribers = self.subscribers.len(),
                    "Subscriber added"
                );
                Ok(Some(id))
            }
            Err(e) => match AcceptError::classify(e) {
                AcceptError::Transient(e) => {
                    tracing::debug!(error = %e, "Transient accept failure");
                    Ok(None)
                }
                AcceptError::Fatal(e) => Err(Error::Accept(e)),
            },
        }
    }

    /// Send `line` to every subscriber
    ///
    /// Returns the number of complete deliveries.
    pub fn broadcast(&mut self, line: &ProtocolLine) -> usize {
        let bytes = line.encode();
        self.subscribers.broadcast(&bytes)
    }

    /// Drop subscribers whose last write failed
    pub fn prune(&mut self) -> usize {
        let removed = self.subscribers.prune();
        if removed > 0 {
            tracing::debug!(
                removed = removed,
                subscribers = self.subscribers.len(),
                "Subscribers removed"
            );
        }
        removed
    }

    /// Number of connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if a subscriber is still registered
    pub fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.subscribers.contains(id)
    }
}
