//! Producer loop
//!
//! One reader task per device forwards records over a channel; the loop
//! waits on that channel and the listening socket at once and handles
//! whichever is ready. Device records are always taken before a pending
//! connection.
//!
//! ```text
//!  hidraw0 task ─┐
//!  hidraw1 task ─┼─► mpsc ─┐
//!                          ├─► select! { biased } ─► process() ─► broadcast + prune
//!  UnixListener ───────────┘                      └► accept()
//! ```

use std::convert::Infallible;
use std::time::Instant;

use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::input::{DeviceReader, Repeat, RepeatDetector};
use crate::protocol::{ProtocolLine, RawEvent};
use crate::registry::{BroadcastRegistry, SubscriberId};
use crate::table::TranslationTable;

type DeviceMessage = Result<RawEvent>;

/// What woke the loop up
enum Readiness {
    Device(Option<DeviceMessage>),
    Listener(Result<Option<SubscriberId>>),
}

/// Producer state: registry, translation table and repeat state
pub struct EventDistributor {
    registry: BroadcastRegistry,
    table: TranslationTable,
    detector: RepeatDetector,
}

impl EventDistributor {
    /// Create a distributor
    pub fn new(registry: BroadcastRegistry, table: TranslationTable, detector: RepeatDetector) -> Self {
        Self {
            registry,
            table,
            detector,
        }
    }

    /// Translate one event and send it to every subscriber
    ///
    /// Dead subscribers are pruned before this returns.
    pub fn process(&mut self, event: &RawEvent, now: Instant) -> ProtocolLine {
        let key = event.distribution_key();

        let repeat = match self.detector.classify(now) {
            Repeat::Fresh => u32::from(event.flags),
            Repeat::Repeated(count) => count,
        };

        let name = self.table.lookup(&key);
        if name.is_none() {
            tracing::debug!(key = %key, "No translation");
        }

        let line = ProtocolLine::from_event(event, repeat, name);
        tracing::debug!(line = %line, "Broadcasting");

        let delivered = self.registry.broadcast(&line);
        let removed = self.registry.prune();
        tracing::trace!(delivered, removed, "Broadcast complete");

        line
    }

    /// Run until a device disappears or the listener fails
    ///
    /// Never returns `Ok`.
    pub async fn run<R>(mut self, devices: Vec<DeviceReader<R>>) -> Result<Infallible>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        if devices.is_empty() {
            return Err(Error::NoDevices);
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        for device in devices {
            tokio::spawn(forward_events(device, tx.clone()));
        }
        drop(tx);

        tracing::info!("Started");

        loop {
            let readiness = tokio::select! {
                biased;
                msg = rx.recv() => Readiness::Device(msg),
                accepted = self.registry.accept() => Readiness::Listener(accepted),
            };

            match readiness {
                Readiness::Device(Some(Ok(event))) => {
                    self.process(&event, Instant::now());
                }
                Readiness::Device(Some(Err(e))) => {
                    tracing::error!(error = %e, "Input device failed");
                    return Err(e);
                }
                Readiness::Device(None) => return Err(Error::NoDevices),
                Readiness::Listener(Ok(_)) => {}
                Readiness::Listener(Err(e)) => {
                    tracing::error!(error = %e, "Listener failed");
                    return Err(e);
                }
            }
        }
    }
}

/// Read records from one device until it fails
///
/// The error, if any, is forwarded so the loop can shut down.
async fn forward_events<R>(mut device: DeviceReader<R>, tx: mpsc::UnboundedSender<DeviceMessage>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match device.read_next().await {
            Ok(event) => {
                if tx.send(Ok(event)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}
