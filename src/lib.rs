//! Zeroconf LIRC daemon for IRMP USB IR receivers
//!
//! The producer reads decoded remote control frames from one or more hidraw
//! devices, names them through a translation table and broadcasts LIRC-style
//! lines to every client connected to a Unix socket. The companion command
//! runner subscribes to that socket and runs a shell command for each fresh
//! key press it has a mapping for.
//!
//! ```text
//! hidraw ─► DeviceReader ─► EventDistributor ─► BroadcastRegistry ─► N sockets
//!                             │        │                               │
//!                   RepeatDetector  TranslationTable                   ▼
//!                                                          ResilientSubscriber
//!                                                                      │
//!                                                             ActionDispatcher
//!                                                                      │
//!                                                                /bin/sh -c
//! ```
//!
//! # Example
//!
//! ```no_run
//! use irmp_lircd::input::{DeviceSource, RepeatDetector};
//! use irmp_lircd::registry::BroadcastRegistry;
//! use irmp_lircd::server::EventDistributor;
//! use irmp_lircd::table::TranslationTable;
//!
//! # async fn example() -> irmp_lircd::error::Result<()> {
//! let table = TranslationTable::load("/etc/irmplircd.map")?;
//! let devices = DeviceSource::open_all(&["/dev/hidraw0"], false)?
//!     .into_iter()
//!     .map(DeviceSource::into_reader)
//!     .collect::<irmp_lircd::error::Result<Vec<_>>>()?;
//! let registry = BroadcastRegistry::bind("/var/run/lirc/lircd")?;
//!
//! let distributor = EventDistributor::new(registry, table, RepeatDetector::disabled());
//! match distributor.run(devices).await? {}
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod error;
pub mod input;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod system;
pub mod table;

pub use client::{ActionDispatcher, DispatchMode, ExecConfig, ResilientSubscriber};
pub use error::{Error, Result};
pub use protocol::{ProtocolLine, RawEvent};
pub use server::{DistributorConfig, EventDistributor};
pub use table::TranslationTable;
