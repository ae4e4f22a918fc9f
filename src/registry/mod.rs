//! Subscriber registry for line fan-out
//!
//! The registry owns the listening socket and every accepted subscriber.
//! Nothing else reads or writes those handles.
//!
//! # Architecture
//!
//! ```text
//!                        BroadcastRegistry
//!                   ┌──────────────────────────┐
//!   accept() ──────►│ listener: UnixListener   │
//!                   │ subscribers: Vec<        │
//!                   │   Subscriber { sink,     │
//!                   │                alive }   │
//!                   │ >                        │
//!                   └────────────┬─────────────┘
//!                                │ broadcast(line)
//!         ┌──────────────────────┼──────────────────────┐
//!         ▼                      ▼                      ▼
//!     try_write()            try_write()            try_write()
//!     complete ✓             short ✗ → dead         complete ✓
//!                                │
//!                             prune()
//! ```
//!
//! # Non-blocking fan-out
//!
//! Writes never wait. A subscriber that cannot take a whole line right now
//! (full socket buffer, peer gone) is marked dead during the write pass and
//! dropped by [`BroadcastRegistry::prune`] before the next line goes out, so
//! a stalled reader can never hold up the producer.

pub mod error;
pub mod store;
pub mod subscriber;

pub use error::AcceptError;
pub use store::{bind_socket, BroadcastRegistry, SubscriberSet};
pub use subscriber::{LineSink, Subscriber, SubscriberId};
