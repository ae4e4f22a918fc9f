//! Wire formats
//!
//! - [`RawEvent`]: fixed-size binary record read from the IR receiver
//! - [`ProtocolLine`]: LIRC-style text line broadcast to subscribers
//!
//! ```text
//!  hidraw record                    broadcast line
//! ┌──┬──┬────┬────┬──┐
//! │id│p │addr│cmd │fl│  ──►  "010102030400 0 KEY_POWER IRMP\n"
//! └──┴──┴────┴────┴──┘         code         rep name     tag
//! ```

pub mod event;
pub mod line;

pub use event::{RawEvent, RECORD_LEN};
pub use line::{ProtocolLine, SOURCE_TAG};
