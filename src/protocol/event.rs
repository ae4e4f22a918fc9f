//! IRMP event record
//!
//! The USB IR receiver delivers one HID report per decoded frame:
//!
//! ```text
//! offset  size  field
//!      0     1  report id (ignored)
//!      1     1  protocol
//!      2     2  address   (little endian)
//!      4     2  command   (little endian)
//!      6     1  flags     (bit 0: repetition)
//! ```

use bytes::Buf;

/// Size of one record on the wire
pub const RECORD_LEN: usize = 7;

/// Decoded remote control event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// IRMP protocol number (e.g. 2 = NEC)
    pub protocol: u8,
    /// Device address
    pub address: u16,
    /// Key command
    pub command: u16,
    /// Flag bits set by the receiver
    pub flags: u8,
}

impl RawEvent {
    /// Create an event
    pub fn new(protocol: u8, address: u16, command: u16, flags: u8) -> Self {
        Self {
            protocol,
            address,
            command,
            flags,
        }
    }

    /// Decode one record
    ///
    /// Returns `None` if `buf` is shorter than [`RECORD_LEN`].
    pub fn decode(mut buf: &[u8]) -> Option<Self> {
        if buf.len() < RECORD_LEN {
            return None;
        }

        buf.advance(1);
        Some(Self {
            protocol: buf.get_u8(),
            address: buf.get_u16_le(),
            command: buf.get_u16_le(),
            flags: buf.get_u8(),
        })
    }

    /// Hex code including the flag byte
    pub fn full_code(&self) -> String {
        format!(
            "{:02x}{:04x}{:04x}{:02x}",
            self.protocol, self.address, self.command, self.flags
        )
    }

    /// Translation table key, with the flags forced to zero
    ///
    /// Repeats that differ only in their flag bits resolve to the same name.
    pub fn distribution_key(&self) -> String {
        format!(
            "{:02x}{:04x}{:04x}00",
            self.protocol, self.address, self.command
        )
    }
}
