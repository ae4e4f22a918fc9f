//! Input side of the producer
//!
//! Device records come in through [`DeviceReader`]; [`RepeatDetector`]
//! decides whether each one is a fresh press.

pub mod device;
pub mod repeat;

pub use device::{DeviceFile, DeviceReader, DeviceSource};
pub use repeat::{Repeat, RepeatDetector};
