//! Producer side: configuration and the distribution loop

pub mod config;
pub mod distributor;

pub use config::{DistributorConfig, DEFAULT_SOCKET_PATH, DEFAULT_USER};
pub use distributor::EventDistributor;
