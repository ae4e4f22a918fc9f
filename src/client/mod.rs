//! Consumer side
//!
//! Provides the command runner companion:
//! - A subscriber that stays connected to the distribution socket
//! - A dispatcher that turns received lines into shell commands

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod subscriber;

pub use command::{CommandRunner, ShellRunner};
pub use config::{ExecConfig, DEFAULT_EXEC_TABLE, DEFAULT_RECONNECT_DELAY};
pub use dispatcher::{ActionDispatcher, DispatchMode, DispatchOutcome};
pub use subscriber::ResilientSubscriber;
