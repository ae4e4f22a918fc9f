//! Error types
//!
//! Every fatal condition of either daemon ends up here. Transient conditions
//! (interrupted calls, a subscriber that stopped reading, a malformed table
//! line) are handled where they occur and never become an [`Error`].

use std::io;
use std::path::PathBuf;

/// `sysexits.h` status for command line usage errors
pub const EX_USAGE: i32 = 64;

/// `sysexits.h` status for operating system errors
pub const EX_OSERR: i32 = 71;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Translation table could not be opened or read
    #[error("could not open translation table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No translation table was configured
    #[error("no translation table given")]
    NoTable,

    /// Read from an input device failed
    #[error("error processing event from {name}: {source}")]
    Device {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Input device returned end of file
    #[error("input device {name} is gone")]
    DeviceGone { name: String },

    /// Input device returned less than one record
    #[error("short read from {name}: got {got} of {expected} bytes")]
    ShortRead {
        name: String,
        got: usize,
        expected: usize,
    },

    /// None of the configured devices could be opened
    #[error("unable to open any event device")]
    NoDevices,

    /// Listening socket could not be created
    #[error("unable to bind AF_UNIX socket to {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Non-transient failure accepting a subscriber
    #[error("error during accept(): {0}")]
    Accept(#[source] io::Error),

    /// Distribution socket could not be reached
    #[error("unable to connect AF_UNIX socket {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// User name does not resolve
    #[error("unable to resolve user {0}")]
    User(String),

    /// setgid/setuid failed
    #[error("unable to setuid/setgid to {user}: {source}")]
    Privileges {
        user: String,
        #[source]
        source: nix::Error,
    },

    /// daemon(3) failed
    #[error("unable to detach from terminal: {0}")]
    Daemonize(#[source] nix::Error),

    /// Any other I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoTable => EX_USAGE,
            _ => EX_OSERR,
        }
    }
}
