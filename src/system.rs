//! Process setup performed once before the core loops start
//!
//! Privilege drop, detaching from the terminal and exclusive device grabs.
//! All of these must run before the tokio runtime is built: `daemon(3)`
//! forks, and a forked multi-threaded runtime is unusable.

use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;

use nix::unistd::{self, User};

use crate::error::{Error, Result};

// EVIOCGRAB from <linux/input.h>
nix::ioctl_write_int!(eviocgrab, b'E', 0x90);

/// Grab an input device so no other reader sees its events
pub fn grab_device(file: &File) -> io::Result<()> {
    // SAFETY: the descriptor is owned by `file` and stays open for the call;
    // EVIOCGRAB takes its argument by value.
    unsafe { eviocgrab(file.as_raw_fd(), 1) }
        .map(|_| ())
        .map_err(io::Error::from)
}

/// Switch group and user id to `user`
pub fn drop_privileges(user: &str) -> Result<()> {
    let account = User::from_name(user)
        .ok()
        .flatten()
        .ok_or_else(|| Error::User(user.to_owned()))?;

    unistd::setgid(account.gid)
        .and_then(|_| unistd::setuid(account.uid))
        .map_err(|source| Error::Privileges {
            user: user.to_owned(),
            source,
        })?;

    tracing::debug!(user, uid = account.uid.as_raw(), "Dropped privileges");
    Ok(())
}

/// Detach from the controlling terminal
pub fn daemonize() -> Result<()> {
    unistd::daemon(false, false).map_err(Error::Daemonize)
}
