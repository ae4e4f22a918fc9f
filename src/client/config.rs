//! Command runner configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::server::config::{DEFAULT_SOCKET_PATH, DEFAULT_USER};

/// Default key to command table
pub const DEFAULT_EXEC_TABLE: &str = "/etc/irmpexec.map";

/// Fixed delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Consumer configuration options
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Distribution socket to connect to
    pub socket_path: PathBuf,

    /// User to run as
    pub user: String,

    /// Table mapping key names to shell commands
    pub translation_path: PathBuf,

    /// Stay in the foreground
    pub foreground: bool,

    /// Print received lines instead of running commands
    pub print_mode: bool,

    /// Local repeat suppression window (zero = disabled)
    pub repeat_window: Duration,

    /// Delay between reconnect attempts
    pub reconnect_delay: Duration,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            user: DEFAULT_USER.to_owned(),
            translation_path: PathBuf::from(DEFAULT_EXEC_TABLE),
            foreground: false,
            print_mode: false,
            repeat_window: Duration::ZERO,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ExecConfig {
    /// Set the socket path
    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Set the user to run as
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the translation table path
    pub fn translation_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.translation_path = path.into();
        self
    }

    /// Stay in the foreground
    pub fn foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    /// Print lines instead of running commands
    ///
    /// Implies foreground.
    pub fn print_mode(mut self, print: bool) -> Self {
        self.print_mode = print;
        if print {
            self.foreground = true;
        }
        self
    }

    /// Set the local repeat window in milliseconds
    pub fn repeat_window_ms(mut self, ms: u64) -> Self {
        self.repeat_window = Duration::from_millis(ms);
        self
    }

    /// Set the reconnect delay
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
