//! Distributor configuration

use std::path::PathBuf;
use std::time::Duration;

/// Well-known LIRC socket path
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/lirc/lircd";

/// Account the daemons switch to after setup
pub const DEFAULT_USER: &str = "nobody";

/// Producer configuration options
#[derive(Debug, Clone)]
pub struct DistributorConfig {
    /// Socket to listen on
    pub socket_path: PathBuf,

    /// Events closer together than this are repeats (zero = disabled)
    pub repeat_window: Duration,

    /// Grab input devices exclusively
    pub grab: bool,

    /// User to run as
    pub user: String,

    /// Translation table mapping distribution keys to names
    pub translation_path: Option<PathBuf>,

    /// Stay in the foreground
    pub foreground: bool,

    /// Input devices to read
    pub devices: Vec<PathBuf>,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            repeat_window: Duration::ZERO, // Disabled
            grab: false,
            user: DEFAULT_USER.to_owned(),
            translation_path: None,
            foreground: false,
            devices: Vec::new(),
        }
    }
}

impl DistributorConfig {
    /// Set the socket path
    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Set the repeat window in milliseconds
    pub fn repeat_window_ms(mut self, ms: u64) -> Self {
        self.repeat_window = Duration::from_millis(ms);
        self
    }

    /// Grab the input devices
    pub fn grab(mut self, grab: bool) -> Self {
        self.grab = grab;
        self
    }

    /// Set the user to run as
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the translation table path
    pub fn translation_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.translation_path = Some(path.into());
        self
    }

    /// Stay in the foreground
    pub fn foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    /// Add an input device
    pub fn device(mut self, path: impl Into<PathBuf>) -> Self {
        self.devices.push(path.into());
        self
    }
}
