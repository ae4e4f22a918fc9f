//! Accept error classification

use std::io;

/// Outcome of a failed `accept()`
#[derive(Debug)]
pub enum AcceptError {
    /// Peer went away before the accept completed, or the call was
    /// interrupted; skip this cycle
    Transient(io::Error),
    /// Anything else; the listener is unusable
    Fatal(io::Error),
}

impl AcceptError {
    /// Sort an accept error into transient or fatal
    pub fn classify(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionAborted | io::ErrorKind::Interrupted => {
                AcceptError::Transient(err)
            }
            _ => AcceptError::Fatal(err),
        }
    }

    /// Check if the error can be ignored
    pub fn is_transient(&self) -> bool {
        matches!(self, AcceptError::Transient(_))
    }
}

impl std::fmt::Display for AcceptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptError::Transient(e) => write!(f, "transient accept failure: {}", e),
            AcceptError::Fatal(e) => write!(f, "accept failed: {}", e),
        }
    }
}

impl std::error::Error for AcceptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        for kind in [io::ErrorKind::ConnectionAborted, io::ErrorKind::Interrupted] {
            assert!(AcceptError::classify(io::Error::from(kind)).is_transient());
        }
    }

    #[test]
    fn test_fatal_kinds() {
        let err = AcceptError::classify(io::Error::from_raw_os_error(24)); // EMFILE
        assert!(!err.is_transient());

        let err = AcceptError::classify(io::Error::from(io::ErrorKind::InvalidInput));
        assert!(!err.is_transient());
    }
}
