//! Self-healing connection to the distribution socket
//!
//! The producer is a local service that can always be restarted, so a broken
//! connection is retried for ever with a fixed delay. There is no backoff
//! growth and no retry limit.

use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::UnixStream;

use crate::error::{Error, Result};

/// Longest line accepted, newline included
pub const MAX_LINE_LEN: usize = 8192;

/// Line reader that reconnects on its own
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use irmp_lircd::client::ResilientSubscriber;
///
/// # async fn example() -> irmp_lircd::error::Result<()> {
/// let mut subscriber =
///     ResilientSubscriber::connect("/var/run/lirc/lircd", Duration::from_secs(3)).await?;
///
/// loop {
///     let line = subscriber.next_line().await?;
///     println!("{}", line);
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct ResilientSubscriber {
    path: PathBuf,
    reconnect_delay: Duration,
    reader: Option<BufReader<UnixStream>>,
    buf: Vec<u8>,
    discarding: bool,
    reconnects: u64,
}

impl ResilientSubscriber {
    /// Connect to the socket at `path`
    ///
    /// The first connection must succeed; only later failures are retried.
    pub async fn connect(path: impl AsRef<Path>, reconnect_delay: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path)
            .await
            .map_err(|source| Error::Connect {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Connected");

        Ok(Self {
            path,
            reconnect_delay,
            reader: Some(BufReader::new(stream)),
            buf: Vec::new(),
            discarding: false,
            reconnects: 0,
        })
    }

    /// Adopt a connection made before the runtime started
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_std(
        path: impl AsRef<Path>,
        stream: StdUnixStream,
        reconnect_delay: Duration,
    ) -> Result<Self> {
        stream.set_nonblocking(true)?;

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            reconnect_delay,
            reader: Some(BufReader::new(UnixStream::from_std(stream)?)),
            buf: Vec::new(),
            discarding: false,
            reconnects: 0,
        })
    }

    /// Wait for the next complete line
    ///
    /// The trailing newline is stripped. Lines longer than [`MAX_LINE_LEN`]
    /// are dropped. A disconnect is handled internally by reconnecting; a
    /// line cut short by the disconnect is dropped.
    pub async fn next_line(&mut self) -> Result<String> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                self.reconnect().await;
                continue;
            };

            let limit = MAX_LINE_LEN as u64;
            match reader.take(limit).read_until(b'\n', &mut self.buf).await {
                Ok(_) if self.buf.last() == Some(&b'\n') && self.discarding => {
                    self.discarding = false;
                    self.buf.clear();
                }
                Ok(_) if self.buf.last() == Some(&b'\n') => {
                    let line = String::from_utf8_lossy(&self.buf)
                        .trim_end_matches(|c: char| c == '\n' || c == '\r')
                        .to_owned();
                    self.buf.clear();
                    return Ok(line);
                }
                Ok(n) if n == MAX_LINE_LEN => {
                    if !self.discarding {
                        tracing::warn!(limit = MAX_LINE_LEN, "Line too long, dropped");
                        self.discarding = true;
                    }
                    self.buf.clear();
                }
                Ok(_) => {
                    tracing::error!("LIRC connection broken. Try to reconnect");
                    self.disconnect();
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    tracing::debug!("Interrupted read, retrying");
                }
                Err(e) => {
                    tracing::error!(error = %e, "LIRC connection broken. Try to reconnect");
                    self.disconnect();
                }
            }
        }
    }

    /// Number of successful reconnects so far
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects
    }

    /// Check if a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    fn disconnect(&mut self) {
        self.reader = None;
        self.buf.clear();
        self.discarding = false;
    }

    async fn reconnect(&mut self) {
        loop {
            tokio::time::sleep(self.reconnect_delay).await;

            match UnixStream::connect(&self.path).await {
                Ok(stream) => {
                    self.reader = Some(BufReader::new(stream));
                    self.reconnects += 1;
                    tracing::info!(path = %self.path.display(), "Reconnected to LIRC");
                    return;
                }
                Err(e) => {
                    tracing::debug!(path = %self.path.display(), error = %e, "Reconnect failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixListener;

    use super::*;

    const DELAY: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_connect_fails_without_listener() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResilientSubscriber::connect(dir.path().join("lircd"), DELAY).await;

        assert!(matches!(result, Err(Error::Connect { .. })));
    }

    #[tokio::test]
    async fn test_from_std_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let listener = UnixListener::bind(&path).unwrap();

        let stream = StdUnixStream::connect(&path).unwrap();
        let mut subscriber = ResilientSubscriber::from_std(&path, stream, DELAY).unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        server.write_all(b"a 0 KEY_A IRMP\n").await.unwrap();
        assert_eq!(subscriber.next_line().await.unwrap(), "a 0 KEY_A IRMP");
    }

    #[tokio::test]
    async fn test_reads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let listener = UnixListener::bind(&path).unwrap();

        let mut subscriber = ResilientSubscriber::connect(&path, DELAY).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        server.write_all(b"a 0 KEY_A IRMP\nb 0 KEY_B IRMP\r\n").await.unwrap();

        assert_eq!(subscriber.next_line().await.unwrap(), "a 0 KEY_A IRMP");
        assert_eq!(subscriber.next_line().await.unwrap(), "b 0 KEY_B IRMP");
        assert_eq!(subscriber.reconnect_count(), 0);
    }

    #[tokio::test]
    async fn test_line_split_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let listener = UnixListener::bind(&path).unwrap();

        let mut subscriber = ResilientSubscriber::connect(&path, DELAY).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        let writer = tokio::spawn(async move {
            server.write_all(b"0101020304").await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            server.write_all(b"00 0 KEY_OK IRMP\n").await.unwrap();
            server
        });

        assert_eq!(subscriber.next_line().await.unwrap(), "010102030400 0 KEY_OK IRMP");
        let _server = writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_overlong_line_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let listener = UnixListener::bind(&path).unwrap();

        let mut subscriber = ResilientSubscriber::connect(&path, DELAY).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        let writer = tokio::spawn(async move {
            server.write_all(&vec![b'a'; 3 * MAX_LINE_LEN]).await.unwrap();
            server.write_all(b"\nok 0 KEY_OK IRMP\n").await.unwrap();
            server
        });

        assert_eq!(subscriber.next_line().await.unwrap(), "ok 0 KEY_OK IRMP");
        assert_eq!(subscriber.reconnect_count(), 0);
        let _server = writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let listener = UnixListener::bind(&path).unwrap();

        let mut subscriber = ResilientSubscriber::connect(&path, DELAY).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();

        // Drop the first connection after a partial line
        let mut server = server;
        server.write_all(b"partial line").await.unwrap();
        drop(server);

        let consumer = tokio::spawn(async move {
            let line = subscriber.next_line().await.unwrap();
            (subscriber, line)
        });

        let (mut server, _) = listener.accept().await.unwrap();
        server.write_all(b"after 0 KEY_OK IRMP\n").await.unwrap();

        let (subscriber, line) = consumer.await.unwrap();
        assert_eq!(line, "after 0 KEY_OK IRMP");
        assert_eq!(subscriber.reconnect_count(), 1);
        assert!(subscriber.is_connected());
    }
}
