//! Input device reader
//!
//! Devices are opened non-blocking and registered with the reactor, so a
//! silent device never ties up a thread and the runtime can shut down while
//! reads are pending.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use nix::fcntl::OFlag;
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::error::{Error, Result};
use crate::protocol::{RawEvent, RECORD_LEN};
use crate::system;

/// An opened device, before the runtime takes it over
#[derive(Debug)]
pub struct DeviceSource {
    /// Short name used in log messages
    pub name: String,
    file: File,
}

impl DeviceSource {
    /// Open a device read-only and non-blocking, optionally grabbing it
    /// exclusively
    pub fn open(path: impl AsRef<Path>, grab: bool) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)
            .map_err(|source| Error::Device {
            name: path.display().to_string(),
            source,
        })?;

        if grab {
            system::grab_device(&file).map_err(|source| Error::Device {
                name: path.display().to_string(),
                source,
            })?;
        }

        Ok(Self { name, file })
    }

    /// Open every path, skipping the ones that fail
    ///
    /// Fails only if no device could be opened.
    pub fn open_all<P: AsRef<Path>>(paths: &[P], grab: bool) -> Result<Vec<Self>> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::open(path, grab) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    eprintln!("{}", e);
                    tracing::warn!(error = %e, "Skipping device");
                }
            }
        }

        if sources.is_empty() {
            return Err(Error::NoDevices);
        }
        Ok(sources)
    }

    /// Hand the device to the async runtime
    ///
    /// Must be called from within a tokio runtime. Fails if the file cannot
    /// be polled for readiness, e.g. a regular file.
    pub fn into_reader(self) -> Result<DeviceReader<DeviceFile>> {
        let file = DeviceFile::new(self.file).map_err(|source| Error::Device {
            name: self.name.clone(),
            source,
        })?;
        Ok(DeviceReader::new(self.name, file))
    }
}

/// Non-blocking device file driven by reactor readiness
#[derive(Debug)]
pub struct DeviceFile {
    inner: AsyncFd<File>,
}

impl DeviceFile {
    /// Register an already non-blocking file with the reactor
    pub fn new(file: File) -> io::Result<Self> {
        Ok(Self {
            inner: AsyncFd::new(file)?,
        })
    }
}

impl AsyncRead for DeviceFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            let mut guard = ready!(self.inner.poll_read_ready(cx))?;

            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().read(unfilled)) {
                Ok(Ok(len)) => {
                    buf.advance(len);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(e)) => return Poll::Ready(Err(e)),
                Err(_would_block) => continue,
            }
        }
    }
}

/// Reads one [`RawEvent`] per call from an async source
#[derive(Debug)]
pub struct DeviceReader<R> {
    name: String,
    reader: R,
}

impl<R: AsyncRead + Unpin> DeviceReader<R> {
    /// Wrap a reader
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the next record
    ///
    /// Interrupted reads are retried. End of file, a short record and any
    /// other error mean the device is gone.
    pub async fn read_next(&mut self) -> Result<RawEvent> {
        let mut buf = [0u8; RECORD_LEN];

        let n = loop {
            match self.reader.read(&mut buf).await {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    tracing::debug!(device = %self.name, "Interrupted read, retrying");
                }
                Err(source) => {
                    return Err(Error::Device {
                        name: self.name.clone(),
                        source,
                    })
                }
            }
        };

        if n == 0 {
            return Err(Error::DeviceGone {
                name: self.name.clone(),
            });
        }

        let event = RawEvent::decode(&buf[..n]).ok_or_else(|| Error::ShortRead {
            name: self.name.clone(),
            got: n,
            expected: RECORD_LEN,
        })?;

        tracing::trace!(
            device = %self.name,
            protocol = event.protocol,
            address = event.address,
            command = event.command,
            flags = event.flags,
            "Event read"
        );

        Ok(event)
    }
}
