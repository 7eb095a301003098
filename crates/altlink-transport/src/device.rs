use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TransportError};

/// A connected byte stream to the radio bridge. Implements Read + Write.
///
/// The bridge is either a character device (serial dongle, rfcomm node)
/// opened read-write, or a Unix domain socket exposed by a BLE helper
/// daemon. Either way, each line written is one packet and each line read
/// is one notification.
pub struct DeviceStream {
    inner: DeviceStreamInner,
    path: PathBuf,
}

enum DeviceStreamInner {
    File(File),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl DeviceStream {
    /// Open the bridge at `path`.
    ///
    /// Unix sockets are connected; anything else is opened as a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| TransportError::Open {
            path: path.clone(),
            source,
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            let metadata = std::fs::metadata(&path).map_err(open_err)?;
            if metadata.file_type().is_socket() {
                debug!(?path, "connecting to bridge socket");
                let stream = std::os::unix::net::UnixStream::connect(&path).map_err(open_err)?;
                return Ok(Self {
                    inner: DeviceStreamInner::Unix(stream),
                    path,
                });
            }
        }

        debug!(?path, "opening bridge device");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(open_err)?;
        Ok(Self {
            inner: DeviceStreamInner::File(file),
            path,
        })
    }

    /// Path this stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to clone this stream so reads and writes can be split.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            DeviceStreamInner::File(file) => DeviceStreamInner::File(file.try_clone()?),
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => DeviceStreamInner::Unix(stream.try_clone()?),
        };
        Ok(Self {
            inner,
            path: self.path.clone(),
        })
    }
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceStreamInner::File(file) => file.read(buf),
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for DeviceStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceStreamInner::File(file) => file.write(buf),
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DeviceStreamInner::File(file) => file.flush(),
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            DeviceStreamInner::File(_) => "file",
            #[cfg(unix)]
            DeviceStreamInner::Unix(_) => "unix",
        };
        f.debug_struct("DeviceStream")
            .field("type", &kind)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{LineSink, LineSource};
    use crate::traits::{NotificationSource, PacketTransport};

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "altlink-device-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn open_missing_path_fails() {
        let dir = unique_temp_dir("missing");
        let err = DeviceStream::open(dir.join("nope")).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_regular_file_writes_lines() {
        let dir = unique_temp_dir("file");
        let path = dir.join("tty");
        std::fs::write(&path, b"").unwrap();

        let stream = DeviceStream::open(&path).unwrap();
        assert_eq!(stream.path(), path.as_path());
        let mut sink = LineSink::new(stream);
        sink.send_packet(b"SOUND").unwrap();
        drop(sink);

        assert_eq!(std::fs::read(&path).unwrap(), b"SOUND\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn open_unix_socket_connects() {
        let dir = unique_temp_dir("sock");
        let path = dir.join("bridge.sock");
        let listener = std::os::unix::net::UnixListener::bind(&path).unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut source = LineSource::new(stream.try_clone().unwrap());
            let line = source.recv_notification().unwrap();
            let mut sink = LineSink::new(stream);
            sink.send_packet(b"A:101.50").unwrap();
            line
        });

        let stream = DeviceStream::open(&path).unwrap();
        let mut source = LineSource::new(stream.try_clone().unwrap());
        let mut sink = LineSink::new(stream);
        sink.send_packet(b"GET_CONFIG").unwrap();

        assert_eq!(
            source.recv_notification().unwrap().as_deref(),
            Some("A:101.50")
        );
        assert_eq!(server.join().unwrap().as_deref(), Some("GET_CONFIG"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
