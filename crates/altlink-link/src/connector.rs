use std::path::Path;

use altlink_transport::{DeviceStream, LineSink, LineSource};

use crate::error::Result;
use crate::link::{Link, LinkConfig};

/// A link over a radio bridge opened from a filesystem path.
pub type DeviceLink = Link<LineSink<DeviceStream>, LineSource<DeviceStream>>;

/// Connect to the bridge at `path` with default settings.
pub fn connect(path: impl AsRef<Path>) -> Result<DeviceLink> {
    connect_with_config(path, LinkConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(path: impl AsRef<Path>, config: LinkConfig) -> Result<DeviceLink> {
    let stream = DeviceStream::open(path)?;
    let reader_stream = stream.try_clone()?;

    let sink = LineSink::with_mtu(stream, config.frame.mtu);
    let source = LineSource::new(reader_stream);
    Ok(Link::connect(sink, source, config))
}
