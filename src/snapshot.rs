//! Best effort dumps of intermediate buffers.
//!
//! Nothing written here is ever read back by the pipeline.

use log::{ debug, warn };

use std::path::{ Path, PathBuf };

use crate::raster::RasterBuffer;

pub trait SnapshotSink {
    fn save(&self, tag: &str, sequence_id: u32, buffer: &RasterBuffer);
}

/// Discards every snapshot.
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn save(&self, _tag: &str, _sequence_id: u32, _buffer: &RasterBuffer) {}
}

/// Writes `<dir>/<tag>_<id>.pgm` or `.ppm`. Failures are logged, never returned.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {

    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, tag: &str, sequence_id: u32, buffer: &RasterBuffer) -> PathBuf {
        self.dir.join(format!("{}_{}.{}", tag, sequence_id, buffer.netpbm_extension()))
    }
}

impl SnapshotSink for DirectorySink {
    fn save(&self, tag: &str, sequence_id: u32, buffer: &RasterBuffer) {
        let path = self.path_for(tag, sequence_id, buffer);
        match buffer.save(&path) {
            Ok(()) => debug!("snapshot {}", path.display()),
            Err(e) => warn!("could not write snapshot {}: {}", path.display(), e),
        }
    }
}
