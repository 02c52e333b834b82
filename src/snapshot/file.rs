//! Snapshot file
//!
//! Owns the snapshot path and serializes every read or write pass on it.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::format::{decode_image, encode_image};
use crate::error::Result;
use crate::keyspace::Image;

/// The on-disk snapshot
///
/// ## Concurrency:
/// - `lock` is independent of the key-space lock and is held for the whole
///   of each `load` or `store`
pub struct SnapshotFile {
    /// Current snapshot
    path: PathBuf,

    /// Staging file renamed over `path` once fully written
    tmp_path: PathBuf,

    lock: Mutex<()>,
}

impl SnapshotFile {
    /// Open the snapshot at `path`, creating an empty one if absent
    ///
    /// A staging file left behind by an interrupted write is removed.
    pub fn open(path: &Path) -> Result<Self> {
        OpenOptions::new().create(true).append(true).open(path)?;

        let tmp_path = Self::tmp_path_for(path);
        if tmp_path.exists() {
            tracing::warn!("Removing stale snapshot staging file {}", tmp_path.display());
            fs::remove_file(&tmp_path)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            lock: Mutex::new(()),
        })
    }

    /// Read and decode the whole snapshot
    pub fn load(&self) -> Result<Image> {
        let _guard = self.lock.lock();

        let mut bytes = Vec::new();
        File::open(&self.path)?.read_to_end(&mut bytes)?;

        decode_image(&bytes)
    }

    /// Encode `image` and atomically replace the snapshot with it
    ///
    /// Returns the number of bytes written.
    pub fn store(&self, image: &Image) -> Result<usize> {
        let bytes = encode_image(image)?;

        let _guard = self.lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;
        sync_parent_dir(&self.path)?;

        Ok(bytes.len())
    }

    /// Snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// "dump.rdb" → "dump.rdb.tmp"
    fn tmp_path_for(path: &Path) -> PathBuf {
        let mut name: OsString = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Make the rename itself durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
