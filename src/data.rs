//! Append-only data file implementation.
//!
//! The data file is an opaque byte heap: serialized payloads written
//! back-to-back with no separators. Record boundaries exist only in the
//! index file, so the data file never needs to be parsed sequentially.
//! Regions are written once and never mutated, truncated or reclaimed.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Handle to the append-only data file.
///
/// Like [`IndexFile`](crate::index::IndexFile), this holds only the path:
/// appends and reads each open their own short-lived file handle, so a
/// read observes whatever a preceding append has already flushed.
#[derive(Debug)]
pub struct DataFile {
    /// Path to the data file
    path: PathBuf,
    /// Fsync after every append
    sync_writes: bool,
}

impl DataFile {
    /// Open a data file, creating it empty if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new().create(true).append(true).open(&path).map_err(Error::Io)?;

        Ok(Self { path, sync_writes })
    }

    /// Append raw payload bytes, returning the absolute offset of the
    /// first byte written.
    pub fn append(&self, payload: &[u8]) -> Result<i64> {
        let mut file = OpenOptions::new().append(true).open(&self.path).map_err(Error::Io)?;

        // In append mode every write lands at the end of the file, so the
        // pre-write length is the offset of this payload.
        let offset = file.metadata().map_err(Error::Io)?.len() as i64;

        file.write_all(payload).map_err(Error::Io)?;
        file.flush().map_err(Error::Io)?;
        if self.sync_writes {
            file.sync_all().map_err(Error::Io)?;
        }

        Ok(offset)
    }

    /// Read exactly `size` bytes starting at `offset`.
    ///
    /// A region extending past the end of the file is an I/O fault
    /// (truncated data file), not a short read.
    pub fn read_at(&self, offset: i64, size: i32) -> Result<Vec<u8>> {
        if offset < 0 || size < 0 {
            return Err(Error::invalid_argument(format!(
                "Negative offset {} or size {}",
                offset, size
            )));
        }

        let mut file = File::open(&self.path).map_err(Error::Io)?;
        file.seek(SeekFrom::Start(offset as u64)).map_err(Error::Io)?;

        let mut buf = vec![0u8; size as usize];
        file.read_exact(&mut buf).map_err(Error::Io)?;
        Ok(buf)
    }

    /// Current length of the data file in bytes.
    pub fn len(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path).map_err(Error::Io)?.len())
    }

    /// Path to the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
