//! Fixed-stride index file implementation.
//!
//! The index file is a concatenation of 13-byte entries, one per record in
//! insertion order:
//! - Offset (8 bytes): Byte position of the payload in the data file
//! - Size (4 bytes): Byte length of the payload
//! - Active (1 byte): ASCII `'1'` for active, `'0'` for deleted
//!
//! The fixed stride is what makes random access O(1): the entry for logical
//! index `i` always occupies byte range `[13*i, 13*i + 13)`, so no scan is
//! needed to locate it. The file length is invariantly a multiple of 13.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Size of one index entry on the wire (offset + size + flag).
pub const ENTRY_SIZE: usize = 13;

/// Wire byte marking an active entry.
const ACTIVE: u8 = b'1';

/// Wire byte marking a deleted entry.
const DELETED: u8 = b'0';

/// One index entry, locating a single payload in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte position of the payload's first byte in the data file.
    pub offset: i64,
    /// Byte length of the payload.
    pub size: i32,
    /// Whether the record is live. Deletion flips this once; there is no
    /// undelete.
    pub active: bool,
}

impl IndexEntry {
    /// Create a new active entry.
    pub fn new(offset: i64, size: i32) -> Self {
        Self { offset, size, active: true }
    }

    /// Encode the entry to its 13-byte wire form
    ///
    /// Format: `[offset: i64][size: i32][active: u8]`
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut buf = BytesMut::with_capacity(ENTRY_SIZE);
        buf.put_i64_le(self.offset);
        buf.put_i32_le(self.size);
        buf.put_u8(if self.active { ACTIVE } else { DELETED });

        let mut out = [0u8; ENTRY_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Decode an entry from its 13-byte wire form
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < ENTRY_SIZE {
            return Err(Error::corruption(format!(
                "Index entry too short: {} bytes",
                data.len()
            )));
        }

        let offset = data.get_i64_le();
        let size = data.get_i32_le();
        let active = match data.get_u8() {
            ACTIVE => true,
            DELETED => false,
            other => {
                return Err(Error::corruption(format!(
                    "Invalid active flag byte: {:#x}",
                    other
                )))
            }
        };

        if offset < 0 || size < 0 {
            return Err(Error::corruption(format!(
                "Negative offset {} or size {} in index entry",
                offset, size
            )));
        }

        Ok(Self { offset, size, active })
    }
}

/// Handle to the index file.
///
/// Holds only the path; every operation opens the file, performs its
/// seek/read/write, and closes it before returning. No handle survives a
/// call, so a failed operation cannot leave the file locked or half-open.
#[derive(Debug)]
pub struct IndexFile {
    /// Path to the index file
    path: PathBuf,
    /// Fsync after every write
    sync_writes: bool,
}

impl IndexFile {
    /// Open an index file, creating it empty if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Touch the file so later read-only opens cannot fail on a
        // store that has never been written to.
        OpenOptions::new().create(true).append(true).open(&path).map_err(Error::Io)?;

        Ok(Self { path, sync_writes })
    }

    /// Number of entries currently in the file.
    ///
    /// Derived from the file length; a length that is not a multiple of
    /// the entry stride means a torn write and is reported as corruption.
    pub fn len(&self) -> Result<u64> {
        let file_len = std::fs::metadata(&self.path).map_err(Error::Io)?.len();
        if file_len % ENTRY_SIZE as u64 != 0 {
            return Err(Error::corruption(format!(
                "Index file length {} is not a multiple of {}",
                file_len, ENTRY_SIZE
            )));
        }
        Ok(file_len / ENTRY_SIZE as u64)
    }

    /// Whether the file holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append one entry at the end of the file.
    pub fn append(&self, entry: &IndexEntry) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path).map_err(Error::Io)?;
        file.write_all(&entry.encode()).map_err(Error::Io)?;
        file.flush().map_err(Error::Io)?;
        if self.sync_writes {
            file.sync_all().map_err(Error::Io)?;
        }
        Ok(())
    }

    /// Read the entry at logical index `index`.
    ///
    /// Fails with `OutOfRange` rather than returning a zeroed entry when
    /// `index` is at or beyond the current entry count.
    pub fn read_at(&self, index: u64) -> Result<IndexEntry> {
        let len = self.len()?;
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }

        let mut file = File::open(&self.path).map_err(Error::Io)?;
        file.seek(SeekFrom::Start(index * ENTRY_SIZE as u64)).map_err(Error::Io)?;

        let mut buf = [0u8; ENTRY_SIZE];
        file.read_exact(&mut buf).map_err(Error::Io)?;
        IndexEntry::decode(&buf)
    }

    /// Flip the entry at `index` to deleted, in place.
    ///
    /// The file length never changes; only the flag byte of the targeted
    /// entry is rewritten. Fails with `Deleted` if the entry is already
    /// inactive, so a repeated removal is reported rather than silently
    /// absorbed.
    pub fn mark_inactive(&self, index: u64) -> Result<()> {
        let len = self.len()?;
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }

        let mut file =
            OpenOptions::new().read(true).write(true).open(&self.path).map_err(Error::Io)?;

        let entry_offset = index * ENTRY_SIZE as u64;
        file.seek(SeekFrom::Start(entry_offset)).map_err(Error::Io)?;

        let mut buf = [0u8; ENTRY_SIZE];
        file.read_exact(&mut buf).map_err(Error::Io)?;
        let mut entry = IndexEntry::decode(&buf)?;

        if !entry.active {
            return Err(Error::Deleted { index });
        }
        entry.active = false;

        file.seek(SeekFrom::Start(entry_offset)).map_err(Error::Io)?;
        file.write_all(&entry.encode()).map_err(Error::Io)?;
        file.flush().map_err(Error::Io)?;
        if self.sync_writes {
            file.sync_all().map_err(Error::Io)?;
        }
        Ok(())
    }

    /// Read every entry in insertion order.
    pub fn scan_all(&self) -> Result<Vec<IndexEntry>> {
        let len = self.len()?;

        let file = File::open(&self.path).map_err(Error::Io)?;
        let mut reader = BufReader::new(file);
        let mut entries = Vec::with_capacity(len as usize);

        let mut buf = [0u8; ENTRY_SIZE];
        for _ in 0..len {
            reader.read_exact(&mut buf).map_err(Error::Io)?;
            entries.push(IndexEntry::decode(&buf)?);
        }

        Ok(entries)
    }

    /// Path to the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
