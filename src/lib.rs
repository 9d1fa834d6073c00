//! # varstore - A Variable-Length Record Store
//!
//! varstore is a minimal persistent record store for variable-length
//! records. It keeps two files per store: an append-only data file holding
//! serialized payloads back-to-back, and a fixed-stride index file of
//! 13-byte entries mapping each logical record position to the payload's
//! `(offset, size, active)` triple.
//!
//! ## Architecture
//!
//! The store consists of three components:
//!
//! - **Record Codec**: serializes records to a length-prefixed binary
//!   payload and back
//! - **Data File**: append-only byte heap addressed by absolute offset
//! - **Index File**: fixed-stride entry table giving O(1) random access
//!   by logical index and tombstone deletion
//!
//! Appends are O(1) amortized, random reads are O(1) regardless of store
//! size, and deletion only flips a flag byte in the index file; payloads
//! are never rewritten, moved or reclaimed.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use varstore::{Matricula, Options, Store};
//!
//! # fn main() -> Result<(), varstore::Error> {
//! // Open or create a store
//! let store = Store::open("./data", Options::default())?;
//!
//! // Append records
//! store.add(&Matricula::new("C001", 1, 1000.50, "first enrollment"))?;
//! let index = store.add(&Matricula::new("C002", 2, 1500.75, "second"))?;
//!
//! // Random access by logical index
//! let record = store.read_record(index)?;
//! println!("Found: {:?}", record);
//!
//! // Tombstone deletion
//! store.remove(index)?;
//!
//! // Load all live records in insertion order
//! for record in store.load()? {
//!     println!("{:?}", record);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod data;
pub mod error;
pub mod index;
pub mod record;

// Re-exports
pub use config::Options;
pub use error::{Error, Result};
pub use record::Matricula;

use data::DataFile;
use index::{IndexEntry, IndexFile};
use std::path::{Path, PathBuf};

/// The main store handle.
///
/// `Store` orchestrates the record codec, the data file and the index
/// file. It holds no open file handles: every operation acquires the
/// file(s) it needs, performs its I/O and releases them before returning,
/// so the on-disk files are the only state a `Store` carries between
/// calls.
///
/// # Concurrency
///
/// The store assumes a single caller issuing sequential calls. There is
/// no locking; concurrent access to the same file pair from multiple
/// threads or processes is unsafe and out of scope.
pub struct Store {
    /// Store directory path
    path: PathBuf,

    /// Configuration options
    options: Options,

    /// Append-only payload heap
    data: DataFile,

    /// Fixed-stride entry table
    index: IndexFile,
}

impl Store {
    /// Opens a store at the specified directory with the given options.
    ///
    /// The directory and both files are created empty if absent (subject
    /// to `create_if_missing`); an existing store is opened as-is, with
    /// all previously written records and tombstones visible.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The store files exist and `error_if_exists` is true
    /// - The options are invalid or the files are inaccessible
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use varstore::{Options, Store};
    ///
    /// # fn main() -> Result<(), varstore::Error> {
    /// let store = Store::open("./my_store", Options::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        options.validate()?;

        if !path.exists() {
            if options.create_if_missing {
                std::fs::create_dir_all(&path)?;
            } else {
                return Err(Error::not_found(format!(
                    "Store directory does not exist: {:?}",
                    path
                )));
            }
        }

        let data_path = path.join(&options.data_file_name);
        let index_path = path.join(&options.index_file_name);

        if options.error_if_exists && (data_path.exists() || index_path.exists()) {
            return Err(Error::AlreadyExists(format!("Store already exists: {:?}", path)));
        }

        let data = DataFile::open(&data_path, options.sync_writes)?;
        let index = IndexFile::open(&index_path, options.sync_writes)?;

        log::debug!(
            "Opened store at {:?} with {} entries",
            path,
            index.len().unwrap_or(0)
        );

        Ok(Self { path, options, data, index })
    }

    /// Appends a record, returning its logical index.
    ///
    /// The record is encoded, its payload appended to the data file, and a
    /// matching active entry appended to the index file. The returned
    /// index equals the entry count before the call.
    ///
    /// # Errors
    ///
    /// Any I/O fault is fatal to the call and is not retried. If the data
    /// append succeeds but the index append fails, the payload bytes
    /// remain in the data file as an unreferenced region; the store never
    /// attempts to repair or reuse such orphans.
    pub fn add(&self, record: &Matricula) -> Result<u64> {
        let payload = record.encode();
        if payload.len() > i32::MAX as usize {
            return Err(Error::invalid_argument(format!(
                "Record payload of {} bytes exceeds the index size field",
                payload.len()
            )));
        }

        let logical_index = self.index.len()?;
        let offset = self.data.append(&payload)?;
        let entry = IndexEntry::new(offset, payload.len() as i32);

        if let Err(e) = self.index.append(&entry) {
            log::warn!(
                "Index append failed after data append: {} bytes at offset {} are orphaned",
                payload.len(),
                offset
            );
            return Err(e);
        }

        log::debug!(
            "Added record at index {} (offset {}, {} bytes)",
            logical_index,
            offset,
            payload.len()
        );
        Ok(logical_index)
    }

    /// Loads every live record, in insertion order.
    ///
    /// Scans the full index file from the start on every call; entries
    /// carrying a tombstone are skipped, everything else is read from the
    /// data file and decoded.
    pub fn load(&self) -> Result<Vec<Matricula>> {
        let entries = self.index.scan_all()?;
        let mut records = Vec::new();

        for entry in entries.iter().filter(|e| e.active) {
            let payload = self.data.read_at(entry.offset, entry.size)?;
            records.push(Matricula::decode(&payload)?);
        }

        log::debug!("Loaded {} live records out of {} entries", records.len(), entries.len());
        Ok(records)
    }

    /// Reads the record at the given logical index.
    ///
    /// O(1) regardless of store size: one index entry read at a computed
    /// offset, one payload read.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `index` is at or beyond the entry count
    /// - [`Error::Deleted`] if the record was removed
    pub fn read_record(&self, index: u64) -> Result<Matricula> {
        let entry = self.index.read_at(index)?;
        if !entry.active {
            return Err(Error::Deleted { index });
        }

        let payload = self.data.read_at(entry.offset, entry.size)?;
        Matricula::decode(&payload)
    }

    /// Removes the record at the given logical index.
    ///
    /// Deletion is logical: the index entry's flag is flipped in place and
    /// the payload stays in the data file untouched. The flip happens
    /// exactly once per index.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `index` is at or beyond the entry count
    /// - [`Error::Deleted`] if the record was already removed; the repeat
    ///   call changes nothing on disk
    pub fn remove(&self, index: u64) -> Result<()> {
        self.index.mark_inactive(index)?;
        log::debug!("Removed record at index {}", index);
        Ok(())
    }

    /// Number of entries in the store, including tombstoned ones.
    pub fn len(&self) -> Result<u64> {
        self.index.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The store directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The options the store was opened with.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_both_files() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), Options::default()).unwrap();

        assert!(dir.path().join("store.dat").exists());
        assert!(dir.path().join("store.idx").exists());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_open_missing_dir_without_create() {
        let dir = TempDir::new().unwrap();
        let options = Options { create_if_missing: false, ..Default::default() };
        let result = Store::open(dir.path().join("absent"), options);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_open_existing_store_with_error_if_exists() {
        let dir = TempDir::new().unwrap();
        Store::open(dir.path(), Options::default()).unwrap();

        let options = Options { error_if_exists: true, ..Default::default() };
        let result = Store::open(dir.path(), options);
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_custom_file_names() {
        let dir = TempDir::new().unwrap();
        let options = Options {
            data_file_name: "matricula_data.dat".to_string(),
            index_file_name: "matricula_meta.dat".to_string(),
            ..Default::default()
        };
        let store = Store::open(dir.path(), options).unwrap();
        store.add(&Matricula::new("C001", 1, 1000.50, "n1")).unwrap();

        assert!(dir.path().join("matricula_data.dat").exists());
        assert!(dir.path().join("matricula_meta.dat").exists());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_add_returns_consecutive_indices() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), Options::default()).unwrap();

        for i in 0..5 {
            let index = store.add(&Matricula::new("C", i, 0.0, "")).unwrap();
            assert_eq!(index, i as u64);
        }
        assert_eq!(store.len().unwrap(), 5);
    }

    #[test]
    fn test_duplicate_codes_permitted() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), Options::default()).unwrap();

        let record = Matricula::new("C001", 1, 1000.50, "dup");
        store.add(&record).unwrap();
        store.add(&record).unwrap();

        assert_eq!(store.load().unwrap(), vec![record.clone(), record]);
    }
}
