//! Configuration options for the varstore record store.

use crate::error::{Error, Result};

/// Configuration options for opening a store.
#[derive(Debug, Clone)]
pub struct Options {
    /// Create the store directory and files if they don't exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Error if the store files already exist.
    /// Default: false
    pub error_if_exists: bool,

    /// File name of the append-only data file inside the store directory.
    /// Default: "store.dat"
    pub data_file_name: String,

    /// File name of the fixed-stride index file inside the store directory.
    /// Default: "store.idx"
    pub index_file_name: String,

    /// Fsync the data and index files after every append.
    /// Writes are always flushed; syncing additionally forces them to
    /// persistent storage at the cost of throughput.
    /// Default: false
    pub sync_writes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            data_file_name: "store.dat".to_string(),
            index_file_name: "store.idx".to_string(),
            sync_writes: false,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if it doesn't exist.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether opening an existing store is an error.
    pub fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets the data file name.
    pub fn data_file_name(mut self, name: impl Into<String>) -> Self {
        self.data_file_name = name.into();
        self
    }

    /// Sets the index file name.
    pub fn index_file_name(mut self, name: impl Into<String>) -> Self {
        self.index_file_name = name.into();
        self
    }

    /// Enables or disables fsync after every append.
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.data_file_name.is_empty() {
            return Err(Error::invalid_argument("data_file_name must not be empty"));
        }
        if self.index_file_name.is_empty() {
            return Err(Error::invalid_argument("index_file_name must not be empty"));
        }
        if self.data_file_name == self.index_file_name {
            return Err(Error::invalid_argument(
                "data_file_name and index_file_name must differ",
            ));
        }
        Ok(())
    }
}
