//! Error types for the varstore record store.

use std::fmt;
use std::io;

/// The result type used throughout varstore.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for varstore operations.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    Io(io::Error),

    /// A logical index at or beyond the current entry count was requested.
    OutOfRange {
        /// The requested logical index.
        index: u64,
        /// The number of entries in the index file at the time of the call.
        len: u64,
    },

    /// The entry at the requested index carries a tombstone.
    Deleted {
        /// The requested logical index.
        index: u64,
    },

    /// Data corruption was detected.
    Corruption(String),

    /// The store directory or a required file was not found.
    NotFound(String),

    /// The store already exists and options forbid opening it.
    AlreadyExists(String),

    /// An invalid argument was provided.
    InvalidArgument(String),
}

impl Error {
    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true for the expected, recoverable failure outcomes
    /// (`OutOfRange` and `Deleted`), as opposed to I/O faults and
    /// corruption.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::OutOfRange { .. } | Error::Deleted { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::OutOfRange { index, len } => {
                write!(f, "Index {} out of range: store holds {} entries", index, len)
            }
            Error::Deleted { index } => {
                write!(f, "Record at index {} has been deleted", index)
            }
            Error::Corruption(msg) => write!(f, "Data corruption: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
