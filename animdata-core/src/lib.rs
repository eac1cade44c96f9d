//! AnimData Core Library
//!
//! This library provides the record model and the binary container format of
//! `AnimData.D2`, the file that stores frame counts, playback speed and
//! per-frame trigger codes for every animation sequence in the game.

pub mod container;
pub mod hash;
pub mod record;
pub mod records;
pub mod triggers;

pub use container::{decode, encode, encode_with, read_from, write_to, EncodeOptions};
pub use hash::{hash_cof_name, BUCKET_COUNT};
pub use record::Record;
pub use records::{check_trigger_bounds, dedupe_by_name, find_duplicate_names, sort_by_name};
pub use triggers::{ActionTriggers, FRAME_MAX};

/// Result type for animdata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a field or trigger is assigned an invalid value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("frame must be between 0 and 143 (got {0})")]
    FrameOutOfRange(i128),

    #[error("trigger code must be between 1 and 3 (got {0})")]
    CodeOutOfRange(i128),

    #[error("expected 144 trigger codes (got {0})")]
    DenseLength(usize),

    #[error("COF name must have 1 to 7 characters (got {0:?})")]
    NameLength(String),

    #[error("COF name must be ASCII (got {0:?})")]
    NameNotAscii(String),

    #[error("COF name must not contain a null character (found in {0:?})")]
    NameHasNul(String),

    #[error("{field} must be between 0 and 4294967295 (got {value})")]
    FieldOutOfRange { field: &'static str, value: i128 },

    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("trigger frame must be an integer (got {0:?})")]
    FrameKey(String),
}

/// Error types for animdata-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot unpack {what} (offset={offset})")]
    Truncated { offset: usize, what: &'static str },

    #[error(
        "Bucket {bucket} declares {count} records but only {remaining} bytes remain (offset={offset})"
    )]
    CountOverflow {
        offset: usize,
        bucket: usize,
        count: u32,
        remaining: usize,
    },

    #[error("Invalid record field: {source} (offset={offset})")]
    InvalidRecord {
        offset: usize,
        source: ValidationError,
    },

    #[error(
        "Incorrect hash (COF name={cof_name:?}): expected {bucket} but got {hash} (offset={offset})"
    )]
    HashMismatch {
        offset: usize,
        cof_name: String,
        bucket: usize,
        hash: usize,
    },

    #[error("Data size mismatch: buckets use {offset} bytes, but binary size is {len} bytes")]
    TrailingData { offset: usize, len: usize },

    #[error("Bucket {bucket} has {count} records, more than a record count can hold")]
    TooManyRecords { bucket: usize, count: usize },
}

impl Error {
    /// Byte offset at which decoding failed, for structural errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Truncated { offset, .. }
            | Error::CountOverflow { offset, .. }
            | Error::InvalidRecord { offset, .. }
            | Error::HashMismatch { offset, .. }
            | Error::TrailingData { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
