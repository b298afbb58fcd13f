use std::io;
use thiserror::Error;

pub type DeserializationResult<T> = std::result::Result<T, DeserializationError>;
pub type SerializationResult<T> = std::result::Result<T, SerializationError>;

/// Errors raised while reading a size prefix or the payload it describes.
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("Offset {offset}: truncated {what} (need {need} bytes, have {have})")]
    Truncated {
        what: &'static str,
        offset: u64,
        need: usize,
        have: usize,
    },

    #[error("Offset {offset}: size prefix is negative ({value})")]
    NegativeSizePrefix { offset: u64, value: i32 },

    #[error(
        "Offset {offset}: size prefix declares {size} bytes, but only {available} bytes follow it"
    )]
    SizePrefixOutOfBounds {
        offset: u64,
        size: usize,
        available: usize,
    },

    #[error("Offset {offset}: frame of {size} bytes exceeds the configured limit of {limit} bytes")]
    FrameTooLarge {
        offset: u64,
        size: usize,
        limit: usize,
    },

    #[error("Offset {offset}: an I/O error has occurred while reading a frame")]
    FailedToRead {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl DeserializationError {
    /// Position in the input the error refers to.
    pub fn offset(&self) -> u64 {
        match self {
            DeserializationError::Truncated { offset, .. }
            | DeserializationError::NegativeSizePrefix { offset, .. }
            | DeserializationError::SizePrefixOutOfBounds { offset, .. }
            | DeserializationError::FrameTooLarge { offset, .. }
            | DeserializationError::FailedToRead { offset, .. } => *offset,
        }
    }
}

/// Errors raised while producing size-prefixed output.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("payload of {len} bytes cannot be described by a 32-bit signed size prefix")]
    PayloadTooLarge { len: usize },

    #[error("an I/O error has occurred while writing a size-prefixed buffer")]
    FailedToWrite {
        #[from]
        source: io::Error,
    },
}
