//! Error types for container operations.

use lockbox_storage::StorageError;
use thiserror::Error;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors that can occur while writing or reading a container.
///
/// Every error is returned to the immediate caller; nothing is swallowed
/// or retried internally. Retry policy on transient storage failures is a
/// caller concern.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Construction failed: directory creation or file open.
    #[error("setup failed: {message}")]
    Setup {
        /// Description of the failure.
        message: String,
    },

    /// The supplied key is not exactly 32 bytes.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// The secure random source could not produce a nonce.
    #[error("randomness failure: {message}")]
    Randomness {
        /// Description of the failure.
        message: String,
    },

    /// The AEAD seal operation failed (record too large for the cipher).
    #[error("seal failed: {message}")]
    SealFailed {
        /// Description of the failure.
        message: String,
    },

    /// Underlying storage failed while writing a frame.
    ///
    /// The file may be left with a partial trailing frame; appends are
    /// not atomic.
    #[error("frame write failed: {source}")]
    Write {
        /// The storage failure.
        #[source]
        source: StorageError,
    },

    /// Underlying storage failed while reading a frame.
    #[error("frame read failed: {source}")]
    Read {
        /// The storage failure.
        #[source]
        source: StorageError,
    },

    /// A frame's declared length is too small to contain a nonce.
    #[error("corrupt frame at offset {offset}: declared length {declared} below nonce size {min}")]
    CorruptFrame {
        /// File offset of the frame's length prefix.
        offset: u64,
        /// The declared frame length.
        declared: u64,
        /// The minimum valid frame length (nonce size).
        min: u64,
    },

    /// A frame extends past the end of the file.
    ///
    /// Distinguished from clean end-of-stream: a length prefix (or part of
    /// one) is present, but the declared bytes are not.
    #[error("truncated frame at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedFrame {
        /// File offset of the frame's length prefix.
        offset: u64,
        /// Bytes the frame declares beyond the offset.
        needed: u64,
        /// Bytes actually remaining in the file.
        available: u64,
    },

    /// AEAD tag verification failed: wrong key or tampered data.
    ///
    /// Altered plaintext is never returned.
    #[error("authentication failed for frame at offset {offset}: wrong key or tampered data")]
    Authentication {
        /// File offset of the frame's length prefix.
        offset: u64,
    },

    /// Operation attempted after `close`.
    #[error("container is closed")]
    Closed,
}

impl ContainerError {
    /// Creates a setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Creates an invalid key size error.
    pub fn invalid_key_size(actual: usize, expected: usize) -> Self {
        Self::InvalidKeySize { expected, actual }
    }

    /// Creates a randomness failure error.
    pub fn randomness(message: impl Into<String>) -> Self {
        Self::Randomness {
            message: message.into(),
        }
    }

    /// Creates a seal failure error.
    pub fn seal_failed(message: impl Into<String>) -> Self {
        Self::SealFailed {
            message: message.into(),
        }
    }

    /// Wraps a storage error from the write path.
    pub fn write(source: StorageError) -> Self {
        Self::Write { source }
    }

    /// Wraps a storage error from the read path.
    pub fn read(source: StorageError) -> Self {
        Self::Read { source }
    }

    /// Creates a corrupt frame error.
    pub fn corrupt_frame(offset: u64, declared: u64, min: u64) -> Self {
        Self::CorruptFrame {
            offset,
            declared,
            min,
        }
    }

    /// Creates a truncated frame error.
    pub fn truncated_frame(offset: u64, needed: u64, available: u64) -> Self {
        Self::TruncatedFrame {
            offset,
            needed,
            available,
        }
    }
}
