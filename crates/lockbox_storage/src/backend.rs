//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level byte store for a Lockbox container.
///
/// Storage backends are **opaque byte stores**. They provide simple
/// operations for reading, appending, and flushing bytes. The container
/// owns all frame format interpretation - backends do not understand
/// length prefixes, nonces, or ciphertext.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `flush` pushes buffered writes to the OS; `sync` makes them durable
///
/// # Ownership
///
/// A backend is exclusively owned by one writer or one reader for its
/// lifetime. Methods take `&mut self` and there is no internal locking;
/// callers needing shared access must serialize externally.
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size ([`ReadPastEnd`])
    /// - An I/O error occurs
    ///
    /// [`ReadPastEnd`]: crate::StorageError::ReadPastEnd
    fn read_at(&mut self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs. A failed append may leave
    /// a partial write behind; the storage layer makes no atomicity promise.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Forces all written data onto durable media.
    ///
    /// After this returns successfully, previously appended data is
    /// guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&mut self) -> StorageResult<u64>;

    /// Shrinks the storage to `new_size` bytes.
    ///
    /// Used by tests and recovery tooling to simulate or discard a
    /// dangling partial frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_size` exceeds the current size or an I/O
    /// error occurs.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;
}
