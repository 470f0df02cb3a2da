//! Decrypting frame reader.

use crate::error::{ContainerError, ContainerResult};
use crate::frame::{LEN_PREFIX_SIZE, NONCE_SIZE};
use crate::key::SealKey;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use lockbox_storage::{FileBackend, StorageBackend, StorageError};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Result of one [`FrameReader::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes were copied into the caller's buffer.
    Data {
        /// Number of bytes copied (may be less than the buffer size).
        bytes_read: usize,
        /// True when the copy consumed the last byte of the current record.
        /// An empty record surfaces as `bytes_read: 0, end_of_record: true`.
        end_of_record: bool,
    },
    /// Clean end of the container: no more frames.
    EndOfStream,
}

/// Reads frames sequentially from a container and serves the recovered
/// plaintext back to the caller.
///
/// The key must equal the key the container was written with, or every
/// frame fails tag verification.
///
/// # Record boundaries leak through `read`
///
/// `read` serves **at most up to the end of the current record**, never
/// blending bytes from two records into one returned chunk. Callers
/// requesting chunk sizes different from the original write sizes will see
/// short reads at every original record boundary. This coupling of read
/// chunking to write chunking is deliberate and part of the container's
/// contract; use [`read_record`](Self::read_record) or
/// [`records`](Self::records) when whole records are wanted.
///
/// The reader owns its storage backend exclusively and is not safe for
/// shared use without external serialization: the plaintext carry-over
/// buffer is mutated in place.
pub struct FrameReader {
    backend: Option<Box<dyn StorageBackend>>,
    cipher: ChaCha20Poly1305,
    /// Offset of the next unread frame's length prefix.
    offset: u64,
    /// Plaintext from the current frame not yet consumed by the caller.
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl FrameReader {
    /// Creates a reader over an arbitrary storage backend.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>, key: &SealKey) -> Self {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        Self {
            backend: Some(backend),
            cipher,
            offset: 0,
            buffer: Vec::new(),
            buffer_pos: 0,
        }
    }

    /// Opens an existing container file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Setup`] if the file does not exist or
    /// cannot be opened.
    pub fn open(path: &Path, key: &SealKey) -> ContainerResult<Self> {
        let backend = FileBackend::open_existing(path)
            .map_err(|e| ContainerError::setup(format!("failed to open container file: {e}")))?;
        debug!(path = %path.display(), "container opened for reading");
        Ok(Self::new(Box::new(backend), key))
    }

    /// Copies up to `buf.len()` bytes of plaintext into `buf`.
    ///
    /// Serves from the carry-over buffer when a record is partially
    /// consumed (no file I/O on that path); otherwise decodes and opens
    /// the next frame. Returns [`ReadOutcome::EndOfStream`] when the file
    /// ends cleanly before a new frame. See the type-level note on record
    /// boundaries: the returned chunk never spans two records.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] after `close`,
    /// [`ContainerError::Read`] on storage failure,
    /// [`ContainerError::CorruptFrame`] for an undersized length prefix,
    /// [`ContainerError::TruncatedFrame`] when the file ends inside a
    /// frame, and [`ContainerError::Authentication`] when tag verification
    /// fails. Altered plaintext is never returned.
    pub fn read(&mut self, buf: &mut [u8]) -> ContainerResult<ReadOutcome> {
        if self.buffer_pos >= self.buffer.len() {
            match self.next_frame()? {
                Some(plaintext) => {
                    self.buffer = plaintext;
                    self.buffer_pos = 0;
                }
                None => return Ok(ReadOutcome::EndOfStream),
            }

            if self.buffer.is_empty() {
                // Empty record: one zero-length chunk, record complete.
                return Ok(ReadOutcome::Data {
                    bytes_read: 0,
                    end_of_record: true,
                });
            }
        }

        let remaining = self.buffer.len() - self.buffer_pos;
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + n]);
        self.buffer_pos += n;

        let end_of_record = self.buffer_pos == self.buffer.len();
        if end_of_record {
            self.buffer.clear();
            self.buffer_pos = 0;
        }

        Ok(ReadOutcome::Data {
            bytes_read: n,
            end_of_record,
        })
    }

    /// Returns the rest of the current record, or the next whole record.
    ///
    /// If a record is partially consumed through [`read`](Self::read), the
    /// unconsumed remainder of that record is returned first. Returns
    /// `Ok(None)` at clean end of stream.
    ///
    /// # Errors
    ///
    /// Same error set as [`read`](Self::read).
    pub fn read_record(&mut self) -> ContainerResult<Option<Vec<u8>>> {
        if self.buffer_pos < self.buffer.len() {
            let rest = self.buffer[self.buffer_pos..].to_vec();
            self.buffer.clear();
            self.buffer_pos = 0;
            return Ok(Some(rest));
        }

        self.next_frame()
    }

    /// Consumes the reader, yielding whole records in write order.
    #[must_use]
    pub fn records(self) -> RecordIter {
        RecordIter {
            reader: self,
            finished: false,
        }
    }

    /// Releases the storage backend.
    ///
    /// Succeeds at most once; a second call, or any operation after a
    /// successful close, fails with [`ContainerError::Closed`]. Dropping
    /// an unclosed reader releases the backend as well.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] if already closed.
    pub fn close(&mut self) -> ContainerResult<()> {
        self.backend.take().ok_or(ContainerError::Closed)?;
        debug!("container reader closed");
        Ok(())
    }

    /// Decodes, reads, and opens the next frame.
    ///
    /// `Ok(None)` is clean end-of-stream: zero bytes remain at the frame
    /// boundary. Any partial frame, down to a single stray byte of length
    /// prefix, is a truncation error instead.
    fn next_frame(&mut self) -> ContainerResult<Option<Vec<u8>>> {
        let backend = self.backend.as_mut().ok_or(ContainerError::Closed)?;

        let size = backend.size().map_err(ContainerError::read)?;
        let remaining = size - self.offset;
        if remaining == 0 {
            trace!(offset = self.offset, "clean end of stream");
            return Ok(None);
        }
        if remaining < LEN_PREFIX_SIZE as u64 {
            warn!(
                offset = self.offset,
                remaining, "partial length prefix at end of container"
            );
            return Err(ContainerError::truncated_frame(
                self.offset,
                LEN_PREFIX_SIZE as u64,
                remaining,
            ));
        }

        let len_bytes = backend
            .read_at(self.offset, LEN_PREFIX_SIZE)
            .map_err(ContainerError::read)?;
        let mut prefix = [0u8; LEN_PREFIX_SIZE];
        prefix.copy_from_slice(&len_bytes);
        let declared = u64::from_be_bytes(prefix);

        if declared < NONCE_SIZE as u64 {
            warn!(
                offset = self.offset,
                declared, "frame length below nonce size"
            );
            return Err(ContainerError::corrupt_frame(
                self.offset,
                declared,
                NONCE_SIZE as u64,
            ));
        }

        let body_offset = self.offset + LEN_PREFIX_SIZE as u64;
        if size - body_offset < declared {
            warn!(
                offset = self.offset,
                declared,
                available = remaining,
                "container ends inside frame body"
            );
            return Err(ContainerError::truncated_frame(
                self.offset,
                LEN_PREFIX_SIZE as u64 + declared,
                remaining,
            ));
        }

        let body = backend
            .read_at(body_offset, declared as usize)
            .map_err(|e| match e {
                // Size was checked above; a late ReadPastEnd means the file
                // shrank underneath us. Still a truncation, not an I/O bug.
                StorageError::ReadPastEnd { size, .. } => ContainerError::truncated_frame(
                    self.offset,
                    LEN_PREFIX_SIZE as u64 + declared,
                    size.saturating_sub(self.offset),
                ),
                other => ContainerError::read(other),
            })?;

        let (nonce, ciphertext) = body.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| ContainerError::Authentication {
                offset: self.offset,
            })?;

        trace!(
            offset = self.offset,
            frame_len = LEN_PREFIX_SIZE as u64 + declared,
            record_len = plaintext.len(),
            "frame opened"
        );
        self.offset = body_offset + declared;
        Ok(Some(plaintext))
    }
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("closed", &self.backend.is_none())
            .field("offset", &self.offset)
            .field("buffered", &(self.buffer.len() - self.buffer_pos))
            .finish()
    }
}

/// Iterator over whole records, in write order.
///
/// Yields `Err` once on the first failed frame and then fuses; a corrupt
/// or truncated container never produces records past the damage.
pub struct RecordIter {
    reader: FrameReader,
    finished: bool,
}

impl Iterator for RecordIter {
    type Item = ContainerResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::FrameWriter;
    use lockbox_storage::InMemoryBackend;
    use tempfile::tempdir;

    fn sealed_container(records: &[&[u8]], key: &SealKey) -> Vec<u8> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.lockbox");
        let mut writer = FrameWriter::create(&path, key).unwrap();
        for record in records {
            writer.append(record).unwrap();
        }
        writer.close().unwrap();
        std::fs::read(&path).unwrap()
    }

    fn reader_over(data: Vec<u8>, key: &SealKey) -> FrameReader {
        FrameReader::new(Box::new(InMemoryBackend::with_data(data)), key)
    }

    #[test]
    fn empty_container_is_clean_end_of_stream() {
        let key = SealKey::generate();
        let mut reader = reader_over(Vec::new(), &key);

        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
        // Still end-of-stream on repeated calls
        assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
    }

    #[test]
    fn short_reads_stop_at_record_boundary() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"12345678", b"abcd"], &key);
        let mut reader = reader_over(data, &key);

        let mut buf = [0u8; 5];
        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 5,
                end_of_record: false
            }
        );
        assert_eq!(&buf, b"12345");

        // Second read serves only the 3 bytes left in the first record,
        // never bytes of the second record.
        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 3,
                end_of_record: true
            }
        );
        assert_eq!(&buf[..3], b"678");

        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 4,
                end_of_record: true
            }
        );
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
    }

    #[test]
    fn empty_record_yields_zero_length_chunk() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"", b"after"], &key);
        let mut reader = reader_over(data, &key);

        let mut buf = [0u8; 8];
        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 0,
                end_of_record: true
            }
        );
        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 5,
                end_of_record: true
            }
        );
        assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
    }

    #[test]
    fn read_record_returns_whole_records() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"first", b"second"], &key);
        let mut reader = reader_over(data, &key);

        assert_eq!(reader.read_record().unwrap().unwrap(), b"first");
        assert_eq!(reader.read_record().unwrap().unwrap(), b"second");
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn read_record_drains_partial_record_first() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"abcdef"], &key);
        let mut reader = reader_over(data, &key);

        let mut buf = [0u8; 2];
        reader.read(&mut buf).unwrap();
        assert_eq!(reader.read_record().unwrap().unwrap(), b"cdef");
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn records_iterator_yields_in_order() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"a", b"bb", b"ccc"], &key);
        let reader = reader_over(data, &key);

        let records: Vec<Vec<u8>> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
    }

    #[test]
    fn records_iterator_fuses_after_error() {
        let key = SealKey::generate();
        let mut data = sealed_container(&[b"good", b"bad"], &key);
        let len = data.len();
        data[len - 1] ^= 0x01; // corrupt the second frame's tag region

        let mut iter = reader_over(data, &key).records();
        assert_eq!(iter.next().unwrap().unwrap(), b"good");
        assert!(matches!(
            iter.next(),
            Some(Err(ContainerError::Authentication { .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn zero_length_buffer_read() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"xy"], &key);
        let mut reader = reader_over(data, &key);

        let mut empty: [u8; 0] = [];
        assert_eq!(
            reader.read(&mut empty).unwrap(),
            ReadOutcome::Data {
                bytes_read: 0,
                end_of_record: false
            }
        );

        let mut buf = [0u8; 4];
        assert_eq!(
            reader.read(&mut buf).unwrap(),
            ReadOutcome::Data {
                bytes_read: 2,
                end_of_record: true
            }
        );
    }

    #[test]
    fn undersized_length_prefix_is_corrupt_frame() {
        let key = SealKey::generate();
        let mut data = Vec::new();
        data.extend_from_slice(&3u64.to_be_bytes());
        data.extend_from_slice(&[0u8; 3]);
        let mut reader = reader_over(data, &key);

        let mut buf = [0u8; 8];
        assert!(matches!(
            reader.read(&mut buf),
            Err(ContainerError::CorruptFrame {
                offset: 0,
                declared: 3,
                ..
            })
        ));
    }

    #[test]
    fn operations_after_close_fail() {
        let key = SealKey::generate();
        let data = sealed_container(&[b"data"], &key);
        let mut reader = reader_over(data, &key);

        reader.close().unwrap();

        let mut buf = [0u8; 4];
        assert!(matches!(reader.read(&mut buf), Err(ContainerError::Closed)));
        assert!(matches!(reader.read_record(), Err(ContainerError::Closed)));
        assert!(matches!(reader.close(), Err(ContainerError::Closed)));
    }
}
