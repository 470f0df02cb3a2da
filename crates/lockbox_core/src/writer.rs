//! Encrypting frame writer.

use crate::error::{ContainerError, ContainerResult};
use crate::frame::{self, NONCE_SIZE};
use crate::key::SealKey;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use lockbox_storage::{FileBackend, StorageBackend};
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::Path;
use tracing::{debug, trace};

/// Appends encrypted, self-delimiting frames to a container.
///
/// Each [`append`](Self::append) call seals one plaintext record under a
/// fresh random nonce and writes one frame. The mapping from calls to
/// frames is 1:1 and order-preserving, and the matching [`FrameReader`]
/// surfaces those same record boundaries on the way back out.
///
/// The writer owns its storage backend exclusively and is not safe for
/// shared use without external serialization: the nonce scratch buffer is
/// mutated in place on every append.
///
/// [`FrameReader`]: crate::FrameReader
pub struct FrameWriter {
    backend: Option<Box<dyn StorageBackend>>,
    cipher: ChaCha20Poly1305,
    nonce_buf: [u8; NONCE_SIZE],
    sync_on_append: bool,
}

impl FrameWriter {
    /// Creates a writer over an arbitrary storage backend.
    ///
    /// With `sync_on_append` set, every append is flushed and synced to
    /// durable media before returning. Without it, appended frames are
    /// only queued to the backend; callers wanting durability must call
    /// [`flush`](Self::flush) and [`sync`](Self::sync) themselves.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>, key: &SealKey, sync_on_append: bool) -> Self {
        // Key length is enforced by SealKey, so cipher init cannot fail.
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        Self {
            backend: Some(backend),
            cipher,
            nonce_buf: [0u8; NONCE_SIZE],
            sync_on_append,
        }
    }

    /// Opens (or creates) a container file for appending.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Setup`] if directory creation or file
    /// opening fails.
    pub fn create(path: &Path, key: &SealKey) -> ContainerResult<Self> {
        Self::create_with(path, key, false)
    }

    /// Like [`create`](Self::create), with an explicit durability setting.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Setup`] if directory creation or file
    /// opening fails.
    pub fn create_with(path: &Path, key: &SealKey, sync_on_append: bool) -> ContainerResult<Self> {
        let backend = FileBackend::open_with_create_dirs(path)
            .map_err(|e| ContainerError::setup(format!("failed to open container file: {e}")))?;
        debug!(path = %path.display(), sync_on_append, "container opened for writing");
        Ok(Self::new(Box::new(backend), key, sync_on_append))
    }

    /// Seals one record and appends it as a frame.
    ///
    /// An empty record is legal and produces a tag-only frame. The append
    /// is not atomic: if the backend fails mid-write, the file may be left
    /// with a partial trailing frame, which a later full read surfaces as
    /// [`ContainerError::TruncatedFrame`].
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] after `close`,
    /// [`ContainerError::Randomness`] if the entropy source fails, and
    /// [`ContainerError::Write`] on storage failure.
    pub fn append(&mut self, record: &[u8]) -> ContainerResult<()> {
        let backend = self.backend.as_mut().ok_or(ContainerError::Closed)?;

        // Fresh uniform nonce per frame; never reused under one key.
        OsRng
            .try_fill_bytes(&mut self.nonce_buf)
            .map_err(|e| ContainerError::randomness(e.to_string()))?;

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&self.nonce_buf), record)
            .map_err(|_| ContainerError::seal_failed("record too large to seal"))?;

        let data = frame::encode(&self.nonce_buf, &ciphertext);
        backend.append(&data).map_err(ContainerError::write)?;

        if self.sync_on_append {
            backend.flush().map_err(ContainerError::write)?;
            backend.sync().map_err(ContainerError::write)?;
        }

        trace!(
            record_len = record.len(),
            frame_len = data.len(),
            "frame appended"
        );
        Ok(())
    }

    /// Flushes buffered writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] after `close` or
    /// [`ContainerError::Write`] on storage failure.
    pub fn flush(&mut self) -> ContainerResult<()> {
        let backend = self.backend.as_mut().ok_or(ContainerError::Closed)?;
        backend.flush().map_err(ContainerError::write)
    }

    /// Forces appended frames onto durable media.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] after `close` or
    /// [`ContainerError::Write`] on storage failure.
    pub fn sync(&mut self) -> ContainerResult<()> {
        let backend = self.backend.as_mut().ok_or(ContainerError::Closed)?;
        backend.sync().map_err(ContainerError::write)
    }

    /// Flushes and releases the storage backend.
    ///
    /// Succeeds at most once; a second call, or any operation after a
    /// successful close, fails with [`ContainerError::Closed`]. Dropping
    /// an unclosed writer releases the backend without flushing.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Closed`] if already closed or
    /// [`ContainerError::Write`] if the final flush fails.
    pub fn close(&mut self) -> ContainerResult<()> {
        let mut backend = self.backend.take().ok_or(ContainerError::Closed)?;
        backend.flush().map_err(ContainerError::write)?;
        debug!("container writer closed");
        Ok(())
    }
}

impl std::fmt::Debug for FrameWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter")
            .field("closed", &self.backend.is_none())
            .field("sync_on_append", &self.sync_on_append)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FRAME_OVERHEAD, LEN_PREFIX_SIZE, TAG_SIZE};
    use lockbox_storage::InMemoryBackend;
    use tempfile::tempdir;

    fn written_bytes(records: &[&[u8]]) -> Vec<u8> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frames.lockbox");
        let key = SealKey::from_bytes(&[1u8; 32]).unwrap();

        let mut writer = FrameWriter::create(&path, &key).unwrap();
        for record in records {
            writer.append(record).unwrap();
        }
        writer.close().unwrap();

        std::fs::read(&path).unwrap()
    }

    #[test]
    fn frame_layout_matches_format() {
        let bytes = written_bytes(&[b"hello"]);

        assert_eq!(bytes.len(), FRAME_OVERHEAD + 5);
        let declared = u64::from_be_bytes(bytes[..LEN_PREFIX_SIZE].try_into().unwrap());
        assert_eq!(declared, (NONCE_SIZE + 5 + TAG_SIZE) as u64);
        // Ciphertext must not be the plaintext
        assert_ne!(&bytes[LEN_PREFIX_SIZE + NONCE_SIZE..][..5], b"hello");
    }

    #[test]
    fn frames_are_back_to_back() {
        let bytes = written_bytes(&[b"ab", b"cdef"]);

        let first_len = FRAME_OVERHEAD + 2;
        assert_eq!(bytes.len(), first_len + FRAME_OVERHEAD + 4);
        let second = u64::from_be_bytes(bytes[first_len..][..LEN_PREFIX_SIZE].try_into().unwrap());
        assert_eq!(second, (NONCE_SIZE + 4 + TAG_SIZE) as u64);
    }

    #[test]
    fn empty_record_is_tag_only() {
        let bytes = written_bytes(&[b""]);

        assert_eq!(bytes.len(), FRAME_OVERHEAD);
        let declared = u64::from_be_bytes(bytes[..LEN_PREFIX_SIZE].try_into().unwrap());
        assert_eq!(declared, (NONCE_SIZE + TAG_SIZE) as u64);
    }

    #[test]
    fn nonces_differ_across_frames() {
        let bytes = written_bytes(&[b"same", b"same"]);

        let nonce1 = &bytes[LEN_PREFIX_SIZE..LEN_PREFIX_SIZE + NONCE_SIZE];
        let second_frame = FRAME_OVERHEAD + 4;
        let nonce2 = &bytes[second_frame + LEN_PREFIX_SIZE..][..NONCE_SIZE];
        assert_ne!(nonce1, nonce2);
        // Fresh nonces mean identical plaintexts seal to distinct ciphertexts
        assert_ne!(
            &bytes[LEN_PREFIX_SIZE + NONCE_SIZE..second_frame],
            &bytes[second_frame + LEN_PREFIX_SIZE + NONCE_SIZE..]
        );
    }

    #[test]
    fn create_builds_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("frames.lockbox");
        let key = SealKey::generate();

        let mut writer = FrameWriter::create(&path, &key).unwrap();
        writer.append(b"record").unwrap();
        writer.close().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn operations_after_close_fail() {
        let key = SealKey::generate();
        let mut writer = FrameWriter::new(Box::new(InMemoryBackend::new()), &key, false);

        writer.append(b"data").unwrap();
        writer.close().unwrap();

        assert!(matches!(writer.append(b"more"), Err(ContainerError::Closed)));
        assert!(matches!(writer.flush(), Err(ContainerError::Closed)));
        assert!(matches!(writer.sync(), Err(ContainerError::Closed)));
        assert!(matches!(writer.close(), Err(ContainerError::Closed)));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let key = SealKey::generate();
        let writer = FrameWriter::new(Box::new(InMemoryBackend::new()), &key, true);
        let printed = format!("{writer:?}");
        assert!(printed.contains("sync_on_append"));
    }
}
