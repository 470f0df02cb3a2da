//! Frame layout constants and key-less frame walking.
//!
//! ## Frame Format
//!
//! ```text
//! | length (8, big-endian u64) | nonce (12) | ciphertext (plaintext + 16) |
//! ```
//!
//! `length` counts everything after itself: nonce plus ciphertext. Frames
//! are stored back-to-back with no padding; the file is a pure concatenation
//! of frames in write order, terminated by end-of-file. There is no file
//! header, version tag, or frame count.

use crate::error::{ContainerError, ContainerResult};
use lockbox_storage::StorageBackend;

/// Size of the frame length prefix in bytes.
pub const LEN_PREFIX_SIZE: usize = 8;
/// Size of the ChaCha20-Poly1305 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the ChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Fixed per-frame overhead: length prefix, nonce, and tag.
pub const FRAME_OVERHEAD: usize = LEN_PREFIX_SIZE + NONCE_SIZE + TAG_SIZE;

/// Builds the on-disk bytes for one frame.
pub(crate) fn encode(nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    let length = (NONCE_SIZE + ciphertext.len()) as u64;

    let mut data = Vec::with_capacity(LEN_PREFIX_SIZE + NONCE_SIZE + ciphertext.len());
    data.extend_from_slice(&length.to_be_bytes());
    data.extend_from_slice(nonce);
    data.extend_from_slice(ciphertext);
    data
}

/// Metadata about one frame, recovered without a key.
///
/// Length prefixes and nonces sit outside the sealed region, so the frame
/// skeleton of a container can be walked without decrypting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// File offset of the frame's length prefix.
    pub offset: u64,
    /// The declared length: nonce plus ciphertext bytes.
    pub declared_len: u64,
    /// Plaintext size of the record (declared length minus nonce and tag).
    pub payload_len: u64,
}

/// Walks all frame length prefixes in the container without decrypting.
///
/// Returns one [`FrameInfo`] per frame, in file order. Surfaces the same
/// structural errors a full read would: [`ContainerError::CorruptFrame`]
/// for an undersized length and [`ContainerError::TruncatedFrame`] for a
/// dangling trailing frame. Tag verification is not performed, so tampered
/// ciphertext is not detected here.
///
/// # Errors
///
/// Returns an error on storage failure or structural corruption.
pub fn survey(backend: &mut dyn StorageBackend) -> ContainerResult<Vec<FrameInfo>> {
    let size = backend.size().map_err(ContainerError::read)?;
    let mut frames = Vec::new();
    let mut offset = 0u64;

    while offset < size {
        let remaining = size - offset;
        if remaining < LEN_PREFIX_SIZE as u64 {
            return Err(ContainerError::truncated_frame(
                offset,
                LEN_PREFIX_SIZE as u64,
                remaining,
            ));
        }

        let len_bytes = backend
            .read_at(offset, LEN_PREFIX_SIZE)
            .map_err(ContainerError::read)?;
        let mut prefix = [0u8; LEN_PREFIX_SIZE];
        prefix.copy_from_slice(&len_bytes);
        let declared = u64::from_be_bytes(prefix);

        if declared < NONCE_SIZE as u64 {
            return Err(ContainerError::corrupt_frame(
                offset,
                declared,
                NONCE_SIZE as u64,
            ));
        }

        let body_remaining = remaining - LEN_PREFIX_SIZE as u64;
        if body_remaining < declared {
            return Err(ContainerError::truncated_frame(
                offset,
                LEN_PREFIX_SIZE as u64 + declared,
                remaining,
            ));
        }

        frames.push(FrameInfo {
            offset,
            declared_len: declared,
            payload_len: declared.saturating_sub((NONCE_SIZE + TAG_SIZE) as u64),
        });

        offset += LEN_PREFIX_SIZE as u64 + declared;
    }

    Ok(frames)
}
