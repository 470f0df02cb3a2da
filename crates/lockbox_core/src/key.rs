//! Symmetric key handling.

use crate::error::{ContainerError, ContainerResult};
use crate::frame::KEY_SIZE;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit symmetric key for sealing and opening container frames.
///
/// The key is automatically zeroized when dropped. Key length is validated
/// here, at construction, so cipher initialization further down cannot fail
/// on a bad key.
///
/// The key is supplied by the caller and is never persisted or transformed
/// by the container; key distribution and password-based derivation are out
/// of scope.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey {
    bytes: [u8; KEY_SIZE],
}

impl SealKey {
    /// Generates a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidKeySize`] if the slice is not
    /// exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> ContainerResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(ContainerError::invalid_key_size(bytes.len(), KEY_SIZE));
        }

        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this method - don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
