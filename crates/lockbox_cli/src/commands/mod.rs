//! CLI command implementations.

pub mod inspect;
pub mod keygen;
pub mod seal;
pub mod unseal;

use lockbox_core::SealKey;
use std::path::Path;

/// Shared result type for CLI commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Loads a hex-encoded key from a key file.
pub fn load_key(path: &Path) -> Result<SealKey, Box<dyn std::error::Error>> {
    let encoded = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read key file {}: {e}", path.display()))?;
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| format!("key file {} is not valid hex: {e}", path.display()))?;
    Ok(SealKey::from_bytes(&bytes)?)
}
