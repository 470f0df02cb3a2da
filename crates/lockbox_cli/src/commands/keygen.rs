//! Generate a random container key.

use super::CommandResult;
use lockbox_core::SealKey;
use std::path::Path;
use tracing::info;

/// Generates a fresh 256-bit key and writes it hex-encoded to `out`.
///
/// Refuses to overwrite an existing key file.
pub fn run(out: &Path) -> CommandResult {
    if out.exists() {
        return Err(format!("refusing to overwrite existing key file {}", out.display()).into());
    }

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let key = SealKey::generate();
    std::fs::write(out, format!("{}\n", hex::encode(key.as_bytes())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(out, std::fs::Permissions::from_mode(0o600))?;
    }

    info!(path = %out.display(), "key written");
    println!("key written to {}", out.display());
    Ok(())
}
