//! Walk frame metadata without a key.

use super::CommandResult;
use lockbox_core::frame;
use lockbox_storage::FileBackend;
use std::path::Path;
use tracing::warn;

/// Prints the frame skeleton of a container: offsets, declared lengths,
/// and payload sizes.
///
/// Length prefixes sit outside the sealed region, so no key is needed.
/// Structural damage (an undersized length or a dangling trailing frame)
/// is reported and the command exits nonzero; tampered ciphertext is not
/// detectable here since no tags are verified.
pub fn run(container: &Path) -> CommandResult {
    let mut backend = FileBackend::open_existing(container)
        .map_err(|e| format!("failed to open container {}: {e}", container.display()))?;

    let frames = match frame::survey(&mut backend) {
        Ok(frames) => frames,
        Err(e) => {
            warn!(path = %container.display(), error = %e, "container is damaged");
            return Err(format!("container {} is damaged: {e}", container.display()).into());
        }
    };

    println!("container: {}", container.display());
    println!("frames: {}", frames.len());

    let mut total_payload = 0u64;
    for (index, info) in frames.iter().enumerate() {
        println!(
            "  frame {index}: offset {offset}, payload {payload} bytes",
            offset = info.offset,
            payload = info.payload_len
        );
        total_payload += info.payload_len;
    }
    println!("total payload: {total_payload} bytes");

    Ok(())
}
