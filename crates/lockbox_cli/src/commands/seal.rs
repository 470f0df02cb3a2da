//! Encrypt a file or stdin into a container.

use super::{load_key, CommandResult};
use lockbox_core::FrameWriter;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Seals `input` into the container at `out`, one record per chunk.
///
/// Record boundaries are preserved by the container, so the chunk size
/// chosen here is the read granularity a consumer of the container will
/// observe.
pub fn run(key_path: &Path, out: &Path, chunk_size: usize, sync: bool, input: &Path) -> CommandResult {
    if chunk_size == 0 {
        return Err("chunk size must be at least 1 byte".into());
    }

    let key = load_key(key_path)?;

    let mut source: Box<dyn Read> = if input.as_os_str() == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(std::fs::File::open(input).map_err(|e| {
            format!("failed to open input {}: {e}", input.display())
        })?)
    };

    let mut writer = FrameWriter::create_with(out, &key, sync)?;
    let mut chunk = vec![0u8; chunk_size];
    let mut records = 0u64;
    let mut total = 0u64;

    loop {
        let n = read_full_chunk(&mut source, &mut chunk)?;
        if n == 0 {
            break;
        }
        writer.append(&chunk[..n])?;
        records += 1;
        total += n as u64;
        debug!(record = records, bytes = n, "record sealed");
    }

    writer.close()?;
    info!(records, total_bytes = total, path = %out.display(), "container sealed");
    println!(
        "sealed {total} bytes into {records} records at {}",
        out.display()
    );
    Ok(())
}

/// Fills `buf` as far as the source allows; a short return means EOF.
fn read_full_chunk(source: &mut dyn Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
