//! Decrypt a container back to a file or stdout.

use super::{load_key, CommandResult};
use lockbox_core::FrameReader;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Opens the container and concatenates its records to `out`.
pub fn run(key_path: &Path, out: &Path, container: &Path) -> CommandResult {
    let key = load_key(key_path)?;
    let reader = FrameReader::open(container, &key)?;

    let mut sink: Box<dyn Write> = if out.as_os_str() == "-" {
        Box::new(std::io::stdout().lock())
    } else {
        Box::new(std::fs::File::create(out).map_err(|e| {
            format!("failed to create output {}: {e}", out.display())
        })?)
    };

    let mut records = 0u64;
    let mut total = 0u64;
    for result in reader.records() {
        let record = result?;
        sink.write_all(&record)?;
        records += 1;
        total += record.len() as u64;
        debug!(record = records, bytes = record.len(), "record recovered");
    }
    sink.flush()?;

    info!(records, total_bytes = total, "container unsealed");
    if out.as_os_str() != "-" {
        println!(
            "recovered {total} bytes from {records} records into {}",
            out.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::{FrameWriter, SealKey};
    use tempfile::tempdir;

    #[test]
    fn seal_then_unseal_recovers_input() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("key.hex");
        let input = dir.path().join("plain.txt");
        let container = dir.path().join("plain.lockbox");
        let output = dir.path().join("recovered.txt");

        crate::commands::keygen::run(&key_path).unwrap();
        std::fs::write(&input, vec![0x5A; 200_000]).unwrap();

        crate::commands::seal::run(&key_path, &container, 65536, false, &input).unwrap();
        run(&key_path, &output, &container).unwrap();

        assert_eq!(
            std::fs::read(&input).unwrap(),
            std::fs::read(&output).unwrap()
        );
    }

    #[test]
    fn unseal_with_wrong_key_fails() {
        let dir = tempdir().unwrap();
        let container = dir.path().join("c.lockbox");
        let out = dir.path().join("out.bin");

        let key = SealKey::generate();
        let mut writer = FrameWriter::create(&container, &key).unwrap();
        writer.append(b"secret").unwrap();
        writer.close().unwrap();

        let wrong_key_path = dir.path().join("wrong.hex");
        crate::commands::keygen::run(&wrong_key_path).unwrap();

        assert!(run(&wrong_key_path, &out, &container).is_err());
    }
}
