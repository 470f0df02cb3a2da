//! # Lockbox Core
//!
//! A streaming, authenticated-encryption file container.
//!
//! [`FrameWriter`] seals arbitrary plaintext records with ChaCha20-Poly1305
//! and appends them as self-delimiting frames; [`FrameReader`] walks the
//! frames back, verifies each tag, and serves the recovered records in
//! write order.
//!
//! ## Container Format
//!
//! ```text
//! file  := frame*
//! frame := length (8, big-endian u64) || nonce (12) || ciphertext (N + 16)
//! ```
//!
//! `length` counts the nonce plus the ciphertext. There is no file header,
//! version tag, or frame count; the format is self-describing via per-frame
//! lengths and terminated by end-of-file. A zero-frame file is a valid,
//! empty container. A truncated trailing frame is a corruption error, never
//! end-of-stream.
//!
//! ## Record boundaries are visible to readers
//!
//! Reads never cross a record boundary: a [`FrameReader::read`] call serves
//! at most the remainder of the current record, so callers reading with a
//! chunk size different from the original write size observe short reads at
//! every original boundary. This is part of the contract, not an artifact;
//! see the method documentation.
//!
//! ## Security Model
//!
//! - ChaCha20-Poly1305 with a caller-supplied 256-bit [`SealKey`]
//! - A fresh uniformly random nonce per frame, never reused under one key
//! - Tag verification fails closed: altered plaintext is never returned
//! - No associated data is bound into the seal. Each record's *content* is
//!   authenticated but not its position: truncation is caught, while
//!   deletion or reordering of whole frames is not (frames carry no
//!   sequence number)
//! - Key material is zeroized on drop; keys are never persisted
//!
//! ## Example
//!
//! ```no_run
//! use lockbox_core::{FrameReader, FrameWriter, SealKey};
//! use std::path::Path;
//!
//! let key = SealKey::generate();
//! let path = Path::new("records.lockbox");
//!
//! let mut writer = FrameWriter::create(path, &key)?;
//! writer.append(b"first record")?;
//! writer.append(b"second record")?;
//! writer.close()?;
//!
//! let reader = FrameReader::open(path, &key)?;
//! for record in reader.records() {
//!     println!("{} bytes", record?.len());
//! }
//! # Ok::<(), lockbox_core::ContainerError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod frame;
mod key;
mod reader;
mod writer;

pub use error::{ContainerError, ContainerResult};
pub use frame::{FrameInfo, FRAME_OVERHEAD, KEY_SIZE, LEN_PREFIX_SIZE, NONCE_SIZE, TAG_SIZE};
pub use key::SealKey;
pub use reader::{FrameReader, ReadOutcome, RecordIter};
pub use writer::FrameWriter;
