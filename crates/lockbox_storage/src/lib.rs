//! # Lockbox Storage
//!
//! Byte-store backend trait and implementations for Lockbox containers.
//!
//! This crate provides the lowest-level storage abstraction consumed by the
//! container writer and reader. Backends are **opaque byte stores** - they do
//! not interpret the data they hold. Frame layout, encryption, and length
//! accounting all live one layer up, in `lockbox_core`.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, append, flush, sync)
//! - No knowledge of the container frame format or of key material
//! - Each backend instance has exactly one owner; there is no internal
//!   locking, matching the container's single-threaded, blocking model
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral containers
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use lockbox_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
