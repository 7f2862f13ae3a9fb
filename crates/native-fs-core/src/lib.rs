//! Core value types shared by the native-fs facade and its providers.
//!
//! Everything here is a flat, transient value: descriptors are snapshots
//! taken at call time and nothing in this crate holds a reference to
//! anything else.

pub mod error;
pub mod types;

pub use error::{FsError, Result};
pub use types::{
    DirectoryRootSet, DocumentSelection, Encoding, FileDescriptor, HashAlgorithm,
    OpenDocumentRequest, StorageVolume,
};
