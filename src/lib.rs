// Filesystem facade library - exposes the facade, its providers and the
// ambient configuration used by hosts and tests

pub mod config;
pub mod config_io;
pub mod roots;
pub mod services;

pub use native_fs_core::{
    DirectoryRootSet, DocumentSelection, Encoding, FileDescriptor, FsError, HashAlgorithm,
    OpenDocumentRequest, Result, StorageVolume,
};
pub use services::fs::{FileSystem, ScopedStorage};
