use async_trait::async_trait;
use native_fs_core::{
    DirectoryRootSet, DocumentSelection, Encoding, FileDescriptor, HashAlgorithm,
    OpenDocumentRequest, Result,
};

/// Capability provider executing file operations for the facade
///
/// Implementations own every policy decision: path resolution, permission
/// handling, and whether a failure is reported as `Ok(false)` or raised.
/// Paths are passed through exactly as the caller supplied them and may be
/// plain paths or URIs.
#[async_trait]
pub trait FsProvider: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Storage roots resolved when the provider was created
    fn constants(&self) -> &DirectoryRootSet;

    /// Copy a file, creating missing parents of the target
    async fn copy(&self, source: &str, target: &str) -> Result<()>;

    /// Check for an entry at `path`
    ///
    /// Absence is `Ok(false)`; only I/O failures are errors.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// List the direct children of a directory
    async fn list(&self, path: &str) -> Result<Vec<FileDescriptor>>;

    /// Create a directory and its missing parents
    async fn make_directory(&self, path: &str) -> Result<FileDescriptor>;

    async fn move_path(&self, source: &str, target: &str) -> Result<bool>;

    /// Rename `source` to the sibling `new_name`
    async fn rename(&self, source: &str, new_name: &str) -> Result<bool>;

    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<String>;

    async fn stat(&self, path: &str) -> Result<FileDescriptor>;

    /// Delete a file or a directory tree
    async fn delete(&self, path: &str) -> Result<bool>;

    async fn write_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()>;

    async fn append_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()>;

    /// Gzip `source` into `target`
    async fn compress_file(&self, source: &str, target: &str) -> Result<()>;

    /// Gunzip `source` into `target`
    async fn decompress_file(&self, source: &str, target: &str) -> Result<()>;

    /// Gzip `content` (decoded per `encoding`) and return it as base64
    async fn compress_string(&self, content: &str, encoding: Encoding) -> Result<String>;

    /// Gunzip base64 `content` and render the bytes per `encoding`
    async fn decompress_string(&self, content: &str, encoding: Encoding) -> Result<String>;

    /// Lowercase hex digest of a file's content
    async fn hash(&self, path: &str, algorithm: HashAlgorithm) -> Result<String>;

    /// External storage roots, optionally filtered by removability
    async fn external_storage_paths(&self, removable: Option<bool>) -> Result<Vec<String>>;
}

/// Platform-restricted document access
#[async_trait]
pub trait ScopedStorageProvider: Send + Sync {
    /// Identifiers of grants that survive restarts
    async fn list_granted_uri_permissions(&self) -> Result<Vec<String>>;

    async fn release_uri_permission(&self, uri: &str) -> Result<()>;

    /// Let the user pick a directory tree; `None` when cancelled
    async fn open_document_tree(&self, persist: bool) -> Result<Option<FileDescriptor>>;

    /// Let the user pick documents; `None` when cancelled
    async fn open_document(
        &self,
        request: &OpenDocumentRequest,
    ) -> Result<Option<DocumentSelection>>;
}

/// Host UI seam presenting the system document picker
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    /// Returns the chosen tree URI, or `None` when the user cancels
    async fn pick_tree(&self) -> Result<Option<String>>;

    /// Returns the chosen document URIs, or `None` when the user cancels.
    ///
    /// At most one URI is returned unless `multiple` is set.
    async fn pick_documents(
        &self,
        mime_types: &[String],
        multiple: bool,
    ) -> Result<Option<Vec<String>>>;
}
