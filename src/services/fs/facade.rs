use super::provider::{FsProvider, ScopedStorageProvider};
use native_fs_core::{
    DirectoryRootSet, DocumentSelection, Encoding, FileDescriptor, FsError, HashAlgorithm,
    OpenDocumentRequest, Result,
};
use std::fmt;
use std::sync::Arc;

/// Message carried by every linkage failure
pub const LINKING_ERROR: &str = "The native filesystem provider doesn't seem to be linked. \
Make sure a provider is installed with FileSystem::new before calling any filesystem operation.";

/// Asynchronous filesystem API forwarding to a capability provider
///
/// Every operation is a single forward: the facade checks call shape,
/// fills in the default encoding and hands the call to the provider. It
/// does not retry, cache or reorder; concurrent calls on the same path race
/// in the provider.
///
/// Cloning is cheap and clones share the same providers.
#[derive(Clone)]
pub struct FileSystem {
    provider: Option<Arc<dyn FsProvider>>,
    scoped: Option<Arc<dyn ScopedStorageProvider>>,
}

impl fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystem")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("scoped", &self.scoped.is_some())
            .finish()
    }
}

impl FileSystem {
    /// Create a facade over `provider`
    pub fn new(provider: Arc<dyn FsProvider>) -> Self {
        Self {
            provider: Some(provider),
            scoped: None,
        }
    }

    /// A facade with no provider linked; every call fails with a linkage error
    pub fn unlinked() -> Self {
        Self {
            provider: None,
            scoped: None,
        }
    }

    /// Install the scoped-storage capability
    pub fn with_scoped(mut self, scoped: Arc<dyn ScopedStorageProvider>) -> Self {
        self.scoped = Some(scoped);
        self
    }

    pub fn is_linked(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn FsProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| FsError::Linkage(LINKING_ERROR.to_string()))
    }

    /// Storage roots of the linked provider
    pub fn dirs(&self) -> Result<&DirectoryRootSet> {
        Ok(self.provider()?.constants())
    }

    /// Scoped document access, `None` where the host offers none
    pub fn scoped(&self) -> Result<Option<ScopedStorage>> {
        self.provider()?;
        Ok(self.scoped.clone().map(|inner| ScopedStorage { inner }))
    }

    pub async fn copy(&self, source: &str, target: &str) -> Result<()> {
        let provider = self.provider()?;
        require_path("source", source)?;
        require_path("target", target)?;
        tracing::debug!(provider = provider.name(), source, target, "copy");
        provider.copy(source, target).await
    }

    /// Whether an entry exists at `path`; absence is never an error
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, "exists");
        provider.exists(path).await
    }

    pub async fn list(&self, path: &str) -> Result<Vec<FileDescriptor>> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, "list");
        provider.list(path).await
    }

    /// Create a directory with its parents; an existing directory is returned as is
    pub async fn make_directory(&self, path: &str) -> Result<FileDescriptor> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, "make_directory");
        provider.make_directory(path).await
    }

    /// Move `source` to `target`.
    ///
    /// `Ok(false)` reports a failure the provider does not raise, such as a
    /// missing source under the default signal policy.
    pub async fn move_path(&self, source: &str, target: &str) -> Result<bool> {
        let provider = self.provider()?;
        require_path("source", source)?;
        require_path("target", target)?;
        tracing::debug!(provider = provider.name(), source, target, "move");
        provider.move_path(source, target).await
    }

    /// Rename `source` within its directory.
    ///
    /// `new_name` is a single path component.
    pub async fn rename(&self, source: &str, new_name: &str) -> Result<bool> {
        let provider = self.provider()?;
        require_path("source", source)?;
        require_name(new_name)?;
        tracing::debug!(provider = provider.name(), source, new_name, "rename");
        provider.rename(source, new_name).await
    }

    pub async fn read_file(&self, path: &str, encoding: Option<Encoding>) -> Result<String> {
        let provider = self.provider()?;
        require_path("path", path)?;
        let encoding = encoding.unwrap_or_default();
        tracing::debug!(provider = provider.name(), path, %encoding, "read_file");
        provider.read_file(path, encoding).await
    }

    pub async fn stat(&self, path: &str) -> Result<FileDescriptor> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, "stat");
        provider.stat(path).await
    }

    /// Delete a file or directory tree
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, "delete");
        provider.delete(path).await
    }

    pub async fn write_file(
        &self,
        path: &str,
        content: &str,
        encoding: Option<Encoding>,
    ) -> Result<()> {
        let provider = self.provider()?;
        require_path("path", path)?;
        let encoding = encoding.unwrap_or_default();
        tracing::debug!(
            provider = provider.name(),
            path,
            %encoding,
            len = content.len(),
            "write_file"
        );
        provider.write_file(path, content, encoding).await
    }

    pub async fn append_file(
        &self,
        path: &str,
        content: &str,
        encoding: Option<Encoding>,
    ) -> Result<()> {
        let provider = self.provider()?;
        require_path("path", path)?;
        let encoding = encoding.unwrap_or_default();
        tracing::debug!(
            provider = provider.name(),
            path,
            %encoding,
            len = content.len(),
            "append_file"
        );
        provider.append_file(path, content, encoding).await
    }

    pub async fn compress_file(&self, source: &str, target: &str) -> Result<()> {
        let provider = self.provider()?;
        require_path("source", source)?;
        require_path("target", target)?;
        tracing::debug!(provider = provider.name(), source, target, "compress_file");
        provider.compress_file(source, target).await
    }

    pub async fn decompress_file(&self, source: &str, target: &str) -> Result<()> {
        let provider = self.provider()?;
        require_path("source", source)?;
        require_path("target", target)?;
        tracing::debug!(provider = provider.name(), source, target, "decompress_file");
        provider.decompress_file(source, target).await
    }

    /// Gzip `content` and return the result as base64
    pub async fn compress_string(
        &self,
        content: &str,
        encoding: Option<Encoding>,
    ) -> Result<String> {
        let provider = self.provider()?;
        let encoding = encoding.unwrap_or_default();
        tracing::debug!(
            provider = provider.name(),
            %encoding,
            len = content.len(),
            "compress_string"
        );
        provider.compress_string(content, encoding).await
    }

    /// Gunzip base64 `content`, rendering the bytes per `encoding`
    pub async fn decompress_string(
        &self,
        content: &str,
        encoding: Option<Encoding>,
    ) -> Result<String> {
        let provider = self.provider()?;
        let encoding = encoding.unwrap_or_default();
        tracing::debug!(
            provider = provider.name(),
            %encoding,
            len = content.len(),
            "decompress_string"
        );
        provider.decompress_string(content, encoding).await
    }

    pub async fn hash(&self, path: &str, algorithm: HashAlgorithm) -> Result<String> {
        let provider = self.provider()?;
        require_path("path", path)?;
        tracing::debug!(provider = provider.name(), path, %algorithm, "hash");
        provider.hash(path, algorithm).await
    }

    /// External storage roots; `None` lists all of them
    pub async fn external_storage_paths(&self, removable: Option<bool>) -> Result<Vec<String>> {
        let provider = self.provider()?;
        tracing::debug!(provider = provider.name(), ?removable, "external_storage_paths");
        provider.external_storage_paths(removable).await
    }
}

/// Handle on the scoped-storage capability
#[derive(Clone)]
pub struct ScopedStorage {
    inner: Arc<dyn ScopedStorageProvider>,
}

impl fmt::Debug for ScopedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedStorage").finish_non_exhaustive()
    }
}

impl ScopedStorage {
    pub async fn list_granted_uri_permissions(&self) -> Result<Vec<String>> {
        tracing::debug!("list_granted_uri_permissions");
        self.inner.list_granted_uri_permissions().await
    }

    pub async fn release_uri_permission(&self, uri: &str) -> Result<()> {
        require_path("uri", uri)?;
        tracing::debug!(uri, "release_uri_permission");
        self.inner.release_uri_permission(uri).await
    }

    /// Ask the user for a directory tree; `None` when they cancel
    pub async fn open_document_tree(&self, persist: bool) -> Result<Option<FileDescriptor>> {
        tracing::debug!(persist, "open_document_tree");
        self.inner.open_document_tree(persist).await
    }

    /// Ask the user for documents; `None` when they cancel
    pub async fn open_document(
        &self,
        request: &OpenDocumentRequest,
    ) -> Result<Option<DocumentSelection>> {
        tracing::debug!(?request, "open_document");
        self.inner.open_document(request).await
    }
}

fn require_path(what: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FsError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(FsError::InvalidArgument(format!(
            "'{name}' is not a valid file name"
        )));
    }
    Ok(())
}
