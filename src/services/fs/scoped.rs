//! Scoped document access
//!
//! Documents are chosen through a host-supplied [`DocumentPicker`] and then
//! read or copied with a regular [`FsProvider`]. Grants requested with
//! `persist` are recorded in a JSON file so they survive restarts.

use super::provider::{DocumentPicker, FsProvider, ScopedStorageProvider};
use async_trait::async_trait;
use native_fs_core::{DocumentSelection, FileDescriptor, FsError, OpenDocumentRequest, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default file name for persisted grants inside the main bundle directory
pub const GRANTS_FILE_NAME: &str = "uri_permissions.json";

/// Persisted document grants backed by a JSON array on disk
#[derive(Debug)]
pub struct GrantStore {
    path: PathBuf,
    grants: Mutex<BTreeSet<String>>,
}

impl GrantStore {
    /// Open the store at `path`, loading existing grants if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let grants = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Vec<String>>(&contents)
                .map_err(|e| FsError::Codec(format!("{}: {}", path.display(), e)))?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(FsError::from_io(e, path.to_string_lossy())),
        };

        tracing::debug!("Loaded {} grants from {}", grants.len(), path.display());
        Ok(Self {
            path,
            grants: Mutex::new(grants),
        })
    }

    /// Snapshot of the granted identifiers, sorted
    pub async fn list(&self) -> Vec<String> {
        self.grants.lock().await.iter().cloned().collect()
    }

    /// Record a grant; memory only changes once the file has been written
    pub async fn insert(&self, uri: &str) -> Result<()> {
        let mut grants = self.grants.lock().await;
        if !grants.insert(uri.to_string()) {
            return Ok(());
        }
        if let Err(e) = self.save(&grants).await {
            grants.remove(uri);
            return Err(e);
        }
        Ok(())
    }

    /// Remove a grant, returning whether it was present
    pub async fn remove(&self, uri: &str) -> Result<bool> {
        let mut grants = self.grants.lock().await;
        if !grants.remove(uri) {
            return Ok(false);
        }
        if let Err(e) = self.save(&grants).await {
            grants.insert(uri.to_string());
            return Err(e);
        }
        Ok(true)
    }

    async fn save(&self, grants: &BTreeSet<String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(&grants.iter().collect::<Vec<_>>())
            .map_err(|e| FsError::Codec(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::from_io(e, parent.to_string_lossy()))?;
        }
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| FsError::from_io(e, self.path.to_string_lossy()))
    }
}

/// Scoped storage built from a picker, a provider and a grant store
pub struct LocalScopedStorage {
    picker: Arc<dyn DocumentPicker>,
    fs: Arc<dyn FsProvider>,
    grants: GrantStore,
}

impl LocalScopedStorage {
    pub fn new(
        picker: Arc<dyn DocumentPicker>,
        fs: Arc<dyn FsProvider>,
        grants: GrantStore,
    ) -> Self {
        Self { picker, fs, grants }
    }

    /// Grants file used when none is configured
    pub fn default_grants_path(fs: &dyn FsProvider) -> PathBuf {
        Path::new(&fs.constants().main_bundle_dir).join(GRANTS_FILE_NAME)
    }

    /// Fill in `data` for one picked document
    async fn materialize(&self, uri: &str, request: &OpenDocumentRequest) -> Result<FileDescriptor> {
        let descriptor = self.fs.stat(uri).await?;

        match &request.destination_path {
            Some(dir) => {
                let target = Path::new(dir)
                    .join(&descriptor.name)
                    .to_string_lossy()
                    .into_owned();
                self.fs.copy(uri, &target).await?;
                Ok(descriptor.with_data(target))
            }
            None => {
                let content = self.fs.read_file(uri, request.encoding()).await?;
                Ok(descriptor.with_data(content))
            }
        }
    }
}

#[async_trait]
impl ScopedStorageProvider for LocalScopedStorage {
    async fn list_granted_uri_permissions(&self) -> Result<Vec<String>> {
        Ok(self.grants.list().await)
    }

    async fn release_uri_permission(&self, uri: &str) -> Result<()> {
        if self.grants.remove(uri).await? {
            Ok(())
        } else {
            Err(FsError::Permission(format!("no persisted grant for {uri}")))
        }
    }

    async fn open_document_tree(&self, persist: bool) -> Result<Option<FileDescriptor>> {
        let Some(uri) = self.picker.pick_tree().await? else {
            tracing::debug!("Document tree picker cancelled");
            return Ok(None);
        };

        if persist {
            self.grants.insert(&uri).await?;
        }
        self.fs.stat(&uri).await.map(Some)
    }

    async fn open_document(
        &self,
        request: &OpenDocumentRequest,
    ) -> Result<Option<DocumentSelection>> {
        let mime_types = request.resolved_mime_types();
        let multiple = request.allows_multiple();

        let picked = match self.picker.pick_documents(&mime_types, multiple).await? {
            Some(uris) if !uris.is_empty() => uris,
            _ => {
                tracing::debug!("Document picker cancelled");
                return Ok(None);
            }
        };

        let mut documents = Vec::with_capacity(picked.len());
        for uri in &picked {
            documents.push(self.materialize(uri, request).await?);
        }

        if multiple {
            return Ok(Some(DocumentSelection::Multiple(documents)));
        }
        Ok(documents.into_iter().next().map(DocumentSelection::Single))
    }
}

/// Non-interactive picker answering with preset choices
///
/// An unset choice behaves like a cancelled dialog.
#[derive(Debug, Default)]
pub struct PresetPicker {
    tree: Option<String>,
    documents: Option<Vec<String>>,
    last_mime_types: Mutex<Option<Vec<String>>>,
}

impl PresetPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, uri: impl Into<String>) -> Self {
        self.tree = Some(uri.into());
        self
    }

    pub fn with_documents(mut self, uris: Vec<String>) -> Self {
        self.documents = Some(uris);
        self
    }

    /// MIME filter of the most recent document request
    pub async fn last_mime_types(&self) -> Option<Vec<String>> {
        self.last_mime_types.lock().await.clone()
    }
}

#[async_trait]
impl DocumentPicker for PresetPicker {
    async fn pick_tree(&self) -> Result<Option<String>> {
        Ok(self.tree.clone())
    }

    async fn pick_documents(
        &self,
        mime_types: &[String],
        multiple: bool,
    ) -> Result<Option<Vec<String>>> {
        *self.last_mime_types.lock().await = Some(mime_types.to_vec());

        Ok(self.documents.as_ref().map(|uris| {
            if multiple {
                uris.clone()
            } else {
                uris.iter().take(1).cloned().collect()
            }
        }))
    }
}
