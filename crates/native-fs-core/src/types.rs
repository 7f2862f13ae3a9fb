use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FsError;

// ============================================================================
// File Descriptor
// ============================================================================

/// Snapshot of one filesystem entry at call time
///
/// Descriptors carry no identity beyond `path` and are never updated after
/// the provider builds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Last component of the path
    pub name: String,
    /// Storage path (plain path or document URI)
    pub path: String,
    pub is_directory: bool,
    pub is_file: bool,
    /// Milliseconds since the Unix epoch, 0 when unknown
    pub last_modified: u64,
    pub can_read: bool,
    /// Content or copy destination, only set by `open_document`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Guessed from the extension; always `None` for directories
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Byte length for files, 0 for directories
    pub size: u64,
}

impl FileDescriptor {
    /// Create a descriptor for a regular file
    pub fn file(path: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let mime_type = mime_type_for_name(&name);
        Self {
            name,
            path: path.into(),
            is_directory: false,
            is_file: true,
            last_modified: 0,
            can_read: true,
            data: None,
            mime_type,
            size,
        }
    }

    /// Create a descriptor for a directory
    pub fn directory(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: true,
            is_file: false,
            last_modified: 0,
            can_read: true,
            data: None,
            mime_type: None,
            size: 0,
        }
    }

    pub fn with_last_modified(mut self, millis: u64) -> Self {
        self.last_modified = millis;
        self
    }

    pub fn with_can_read(mut self, can_read: bool) -> Self {
        self.can_read = can_read;
        self
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Guess a MIME type from a file name's extension
pub fn mime_type_for_name(name: &str) -> Option<String> {
    let ext = file_extension(name)?;
    mime_guess::from_ext(ext).first().map(|m| m.essence_str().to_string())
}

/// Extension after the last dot, `None` for names without one or ending in a dot
fn file_extension(name: &str) -> Option<&str> {
    let idx = name.rfind('.')?;
    let ext = &name[idx + 1..];
    (!ext.is_empty()).then_some(ext)
}

// ============================================================================
// Directory Roots
// ============================================================================

/// Symbolic storage roots resolved once at process start
///
/// `database_dir` and `sd_card_dir` exist only on platforms that define
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRootSet {
    /// Temporary files; the system may purge these when storage is low
    #[serde(rename = "CacheDir")]
    pub cache_dir: String,
    /// Recommended location for database files
    #[serde(rename = "DatabaseDir", default, skip_serializing_if = "Option::is_none")]
    pub database_dir: Option<String>,
    /// Persistent user-created content
    #[serde(rename = "DocumentDir")]
    pub document_dir: String,
    /// The application's default root directory
    #[serde(rename = "MainBundleDir")]
    pub main_bundle_dir: String,
    /// Root of removable media
    #[serde(rename = "SDCardDir", default, skip_serializing_if = "Option::is_none")]
    pub sd_card_dir: Option<String>,
}

impl DirectoryRootSet {
    /// Present roots as `(symbolic name, path)` pairs
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![("CacheDir", self.cache_dir.as_str())];
        if let Some(dir) = &self.database_dir {
            entries.push(("DatabaseDir", dir.as_str()));
        }
        entries.push(("DocumentDir", self.document_dir.as_str()));
        entries.push(("MainBundleDir", self.main_bundle_dir.as_str()));
        if let Some(dir) = &self.sd_card_dir {
            entries.push(("SDCardDir", dir.as_str()));
        }
        entries
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// How byte content is serialized across the call boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Bytes carried as standard base64 text
    Base64,
    /// Bytes carried as UTF-8 text
    #[default]
    Utf8,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64" => Ok(Encoding::Base64),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            other => Err(FsError::InvalidArgument(format!(
                "unknown encoding '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Hash Algorithm
// ============================================================================

/// Digest algorithms supported by `hash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(FsError::InvalidArgument(format!(
                "invalid hash algorithm '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Document Picking
// ============================================================================

/// Options for `open_document`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDocumentRequest {
    /// Accepted MIME types; takes precedence over `extension_types`
    #[serde(default)]
    pub mime_types: Option<Vec<String>>,
    /// Accepted file extensions, mapped to MIME types when no `mime_types`
    #[serde(default, rename = "extTypes")]
    pub extension_types: Option<Vec<String>>,
    /// Allow picking more than one document
    #[serde(default, rename = "multi")]
    pub allow_multiple: Option<bool>,
    /// Copy picked documents into this directory instead of reading them
    #[serde(default, rename = "toPath")]
    pub destination_path: Option<String>,
    /// Encoding used when the picked content is read
    #[serde(default)]
    pub encoding: Option<Encoding>,
}

impl OpenDocumentRequest {
    /// The MIME filter handed to the picker
    ///
    /// Explicit MIME types win. Otherwise each extension is mapped, skipping
    /// unknown ones; when nothing resolves the filter is `*/*`.
    pub fn resolved_mime_types(&self) -> Vec<String> {
        if let Some(mime_types) = &self.mime_types {
            return mime_types.clone();
        }
        let mapped: Vec<String> = self
            .extension_types
            .iter()
            .flatten()
            .filter_map(|ext| {
                mime_guess::from_ext(ext.trim_start_matches('.'))
                    .first()
                    .map(|m| m.essence_str().to_string())
            })
            .collect();
        if mapped.is_empty() {
            vec!["*/*".to_string()]
        } else {
            mapped
        }
    }

    pub fn allows_multiple(&self) -> bool {
        self.allow_multiple.unwrap_or(false)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding.unwrap_or_default()
    }
}

/// Documents returned by `open_document`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSelection {
    Single(FileDescriptor),
    Multiple(Vec<FileDescriptor>),
}

impl DocumentSelection {
    pub fn into_vec(self) -> Vec<FileDescriptor> {
        match self {
            DocumentSelection::Single(file) => vec![file],
            DocumentSelection::Multiple(files) => files,
        }
    }
}

// ============================================================================
// Storage Volumes
// ============================================================================

/// An external storage root and whether it can be removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageVolume {
    pub path: String,
    #[serde(default)]
    pub removable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_descriptor_serializes_camel_case() {
        let file = FileDescriptor::file("/tmp/a.txt", "a.txt", 5).with_last_modified(42);
        let json = serde_json::to_value(&file).unwrap();

        assert_eq!(json["isFile"], true);
        assert_eq!(json["isDirectory"], false);
        assert_eq!(json["lastModified"], 42);
        assert_eq!(json["canRead"], true);
        assert_eq!(json["mimeType"], "text/plain");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_directory_has_no_mime_or_size() {
        let dir = FileDescriptor::directory("/tmp/d", "d");
        assert!(dir.is_directory);
        assert!(!dir.is_file);
        assert_eq!(dir.mime_type, None);
        assert_eq!(dir.size, 0);
    }

    #[test]
    fn test_mime_type_for_name() {
        assert_eq!(mime_type_for_name("photo.png").as_deref(), Some("image/png"));
        assert_eq!(mime_type_for_name("README"), None);
        assert_eq!(mime_type_for_name("trailing."), None);
    }

    #[test]
    fn test_optional_roots_are_absent_not_empty() {
        let roots = DirectoryRootSet {
            cache_dir: "/c".into(),
            database_dir: None,
            document_dir: "/d".into(),
            main_bundle_dir: "/m".into(),
            sd_card_dir: None,
        };
        let json = serde_json::to_value(&roots).unwrap();
        assert!(json.get("DatabaseDir").is_none());
        assert!(json.get("SDCardDir").is_none());
        assert_eq!(json["CacheDir"], "/c");

        let names: Vec<_> = roots.entries().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["CacheDir", "DocumentDir", "MainBundleDir"]);
    }

    #[test]
    fn test_encoding_default_and_parse() {
        assert_eq!(Encoding::default(), Encoding::Utf8);
        assert_eq!("base64".parse::<Encoding>().unwrap(), Encoding::Base64);
        assert!("latin1".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_hash_algorithm_parse() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_resolved_mime_types() {
        let explicit = OpenDocumentRequest {
            mime_types: Some(vec!["application/pdf".into()]),
            extension_types: Some(vec!["png".into()]),
            ..Default::default()
        };
        assert_eq!(explicit.resolved_mime_types(), vec!["application/pdf"]);

        let from_ext = OpenDocumentRequest {
            extension_types: Some(vec!["png".into(), "nosuchext".into()]),
            ..Default::default()
        };
        assert_eq!(from_ext.resolved_mime_types(), vec!["image/png"]);

        let nothing = OpenDocumentRequest::default();
        assert_eq!(nothing.resolved_mime_types(), vec!["*/*"]);
    }

    #[test]
    fn test_open_document_request_bridge_names() {
        let req: OpenDocumentRequest = serde_json::from_str(
            r#"{"extTypes":["txt"],"multi":true,"toPath":"/dst","encoding":"base64"}"#,
        )
        .unwrap();
        assert!(req.allows_multiple());
        assert_eq!(req.destination_path.as_deref(), Some("/dst"));
        assert_eq!(req.encoding(), Encoding::Base64);
    }
}
