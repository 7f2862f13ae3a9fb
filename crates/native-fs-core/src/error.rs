use std::io;

/// Result alias used across the facade and providers
pub type Result<T> = std::result::Result<T, FsError>;

/// Failure taxonomy surfaced by every facade operation
#[derive(Debug)]
pub enum FsError {
    /// No capability provider is linked into the host
    Linkage(String),
    /// The target path does not exist
    NotFound(String),
    /// The operation is disallowed by platform policy
    Permission(String),
    /// The operation is invalid for the entry's current type
    State(String),
    /// Encoding, decoding or compression payload is malformed
    Codec(String),
    /// The call was rejected before reaching the provider
    InvalidArgument(String),
    /// Any other provider I/O failure
    Io(io::Error),
}

impl FsError {
    /// Classify an I/O error, prefixing the message with `context`
    /// (usually the path the provider was working on).
    pub fn from_io(err: io::Error, context: impl AsRef<str>) -> Self {
        let context = context.as_ref();
        let msg = format!("{context}: {err}");
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(msg),
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                FsError::Permission(msg)
            }
            io::ErrorKind::IsADirectory
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::DirectoryNotEmpty
            | io::ErrorKind::AlreadyExists => FsError::State(msg),
            io::ErrorKind::InvalidData => FsError::Codec(msg),
            _ => FsError::Io(io::Error::new(err.kind(), msg)),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }

    pub fn is_linkage(&self) -> bool {
        matches!(self, FsError::Linkage(_))
    }

    /// Short machine-readable code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            FsError::Linkage(_) => "ELINK",
            FsError::NotFound(_) => "ENOENT",
            FsError::Permission(_) => "EACCES",
            FsError::State(_) => "ESTATE",
            FsError::Codec(_) => "ECODEC",
            FsError::InvalidArgument(_) => "EINVAL",
            FsError::Io(_) => "EIO",
        }
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::Linkage(msg) => write!(f, "Linkage error: {msg}"),
            FsError::NotFound(msg) => write!(f, "Not found: {msg}"),
            FsError::Permission(msg) => write!(f, "Permission denied: {msg}"),
            FsError::State(msg) => write!(f, "Invalid state: {msg}"),
            FsError::Codec(msg) => write!(f, "Codec error: {msg}"),
            FsError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            FsError::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        FsError::from_io(err, "io")
    }
}
