use std::io;
use std::path::{Path, PathBuf};

/// The primary error type for all operations in the `pushpack` crate.
#[derive(Debug)]
pub enum PushpackError {
    /// The directory or archive handed to an operation does not exist.
    NotFound { path: PathBuf },

    /// The file exists but could not be parsed as an archive container.
    Format { path: PathBuf, reason: String },

    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    Io { source: io::Error, path: PathBuf },

    /// A symlink, socket, device or fifo was found while walking a directory
    /// and the configured policy rejects such entries.
    Unsupported { path: PathBuf },

    /// An error occurred when trying to strip the scan root from a walked path.
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// An error during serialization or deserialization of a resource manifest.
    Json(serde_json::Error),
}

impl PushpackError {
    /// Wraps an I/O error raised while touching `path`.
    pub fn io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        PushpackError::Io { source, path: path.into() }
    }

    /// Wraps an I/O error raised while opening an operation's input, turning
    /// a missing path into [`PushpackError::NotFound`].
    pub(crate) fn opening(source: io::Error, path: &Path) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            PushpackError::NotFound { path: path.to_path_buf() }
        } else {
            PushpackError::io(source, path)
        }
    }

    /// Attaches `path` to an error raised without one.
    pub(crate) fn at_path(self, at: &Path) -> Self {
        match self {
            PushpackError::Io { source, path } if path.as_os_str().is_empty() => PushpackError::io(source, at),
            PushpackError::Format { path, reason } if path.as_os_str().is_empty() => {
                PushpackError::Format { path: at.to_path_buf(), reason }
            }
            other => other,
        }
    }

    /// True when the operation failed because its input path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PushpackError::NotFound { .. })
    }
}

impl std::fmt::Display for PushpackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushpackError::NotFound { path } => write!(f, "No such file or directory: '{}'", path.display()),
            PushpackError::Format { path, reason } => write!(f, "Not a valid archive '{}': {}", path.display(), reason),
            PushpackError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            PushpackError::Unsupported { path } => write!(f, "Unsupported file type at '{}' (not a regular file or directory)", path.display()),
            PushpackError::StripPrefix { prefix, path } => write!(f, "Could not strip prefix '{}' from path '{}'", prefix.display(), path.display()),
            PushpackError::Json(e) => write!(f, "Manifest serialization error: {}", e),
        }
    }
}

impl std::error::Error for PushpackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PushpackError::Io { source, .. } => Some(source),
            PushpackError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PushpackError {
    fn from(err: serde_json::Error) -> Self {
        PushpackError::Json(err)
    }
}

// Generic conversions that don't carry a path
impl From<io::Error> for PushpackError {
    fn from(err: io::Error) -> Self {
        PushpackError::Io { source: err, path: PathBuf::new() }
    }
}

impl From<zip::result::ZipError> for PushpackError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => PushpackError::Io { source: e, path: PathBuf::new() },
            other => PushpackError::Format { path: PathBuf::new(), reason: other.to_string() },
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PushpackError>;
