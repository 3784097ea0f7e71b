//! Cross-platform permission handling.
//!
//! Unix hosts report real POSIX permission bits, so a [`PermissionModel::Faithful`]
//! model carries them through untouched. Windows has no owner/group/other
//! semantics: the bits the standard library synthesizes there are meaningless to
//! the platform receiving a push, so [`PermissionModel::Normalized`] replaces
//! every file mode with [`CANONICAL_FILE_MODE`].
//!
//! The model is chosen once (see [`PermissionModel::host`] and
//! [`crate::config::PackConfig`]) and every scanner and builder asks it for the
//! mode to record instead of branching on the target OS themselves.

use std::fs::Metadata;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt; // mode()

/// Mask for the owner/group/other permission bits.
pub const PERMISSION_BITS: u32 = 0o777;

/// Mode forced onto every file under the normalized model: full owner access,
/// read-write for group and other.
pub const CANONICAL_FILE_MODE: u32 = 0o766;

/// Mode assumed for an archived file whose entry records no Unix mode.
pub const DEFAULT_ARCHIVE_FILE_MODE: u32 = 0o744;

/// How file permission bits are recorded in manifests and archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionModel {
    /// Mode bits are read and written as-is.
    #[default]
    Faithful,
    /// Every file mode is forced to [`CANONICAL_FILE_MODE`].
    Normalized,
}

impl PermissionModel {
    /// The model matching the host's filesystem semantics.
    pub fn host() -> Self {
        if cfg!(windows) {
            PermissionModel::Normalized
        } else {
            PermissionModel::Faithful
        }
    }

    /// Resolves the mode to record for a regular file whose source reports `reported`.
    pub fn file_mode(self, reported: u32) -> u32 {
        match self {
            PermissionModel::Faithful => reported & PERMISSION_BITS,
            PermissionModel::Normalized => CANONICAL_FILE_MODE,
        }
    }
}

#[cfg(unix)]
/// Permission bits of a file as reported by the filesystem.
pub fn unix_mode(meta: &Metadata) -> u32 {
    meta.permissions().mode() & PERMISSION_BITS
}

#[cfg(not(unix))]
/// Synthesized permission bits: only the read-only flag is meaningful here.
pub fn unix_mode(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

#[cfg(unix)]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
/// No-op off Unix: POSIX permission bits cannot be expressed.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
