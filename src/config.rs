//! Options that shape every scan and build.

use std::path::PathBuf;

use crate::fsx::PermissionModel;

/// What a directory scan does with entries that are neither regular files nor
/// directories (symlinks, sockets, devices, fifos). Symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialFilePolicy {
    /// Fail the scan with [`crate::PushpackError::Unsupported`].
    #[default]
    Reject,
    /// Leave the entry out of the manifest and log a warning.
    Skip,
}

/// How file entries are stored in built archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

/// Holds all configuration options for scan and build operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// How file modes are recorded and stored.
    pub permission_model: PermissionModel,
    /// Handling of non-regular directory entries.
    pub special_files: SpecialFilePolicy,
    /// Compression method for file entries of built archives.
    pub compression: Compression,
    /// Directory for built archives. Defaults to the system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl PackConfig {
    /// Configuration matching the host platform.
    pub fn host() -> Self {
        Self {
            permission_model: PermissionModel::host(),
            special_files: SpecialFilePolicy::default(),
            compression: Compression::default(),
            temp_dir: None,
        }
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self::host()
    }
}
