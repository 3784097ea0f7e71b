//! Configured entry point bundling the scan and build operations.

use std::path::{Path, PathBuf};

use crate::common::Resource;
use crate::config::PackConfig;
use crate::error::Result;
use crate::{pack, scan};

/// Runs scans and builds under one [`PackConfig`].
///
/// A `Packer` holds no handles or mutable state, so one instance can serve
/// concurrent calls over independent inputs.
#[derive(Debug, Clone, Default)]
pub struct Packer {
    config: PackConfig,
}

impl Packer {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// See [`scan::gather_directory_resources`].
    pub fn gather_directory_resources(&self, dir: impl AsRef<Path>) -> Result<Vec<Resource>> {
        scan::gather_directory_resources(dir.as_ref(), &self.config)
    }

    /// See [`scan::gather_archive_resources`].
    pub fn gather_archive_resources(&self, archive: impl AsRef<Path>) -> Result<Vec<Resource>> {
        scan::gather_archive_resources(archive.as_ref())
    }

    /// See [`pack::zip_directory_resources`].
    pub fn zip_directory_resources(&self, base: impl AsRef<Path>, resources: &[Resource]) -> Result<PathBuf> {
        pack::zip_directory_resources(base.as_ref(), resources, &self.config)
    }

    /// See [`pack::zip_archive_resources`].
    pub fn zip_archive_resources(&self, source: impl AsRef<Path>, resources: &[Resource]) -> Result<PathBuf> {
        pack::zip_archive_resources(source.as_ref(), resources, &self.config)
    }
}

/// Scans `dir` with the host configuration.
pub fn gather_directory_resources(dir: impl AsRef<Path>) -> Result<Vec<Resource>> {
    Packer::default().gather_directory_resources(dir)
}

/// Scans the archive at `archive` with the host configuration.
pub fn gather_archive_resources(archive: impl AsRef<Path>) -> Result<Vec<Resource>> {
    Packer::default().gather_archive_resources(archive)
}

/// Builds an upload archive from `base` with the host configuration.
pub fn zip_directory_resources(base: impl AsRef<Path>, resources: &[Resource]) -> Result<PathBuf> {
    Packer::default().zip_directory_resources(base, resources)
}
