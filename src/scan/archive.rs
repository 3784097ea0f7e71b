use std::io;
use std::path::Path;

use tracing::debug;

use crate::archive::{ContainerReader, ZipContainerReader};
use crate::common::{archive_filename, Resource};
use crate::digest;
use crate::error::{PushpackError, Result};
use crate::fsx::{DEFAULT_ARCHIVE_FILE_MODE, PERMISSION_BITS};

/// Lists the entries of the zip archive at `path` in stored order.
/// Filenames get a leading `/`; directories keep their trailing `/`.
/// Modes are the ones stored in the archive; no permission model applies.
pub fn gather_archive_resources(path: &Path) -> Result<Vec<Resource>> {
    debug!(archive = %path.display(), "gathering archive resources");
    let mut reader = ZipContainerReader::open(path)?;
    let resources = read_container_resources(&mut reader).map_err(|e| e.at_path(path))?;
    debug!(archive = %path.display(), count = resources.len(), "archive resources gathered");
    Ok(resources)
}

/// Fingerprints every entry of an open container. The container's order is
/// kept as-is.
pub fn read_container_resources<R: ContainerReader + ?Sized>(reader: &mut R) -> Result<Vec<Resource>> {
    let container = reader.path().to_path_buf();
    let mut resources = Vec::with_capacity(reader.len());
    for index in 0..reader.len() {
        let mut entry = reader.open_entry(index)?;
        let filename = archive_filename(&entry.info.name);

        if entry.info.is_dir || filename.ends_with('/') {
            debug!(%filename, "directory");
            resources.push(Resource::directory(filename));
            continue;
        }

        let (sha1, _) = digest::sha1_reader(&mut entry.content).map_err(|e| {
            let reason = format!("reading entry '{}': {}", entry.info.name, e);
            PushpackError::io(io::Error::new(e.kind(), reason), &container)
        })?;
        let mode = entry.info.unix_mode.map_or(DEFAULT_ARCHIVE_FILE_MODE, |m| m & PERMISSION_BITS);
        debug!(%filename, %sha1, size = entry.info.size, "file");
        resources.push(Resource::file(filename, sha1, entry.info.size, mode));
    }
    Ok(resources)
}
