use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::common::{path_to_slash, Resource};
use crate::config::{PackConfig, SpecialFilePolicy};
use crate::digest;
use crate::error::{PushpackError, Result};
use crate::fsx;

/// Walks `root` and returns one resource per directory and regular file below
/// it, depth-first with siblings in file-name order. Paths are root-relative
/// with forward slashes and no leading slash; the root itself is not listed.
pub fn gather_directory_resources(root: &Path, config: &PackConfig) -> Result<Vec<Resource>> {
    let meta = fs::metadata(root).map_err(|e| PushpackError::opening(e, root))?;
    if !meta.is_dir() {
        return Err(PushpackError::io(
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            root,
        ));
    }
    debug!(root = %root.display(), "gathering directory resources");

    let mut resources = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            PushpackError::io(e.into(), path)
        })?;

        let relative = entry.path().strip_prefix(root).map_err(|_| PushpackError::StripPrefix {
            prefix: root.to_path_buf(),
            path: entry.path().to_path_buf(),
        })?;
        let filename = path_to_slash(relative).ok_or_else(|| {
            PushpackError::io(
                io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
                entry.path(),
            )
        })?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            debug!(%filename, "directory");
            resources.push(Resource::directory(filename));
            continue;
        }
        if !file_type.is_file() {
            match config.special_files {
                SpecialFilePolicy::Reject => {
                    return Err(PushpackError::Unsupported { path: entry.path().to_path_buf() });
                }
                SpecialFilePolicy::Skip => {
                    warn!(path = %entry.path().display(), "skipping entry that is not a regular file");
                    continue;
                }
            }
        }

        let meta = entry.metadata().map_err(|e| PushpackError::io(e.into(), entry.path()))?;
        let (sha1, size) = digest::sha1_file(entry.path())?;
        let mode = config.permission_model.file_mode(fsx::unix_mode(&meta));
        debug!(%filename, %sha1, size, mode = format_args!("{mode:o}"), "file");
        resources.push(Resource::file(filename, sha1, size, mode));
    }

    debug!(root = %root.display(), count = resources.len(), "directory resources gathered");
    Ok(resources)
}
