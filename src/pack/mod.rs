//! # Upload Archive Builder
//!
//! Turns a resource list back into a zip archive. Entries are written in the
//! order the list gives them; the caller is responsible for handing over a list
//! that is already depth-first with parents first.
//!
//! File bytes come either from a base directory ([`zip_directory_resources`]) or
//! from an existing archive ([`zip_archive_resources`]). Nothing is hashed here:
//! the SHA-1 carried by each resource is neither verified nor used.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::archive::{ContainerReader, ContainerWriter, ZipContainerReader, ZipContainerWriter};
use crate::common::{bare_name, is_contained, Resource};
use crate::config::PackConfig;
use crate::error::{PushpackError, Result};
use crate::fsx::PermissionModel;

const ARCHIVE_PREFIX: &str = "pushpack-";
const ARCHIVE_SUFFIX: &str = ".zip";

/// Archive entry name for `resource`, or `None` for the archive root itself.
fn entry_name_checked(resource: &Resource) -> Result<Option<String>> {
    let bare = bare_name(resource.filename());
    if bare.is_empty() && resource.is_dir() {
        return Ok(None);
    }
    if !is_contained(bare) {
        return Err(PushpackError::io(
            io::Error::new(io::ErrorKind::InvalidInput, "resource name escapes the archive root"),
            resource.filename(),
        ));
    }
    Ok(Some(resource.entry_name()))
}

/// Writes one entry per resource into `writer`, reading file content from
/// `base/<filename>`, then finishes the container.
pub fn write_directory_resources<W: ContainerWriter + ?Sized>(
    base: &Path,
    resources: &[Resource],
    writer: &mut W,
    model: PermissionModel,
) -> Result<()> {
    for resource in resources {
        let Some(name) = entry_name_checked(resource)? else { continue };
        if resource.is_dir() {
            debug!(%name, "directory entry");
            writer.add_directory(&name)?;
            continue;
        }

        let source = base.join(&name);
        let mut file = File::open(&source).map_err(|e| PushpackError::io(e, &source))?;
        let size = file.metadata().map_err(|e| PushpackError::io(e, &source))?.len();
        let mode = model.file_mode(resource.mode());
        let written = writer.add_file(&name, mode, size, &mut file).map_err(|e| e.at_path(&source))?;
        debug!(%name, written, mode = format_args!("{mode:o}"), "file entry");
    }
    writer.finish()
}

/// Like [`write_directory_resources`], but copies file content out of an open
/// source container. Resources missing from the source fail with
/// [`PushpackError::NotFound`].
pub fn write_archive_resources<R, W>(
    source: &mut R,
    resources: &[Resource],
    writer: &mut W,
    model: PermissionModel,
) -> Result<()>
where
    R: ContainerReader + ?Sized,
    W: ContainerWriter + ?Sized,
{
    let source_path = source.path().to_path_buf();
    for resource in resources {
        let Some(name) = entry_name_checked(resource)? else { continue };
        if resource.is_dir() {
            debug!(%name, "directory entry");
            writer.add_directory(&name)?;
            continue;
        }

        let index = source
            .index_of(&name)?
            .ok_or_else(|| PushpackError::NotFound { path: PathBuf::from(resource.filename()) })?;
        let mut entry = source.open_entry(index)?;
        let mode = model.file_mode(resource.mode());
        let written = writer
            .add_file(&name, mode, entry.info.size, &mut entry.content)
            .map_err(|e| e.at_path(&source_path))?;
        debug!(%name, written, mode = format_args!("{mode:o}"), "file entry");
    }
    writer.finish()
}

fn new_archive_file(config: &PackConfig) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(ARCHIVE_PREFIX).suffix(ARCHIVE_SUFFIX);
    match &config.temp_dir {
        Some(dir) => builder.tempfile_in(dir).map_err(|e| PushpackError::io(e, dir)),
        None => builder.tempfile().map_err(|e| PushpackError::io(e, std::env::temp_dir())),
    }
}

/// Runs `fill` against a fresh archive file and keeps the file only if it
/// succeeds. On any error the partial archive is removed.
fn build_archive<F>(config: &PackConfig, fill: F) -> Result<PathBuf>
where
    F: FnOnce(&mut ZipContainerWriter<BufWriter<&mut File>>) -> Result<()>,
{
    let mut archive = new_archive_file(config)?;
    let archive_path = archive.path().to_path_buf();
    {
        let mut writer = ZipContainerWriter::new(BufWriter::new(archive.as_file_mut()), config.compression)
            .with_path(&archive_path);
        fill(&mut writer).map_err(|e| e.at_path(&archive_path))?;
    }
    archive
        .into_temp_path()
        .keep()
        .map_err(|e| PushpackError::io(e.error, &archive_path))
}

/// Builds an archive from `resources`, reading file bytes from `base`, and
/// returns the path of the new archive. The caller owns the file.
pub fn zip_directory_resources(base: &Path, resources: &[Resource], config: &PackConfig) -> Result<PathBuf> {
    debug!(base = %base.display(), count = resources.len(), "zipping directory resources");
    let path = build_archive(config, |writer| {
        write_directory_resources(base, resources, writer, config.permission_model)
    })?;
    debug!(archive = %path.display(), "archive written");
    Ok(path)
}

/// Builds an archive from `resources`, copying file bytes out of the archive
/// at `source`, and returns the path of the new archive.
pub fn zip_archive_resources(source: &Path, resources: &[Resource], config: &PackConfig) -> Result<PathBuf> {
    debug!(source = %source.display(), count = resources.len(), "zipping archive resources");
    let mut reader = ZipContainerReader::open(source)?;
    let path = build_archive(config, |writer| {
        write_archive_resources(&mut reader, resources, writer, config.permission_model)
    })?;
    debug!(archive = %path.display(), "archive written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ContainerEntry, EntryInfo};
    use std::io::Read;

    /// Records what the builder asks of a container.
    #[derive(Default)]
    struct RecordingWriter {
        calls: Vec<String>,
        finished: bool,
    }

    impl ContainerWriter for RecordingWriter {
        fn add_directory(&mut self, name: &str) -> Result<()> {
            self.calls.push(format!("dir {name}"));
            Ok(())
        }

        fn add_file(&mut self, name: &str, mode: u32, size: u64, content: &mut dyn Read) -> Result<u64> {
            let mut buf = String::new();
            content.read_to_string(&mut buf)?;
            self.calls.push(format!("file {name} {mode:o} {size} {buf}"));
            Ok(buf.len() as u64)
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn writes_in_given_order_without_resorting() -> Result<()> {
        let base = tempfile::tempdir()?;
        std::fs::create_dir(base.path().join("b"))?;
        std::fs::write(base.path().join("b").join("x"), "bx")?;
        std::fs::write(base.path().join("a"), "a")?;

        let resources = vec![
            Resource::directory("b"),
            Resource::file("b/x", "unused", 2, 0o640),
            Resource::file("/a", "unused", 1, 0o600),
        ];
        let mut writer = RecordingWriter::default();
        write_directory_resources(base.path(), &resources, &mut writer, PermissionModel::Faithful)?;

        assert_eq!(writer.calls, vec!["dir b/", "file b/x 640 2 bx", "file a 600 1 a"]);
        assert!(writer.finished);
        Ok(())
    }

    #[test]
    fn normalized_model_forces_canonical_mode() -> Result<()> {
        let base = tempfile::tempdir()?;
        std::fs::write(base.path().join("f"), "f")?;
        let mut writer = RecordingWriter::default();
        write_directory_resources(
            base.path(),
            &[Resource::file("f", "unused", 1, 0o000)],
            &mut writer,
            PermissionModel::Normalized,
        )?;
        assert_eq!(writer.calls, vec!["file f 766 1 f"]);
        Ok(())
    }

    #[test]
    fn missing_source_file_fails_before_finish() -> Result<()> {
        let base = tempfile::tempdir()?;
        let mut writer = RecordingWriter::default();
        let err = write_directory_resources(
            base.path(),
            &[Resource::file("gone.txt", "unused", 1, 0o644)],
            &mut writer,
            PermissionModel::Faithful,
        )
        .unwrap_err();
        assert!(matches!(err, PushpackError::Io { .. }));
        assert!(!writer.finished);
        Ok(())
    }

    #[test]
    fn escaping_names_are_rejected() -> Result<()> {
        let base = tempfile::tempdir()?;
        let mut writer = RecordingWriter::default();
        let err = write_directory_resources(
            base.path(),
            &[Resource::file("../etc/passwd", "unused", 1, 0o644)],
            &mut writer,
            PermissionModel::Faithful,
        )
        .unwrap_err();
        match err {
            PushpackError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::InvalidInput),
            other => panic!("unexpected error: {other}"),
        }
        assert!(writer.calls.is_empty());
        Ok(())
    }

    struct OneEntry;

    impl ContainerReader for OneEntry {
        fn len(&self) -> usize {
            1
        }

        fn open_entry(&mut self, _index: usize) -> Result<ContainerEntry<'_>> {
            let info = EntryInfo { name: "lib/app.jar".into(), is_dir: false, size: 3, unix_mode: Some(0o100644) };
            Ok(ContainerEntry { info, content: Box::new(&b"jar"[..]) })
        }

        fn index_of(&mut self, name: &str) -> Result<Option<usize>> {
            Ok((name == "lib/app.jar").then_some(0))
        }

        fn path(&self) -> &Path {
            Path::new("source.zip")
        }
    }

    #[test]
    fn archive_source_copies_entries_and_reports_missing_ones() -> Result<()> {
        let mut writer = RecordingWriter::default();
        write_archive_resources(
            &mut OneEntry,
            &[
                Resource::directory("/"),
                Resource::directory("/lib/"),
                Resource::file("/lib/app.jar", "unused", 3, 0o644),
            ],
            &mut writer,
            PermissionModel::Faithful,
        )?;
        assert_eq!(writer.calls, vec!["dir lib/", "file lib/app.jar 644 3 jar"]);

        let err = write_archive_resources(
            &mut OneEntry,
            &[Resource::file("/lib/other.jar", "unused", 3, 0o644)],
            &mut RecordingWriter::default(),
            PermissionModel::Faithful,
        )
        .unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn size_hint_comes_from_the_file_not_the_record() -> Result<()> {
        let base = tempfile::tempdir()?;
        std::fs::write(base.path().join("grown"), "now longer")?;
        let mut writer = RecordingWriter::default();
        write_directory_resources(
            base.path(),
            &[Resource::file("grown", "unused", 3, 0o644)],
            &mut writer,
            PermissionModel::Faithful,
        )?;
        assert_eq!(writer.calls, vec!["file grown 644 10 now longer"]);
        Ok(())
    }
}
