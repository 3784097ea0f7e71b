//! # Archive Containers
//!
//! Scanners and builders talk to archives through the [`ContainerReader`] and
//! [`ContainerWriter`] traits so their logic does not depend on a particular
//! codec. The zip codec in [`zip_codec`] is the implementation linked in today.

use std::io::Read;
use std::path::Path;

use crate::error::{PushpackError, Result};

pub mod zip_codec;

pub use zip_codec::{ZipContainerReader, ZipContainerWriter};

/// Metadata of one stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// The name exactly as stored in the container.
    pub name: String,
    /// True if this entry represents a directory.
    pub is_dir: bool,
    /// The uncompressed size of the entry's content.
    pub size: u64,
    /// The Unix mode recorded for the entry, if the container carries one.
    pub unix_mode: Option<u32>,
}

/// An entry opened for reading. `content` borrows the container.
pub struct ContainerEntry<'a> {
    pub info: EntryInfo,
    pub content: Box<dyn Read + 'a>,
}

/// Read side of an archive container: list entries in stored order and read
/// their bytes.
pub trait ContainerReader {
    /// Number of entries in the container.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens the entry at `index` (stored order).
    fn open_entry(&mut self, index: usize) -> Result<ContainerEntry<'_>>;

    /// Index of the entry stored under `name`. The lookup ignores a leading
    /// slash and backslash separators; a trailing slash still tells
    /// directories from files.
    fn index_of(&mut self, name: &str) -> Result<Option<usize>>;

    /// Location of the container, used in error reports.
    fn path(&self) -> &Path;
}

/// Write side of an archive container: append entries, then finish.
pub trait ContainerWriter {
    /// Appends a directory entry with no content.
    fn add_directory(&mut self, name: &str) -> Result<()>;

    /// Appends a file entry with the given permission bits, copying `content`
    /// into it. `size` is the expected content length; entries that may exceed
    /// 4 GiB need it to pick the large-file layout up front. Returns the number
    /// of bytes written.
    fn add_file(&mut self, name: &str, mode: u32, size: u64, content: &mut dyn Read) -> Result<u64>;

    /// Writes any trailing structures and flushes the sink.
    fn finish(&mut self) -> Result<()>;
}

/// Returns true if `path` is a regular file that opens as a zip container.
pub fn is_archive(path: &Path) -> Result<bool> {
    let meta = std::fs::metadata(path).map_err(|e| PushpackError::opening(e, path))?;
    if !meta.is_file() {
        return Ok(false);
    }
    match ZipContainerReader::open(path) {
        Ok(_) => Ok(true),
        Err(PushpackError::Format { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
