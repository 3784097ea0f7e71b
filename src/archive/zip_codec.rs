//! Zip implementation of the container traits.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ContainerEntry, ContainerReader, ContainerWriter, EntryInfo};
use crate::config::Compression;
use crate::error::{PushpackError, Result};

fn zip_error(err: ZipError, path: &Path) -> PushpackError {
    match err {
        ZipError::Io(e) => PushpackError::io(e, path),
        other => PushpackError::Format { path: path.to_path_buf(), reason: other.to_string() },
    }
}

const COPY_BUFFER_SIZE: usize = 64 * 1024;
// Largest entry size the plain zip headers can describe.
const ZIP32_LIMIT: u64 = u32::MAX as u64;

fn lookup_key(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Reads entries of a zip archive in stored order.
pub struct ZipContainerReader<R: Read + Seek = BufReader<File>> {
    archive: ZipArchive<R>,
    path: PathBuf,
    // Built on first lookup.
    names: Option<HashMap<String, usize>>,
}

impl ZipContainerReader<BufReader<File>> {
    /// Opens the archive at `path`. A missing path is [`PushpackError::NotFound`],
    /// a file that is not a zip container is [`PushpackError::Format`].
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PushpackError::opening(e, path))?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> ZipContainerReader<R> {
    /// Wraps an already open source. `path` is only used in error reports.
    pub fn from_reader(reader: R, path: &Path) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| zip_error(e, path))?;
        Ok(Self { archive, path: path.to_path_buf(), names: None })
    }
}

impl<R: Read + Seek> ContainerReader for ZipContainerReader<R> {
    fn len(&self) -> usize {
        self.archive.len()
    }

    fn open_entry(&mut self, index: usize) -> Result<ContainerEntry<'_>> {
        let file = self.archive.by_index(index).map_err(|e| zip_error(e, &self.path))?;
        let info = EntryInfo {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            size: file.size(),
            unix_mode: file.unix_mode(),
        };
        Ok(ContainerEntry { info, content: Box::new(file) })
    }

    fn index_of(&mut self, name: &str) -> Result<Option<usize>> {
        if self.names.is_none() {
            let mut names = HashMap::with_capacity(self.archive.len());
            for index in 0..self.archive.len() {
                let file = self.archive.by_index_raw(index).map_err(|e| zip_error(e, &self.path))?;
                names.entry(lookup_key(file.name())).or_insert(index);
            }
            self.names = Some(names);
        }
        Ok(self.names.as_ref().and_then(|names| names.get(&lookup_key(name)).copied()))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Appends entries to a zip archive written into `W`.
pub struct ZipContainerWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    method: CompressionMethod,
    // Reported on errors raised by the sink; read errors carry no path.
    path: PathBuf,
}

impl<W: Write + Seek> ZipContainerWriter<W> {
    pub fn new(sink: W, compression: Compression) -> Self {
        let method = match compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };
        Self { zip: ZipWriter::new(sink), method, path: PathBuf::new() }
    }

    /// Names the archive being written so sink failures point at it.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = path.to_path_buf();
        self
    }
}

impl<W: Write + Seek> ContainerWriter for ZipContainerWriter<W> {
    fn add_directory(&mut self, name: &str) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.add_directory(name, options).map_err(|e| zip_error(e, &self.path))
    }

    fn add_file(&mut self, name: &str, mode: u32, size: u64, content: &mut dyn Read) -> Result<u64> {
        let options = FileOptions::default()
            .compression_method(self.method)
            .unix_permissions(mode)
            .large_file(size > ZIP32_LIMIT);
        self.zip.start_file(name, options).map_err(|e| zip_error(e, &self.path))?;

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut written = 0u64;
        loop {
            let n = match content.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.zip.write_all(&buf[..n]).map_err(|e| PushpackError::io(e, &self.path))?;
            written += n as u64;
        }
        Ok(written)
    }

    fn finish(&mut self) -> Result<()> {
        let mut sink = self.zip.finish().map_err(|e| zip_error(e, &self.path))?;
        sink.flush().map_err(|e| PushpackError::io(e, &self.path))
    }
}
