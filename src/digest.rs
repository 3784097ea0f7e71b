//! SHA-1 content fingerprints.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{PushpackError, Result};

/// Hashes everything `reader` yields, returning the lowercase hex digest and
/// the number of bytes consumed.
pub fn sha1_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<(String, u64)> {
    let mut hasher = Sha1::new();
    let size = io::copy(reader, &mut hasher)?;
    Ok((format!("{:x}", hasher.finalize()), size))
}

/// Hashes the full content of the file at `path`.
pub fn sha1_file(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path).map_err(|e| PushpackError::io(e, path))?;
    sha1_reader(&mut file).map_err(|e| PushpackError::io(e, path))
}

/// Hex digest of an in-memory buffer.
pub fn sha1_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}
