//! The resource record shared by scanners and builders, plus the path rules
//! every operation agrees on.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::Result;

/// One file or directory of a push payload.
///
/// A resource is a directory exactly when it has no SHA-1. Directories carry a
/// zero size and a zero mode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "WireResource", into = "WireResource")]
pub struct Resource {
    filename: String,
    sha1: Option<String>,
    size: u64,
    mode: u32,
}

impl Resource {
    pub fn directory(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), sha1: None, size: 0, mode: 0 }
    }

    pub fn file(filename: impl Into<String>, sha1: impl Into<String>, size: u64, mode: u32) -> Self {
        Self { filename: filename.into(), sha1: Some(sha1.into()), size, mode }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercase hex SHA-1 of the content; `None` for directories.
    pub fn sha1(&self) -> Option<&str> {
        self.sha1.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.sha1.is_none()
    }

    /// The name this resource is stored under inside an archive: no leading
    /// slash, and a trailing slash only for directories.
    pub fn entry_name(&self) -> String {
        let bare = bare_name(&self.filename);
        if self.is_dir() {
            format!("{bare}/")
        } else {
            bare.to_string()
        }
    }
}

/// Shape of a resource in the match negotiation payload. The mode travels as an
/// octal string.
#[derive(Serialize, Deserialize)]
struct WireResource {
    #[serde(rename = "fn")]
    filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha1: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(default, with = "octal_mode")]
    mode: u32,
}

impl From<WireResource> for Resource {
    fn from(wire: WireResource) -> Self {
        match wire.sha1 {
            Some(sha1) if !sha1.is_empty() => Resource::file(wire.filename, sha1, wire.size, wire.mode),
            _ => Resource::directory(wire.filename),
        }
    }
}

impl From<Resource> for WireResource {
    fn from(resource: Resource) -> Self {
        WireResource {
            filename: resource.filename,
            sha1: resource.sha1,
            size: resource.size,
            mode: resource.mode,
        }
    }
}

mod octal_mode {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mode: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{mode:o}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        u32::from_str_radix(&raw, 8).map_err(|e| D::Error::custom(format!("invalid octal mode '{raw}': {e}")))
    }
}

/// Encodes a manifest as the JSON array sent to the match negotiation.
pub fn resources_to_json(resources: &[Resource]) -> Result<String> {
    Ok(serde_json::to_string(resources)?)
}

/// Decodes a manifest returned by the match negotiation.
pub fn resources_from_json(json: &str) -> Result<Vec<Resource>> {
    Ok(serde_json::from_str(json)?)
}

/// Joins the components of a relative path with forward slashes.
/// Returns `None` if a component is not valid UTF-8 or is not a plain name.
pub(crate) fn path_to_slash(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Archive-rooted form of a stored entry name: forward slashes, one leading slash.
pub fn archive_filename(stored: &str) -> String {
    let s = stored.replace('\\', "/");
    if s.starts_with('/') {
        s
    } else {
        format!("/{s}")
    }
}

/// Strips the archive-root slash and any trailing directory slash.
pub fn bare_name(filename: &str) -> &str {
    filename.trim_start_matches('/').trim_end_matches('/')
}

/// True if `name` stays inside whatever base it is joined onto.
pub(crate) fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && name.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn directory_carries_no_content_fields() {
        let dir = Resource::directory("level1");
        assert!(dir.is_dir());
        assert_eq!(dir.sha1(), None);
        assert_eq!(dir.size(), 0);
        assert_eq!(dir.mode(), 0);
    }

    #[test]
    fn entry_names() {
        assert_eq!(Resource::directory("level1/level2").entry_name(), "level1/level2/");
        assert_eq!(Resource::directory("/level1/").entry_name(), "level1/");
        assert_eq!(Resource::file("/tmpFile2", "abc", 1, 0o644).entry_name(), "tmpFile2");
    }

    #[test]
    fn archive_filename_adds_root_once() {
        assert_eq!(archive_filename("level1/"), "/level1/");
        assert_eq!(archive_filename("/level1/"), "/level1/");
        assert_eq!(archive_filename("a\\b.txt"), "/a/b.txt");
    }

    #[test]
    fn path_to_slash_uses_forward_slashes() {
        let rel: PathBuf = ["level1", "level2", "tmpFile1"].iter().collect();
        assert_eq!(path_to_slash(&rel).as_deref(), Some("level1/level2/tmpFile1"));
        assert_eq!(path_to_slash(Path::new("../escape")), None);
    }

    #[test]
    fn containment() {
        assert!(is_contained("level1/level2/tmpFile1"));
        assert!(!is_contained("../outside"));
        assert!(!is_contained("a//b"));
        assert!(!is_contained(""));
    }

    #[test]
    fn wire_shape_uses_octal_mode_and_fn_key() -> Result<()> {
        let json = resources_to_json(&[
            Resource::directory("level1"),
            Resource::file("tmpFile3", "f4c9ca85f3e084ffad3abbdabbd2a890c034c879", 10, 0o766),
        ])?;
        assert_eq!(
            json,
            r#"[{"fn":"level1","size":0,"mode":"0"},{"fn":"tmpFile3","sha1":"f4c9ca85f3e084ffad3abbdabbd2a890c034c879","size":10,"mode":"766"}]"#
        );
        Ok(())
    }

    #[test]
    fn decoding_tolerates_missing_fields() -> Result<()> {
        let resources = resources_from_json(r#"[{"fn":"dir"},{"fn":"f","sha1":"aa","size":3,"mode":"644"},{"fn":"d2","sha1":""}]"#)?;
        assert_eq!(resources[0], Resource::directory("dir"));
        assert_eq!(resources[1], Resource::file("f", "aa", 3, 0o644));
        assert!(resources[2].is_dir());
        Ok(())
    }

    #[test]
    fn decoding_rejects_non_octal_mode() {
        assert!(resources_from_json(r#"[{"fn":"f","sha1":"aa","size":1,"mode":"9"}]"#).is_err());
    }
}
