//! # Manifest Scanners
//!
//! Both scanners produce the same [`crate::Resource`] shape:
//! - [`gather_directory_resources`] walks a local tree.
//! - [`gather_archive_resources`] reads an existing zip archive.

mod archive;
mod directory;

pub use archive::{gather_archive_resources, read_container_resources};
pub use directory::gather_directory_resources;
