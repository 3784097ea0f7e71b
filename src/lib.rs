//! # pushpack Core Library
//!
//! This crate builds the resource manifest of an application push and the
//! archive that carries the files a platform does not already have.
//!
//! It is used by the `pushpack` command-line application, but its public API
//! is meant to be called by whatever layer talks to the platform.
//!
//! ## Key Modules
//!
//! - [`scan`]: Turns a directory tree or an existing archive into an ordered list of [`Resource`]s.
//! - [`pack`]: Turns a resource list back into a zip archive.
//! - [`archive`]: Container traits and the zip codec behind them.
//! - [`fsx`]: The permission model deciding which file modes get recorded.
//!
//! ## Examples
//!
//! ```no_run
//! use pushpack::{PackConfig, Packer};
//!
//! let packer = Packer::new(PackConfig::host());
//! let manifest = packer.gather_directory_resources("./my-app")?;
//! // ... ask the platform which of these it already has, drop those ...
//! let archive = packer.zip_directory_resources("./my-app", &manifest)?;
//! println!("upload {}", archive.display());
//! # Ok::<(), pushpack::PushpackError>(())
//! ```

pub mod archive;
pub mod cli;
pub mod common;
pub mod config;
pub mod digest;
pub mod error;
pub mod fsx;
pub mod pack;
pub mod packer;
pub mod scan;

pub use archive::is_archive;
pub use common::{resources_from_json, resources_to_json, Resource};
pub use config::{Compression, PackConfig, SpecialFilePolicy};
pub use error::{PushpackError, Result};
pub use fsx::{PermissionModel, CANONICAL_FILE_MODE};
pub use packer::{gather_archive_resources, gather_directory_resources, zip_directory_resources, Packer};
