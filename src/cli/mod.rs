use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Compression, PackConfig, SpecialFilePolicy};
use crate::fsx::PermissionModel;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log every scanned and written entry.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// How file modes are recorded. `host` normalizes on Windows only.
    #[arg(long, value_enum, default_value_t = PermissionArg::Host, global = true)]
    pub permissions: PermissionArg,

    /// What to do with symlinks and other non-regular files found in a directory.
    #[arg(long, value_enum, default_value_t = SpecialArg::Reject, global = true)]
    pub special_files: SpecialArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print the resource manifest of a directory as JSON.
    ScanDir {
        /// The directory to scan.
        #[arg(required = true)]
        dir: PathBuf,
    },

    /// Print the resource manifest of a zip archive as JSON.
    ScanArchive {
        /// The archive to scan.
        #[arg(required = true)]
        archive: PathBuf,
    },

    /// Build an upload archive from a directory or an existing archive.
    Zip {
        /// The directory (or, with --from-archive, the archive) to read file bytes from.
        #[arg(required = true)]
        source: PathBuf,

        /// JSON manifest of the resources to include. If omitted, the whole source is scanned.
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Treat SOURCE as a zip archive instead of a directory.
        #[arg(long)]
        from_archive: bool,

        /// Where to put the archive. Defaults to a new file in the temp directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store file entries without compression.
        #[arg(long)]
        store: bool,
    },
}

/// Permission model selection on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PermissionArg {
    /// Pick the model matching this platform.
    Host,
    /// Record modes exactly as reported.
    Faithful,
    /// Record every file as 0766.
    Normalized,
}

/// Special file handling on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpecialArg {
    /// Fail the scan.
    Reject,
    /// Leave them out of the manifest.
    Skip,
}

impl Args {
    /// Resolves the flags into a [`PackConfig`].
    pub fn pack_config(&self) -> PackConfig {
        let mut config = PackConfig::host();
        config.permission_model = match self.permissions {
            PermissionArg::Host => PermissionModel::host(),
            PermissionArg::Faithful => PermissionModel::Faithful,
            PermissionArg::Normalized => PermissionModel::Normalized,
        };
        config.special_files = match self.special_files {
            SpecialArg::Reject => SpecialFilePolicy::Reject,
            SpecialArg::Skip => SpecialFilePolicy::Skip,
        };
        if let Commands::Zip { store: true, .. } = self.command {
            config.compression = Compression::Stored;
        }
        config
    }
}

/// Parses command-line arguments using `clap`.
pub fn run() -> Result<Args, clap::Error> {
    Args::try_parse()
}

/// Renames `from` onto `to`, falling back to copy-and-delete across
/// filesystems. A failed copy removes both the source and any partial target.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        let _ = fs::remove_file(from);
        return Err(e);
    }
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_resolve_into_config() {
        let args = Args::try_parse_from([
            "pushpack",
            "--permissions",
            "normalized",
            "--special-files",
            "skip",
            "zip",
            "app",
            "--store",
        ])
        .unwrap();
        let config = args.pack_config();
        assert_eq!(config.permission_model, PermissionModel::Normalized);
        assert_eq!(config.special_files, SpecialFilePolicy::Skip);
        assert_eq!(config.compression, Compression::Stored);
    }

    #[test]
    fn defaults_follow_host() {
        let args = Args::try_parse_from(["pushpack", "scan-dir", "app"]).unwrap();
        assert_eq!(args.pack_config(), PackConfig::host());
    }

    #[test]
    fn move_file_renames_onto_target() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let from = dir.path().join("pushpack-1.zip");
        let to = dir.path().join("upload.zip");
        fs::write(&from, "zip bytes")?;

        move_file(&from, &to)?;
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to)?, "zip bytes");
        Ok(())
    }

    #[test]
    fn failed_move_leaves_nothing_behind() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let from = dir.path().join("pushpack-2.zip");
        let to = dir.path().join("missing").join("upload.zip");
        fs::write(&from, "zip bytes")?;

        assert!(move_file(&from, &to).is_err());
        assert!(!from.exists());
        assert!(!to.exists());
        Ok(())
    }
}
