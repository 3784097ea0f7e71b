//! Main entry point for the pushpack CLI app

use pushpack::cli::{self, Args, Commands};
use pushpack::{resources_from_json, resources_to_json, Packer};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    let args = match cli::run() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    init_logging(args.verbose);

    if let Err(e) = run_app(&args) {
        eprintln!("Error: {}", e);
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Manifests go to stdout, so logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_app(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let packer = Packer::new(args.pack_config());

    match &args.command {
        Commands::ScanDir { dir } => {
            let resources = packer.gather_directory_resources(dir)?;
            println!("{}", resources_to_json(&resources)?);
        }
        Commands::ScanArchive { archive } => {
            let resources = packer.gather_archive_resources(archive)?;
            println!("{}", resources_to_json(&resources)?);
        }
        Commands::Zip { source, manifest, from_archive, output, .. } => {
            let resources = match manifest {
                Some(path) => resources_from_json(&fs::read_to_string(path)?)?,
                None if *from_archive => packer.gather_archive_resources(source)?,
                None => packer.gather_directory_resources(source)?,
            };
            let built = if *from_archive {
                packer.zip_archive_resources(source, &resources)?
            } else {
                packer.zip_directory_resources(source, &resources)?
            };
            let location = match output {
                Some(target) => {
                    cli::move_file(&built, target)?;
                    target.clone()
                }
                None => built,
            };
            println!("{}", location.display());
        }
    }

    Ok(())
}

