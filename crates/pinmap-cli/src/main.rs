#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::fn_params_excessive_bools)]

mod assets;
mod commands;
mod logging;
mod manifest;

use clap::Parser;
use commands::ProjectOptions;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pinmap")]
#[command(author, version, about = "Resolve pinned JavaScript modules into an import map", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Import map manifest, relative to the working directory
    #[arg(long, global = true, value_name = "PATH", default_value = manifest::DEFAULT_MANIFEST, env = "PINMAP_MANIFEST")]
    manifest: PathBuf,

    /// Accept an additional source extension (repeatable, e.g. -e jsx)
    #[arg(short = 'e', long = "extension", global = true, value_name = "EXT")]
    extensions: Vec<String>,

    /// Asset load path (repeatable); defaults to app/javascript and vendor/javascript
    #[arg(long = "load-path", global = true, value_name = "DIR")]
    load_paths: Vec<PathBuf>,

    /// URL prefix for resolved assets
    #[arg(long, global = true, default_value = "/assets", env = "PINMAP_PREFIX")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the import map JSON
    Json,

    /// Print the resolved URLs of preloaded modules
    Preload,

    /// Print the digest of the import map JSON
    Digest,

    /// List declared pins and their expansion
    Pins,

    /// Watch load paths and print the digest whenever it changes
    Watch {
        /// Use mtime polling instead of OS file notifications
        #[arg(long)]
        poll: bool,

        /// Milliseconds between change checks
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let load_paths = if cli.load_paths.is_empty() {
        pinmap_core::MapConfig::default().cache_sweepers
    } else {
        cli.load_paths
    };
    let options = ProjectOptions {
        manifest: cwd.join(&cli.manifest),
        root: cwd,
        extensions: cli.extensions,
        load_paths,
        prefix: cli.prefix,
    };

    match cli.command {
        Commands::Version => commands::version::run(),
        Commands::Json => commands::map::json(&options),
        Commands::Preload => commands::map::preload(&options, cli.json),
        Commands::Digest => commands::map::digest(&options, cli.json),
        Commands::Pins => commands::pins::run(&options, cli.json),
        Commands::Watch { poll, interval_ms } => {
            commands::watch::run(&options, interval_ms, poll, cli.json)
        }
    }
}
