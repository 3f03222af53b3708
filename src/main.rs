//! nbdrive command-line interface.
//!
//! A thin host over [`nbdrive::Drive`]: every command prints the resulting
//! model as JSON on stdout; logs go to stderr.

#![deny(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nbdrive::{ContentFormat, ContentKind};

mod commands;

#[derive(Parser)]
#[command(name = "nbdrive", version, about = "Notebook contents on a flat object store")]
struct Cli {
    /// Config file (default: ~/.nbdrive/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Principal to act as, overriding the config file
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Bucket directory, overriding storage.root (implies the filesystem backend)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory one level deep
    Ls {
        #[arg(default_value = "")]
        path: String,
    },

    /// Print the model of a file, notebook or directory
    Get {
        path: String,

        /// Content kind: file, notebook or directory (guessed when omitted)
        #[arg(long = "type")]
        kind: Option<ContentKind>,

        /// File format: text or base64 (from the stored mime type when omitted)
        #[arg(long)]
        format: Option<ContentFormat>,

        /// Print metadata only
        #[arg(long)]
        no_content: bool,
    },

    /// Upload a local file; `.ipynb` paths must hold a JSON object
    Put {
        path: String,

        /// Local file to upload
        source: PathBuf,

        #[arg(long = "type")]
        kind: Option<ContentKind>,
    },

    /// Delete a file (with its checkpoints) or a directory
    Rm { path: String },

    /// Rename a file (with its checkpoints) or a directory
    Mv { old: String, new: String },

    /// Manage checkpoints
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CheckpointAction {
    /// Checkpoint the current content of a path
    Create { path: String },

    /// List checkpoints of a path
    List {
        path: String,

        /// Include checkpoints under every id, not just the configured one
        #[arg(long)]
        all: bool,
    },

    /// Write a checkpoint back onto its path
    Restore {
        path: String,

        /// Checkpoint id (default: the configured id)
        #[arg(long)]
        id: Option<String>,
    },

    /// Delete checkpoints of a path
    Delete {
        path: String,

        #[arg(long, conflicts_with = "all")]
        id: Option<String>,

        /// Delete every checkpoint of the path
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let drive = commands::open_drive(cli.config.as_deref(), cli.user, cli.root)?;

    match cli.command {
        Commands::Ls { path } => commands::contents::ls(&drive, &path),
        Commands::Get {
            path,
            kind,
            format,
            no_content,
        } => commands::contents::get(&drive, &path, kind, format, !no_content),
        Commands::Put { path, source, kind } => commands::contents::put(&drive, &path, &source, kind),
        Commands::Rm { path } => commands::contents::rm(&drive, &path),
        Commands::Mv { old, new } => commands::contents::mv(&drive, &old, &new),
        Commands::Checkpoint { action } => commands::checkpoint::execute(&drive, action),
    }
}

/// Log to stderr so stdout stays clean JSON.
fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
