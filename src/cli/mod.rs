//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// kibsync - git-friendly sync for Kibana-style saved objects
///
/// Keeps a local mirror of tracked saved objects (one reviewable JSON
/// file per object, plus a manifest of what is tracked) in sync with a
/// remote store through its batch export/import API.
#[derive(Parser, Debug)]
#[command(name = "kibsync", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credentials file (default: ./.kibsync.env, then ~/.kibsync/env)
    #[arg(long, global = true, env = "KIBSYNC_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Space id (overrides KIBANA_SPACE)
    #[arg(long, global = true)]
    pub space: Option<String>,

    /// Keep per-invocation temp files for inspection
    #[arg(long, global = true)]
    pub debug: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a repository from a full export of the remote space
    Init {
        /// Saved-object types to export (comma-separated)
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<String>>,

        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Verify credentials against the configured space
    Auth,

    /// Track objects and fetch them (plus referenced objects)
    Add {
        /// References as type=id pairs
        #[arg(required = true)]
        refs: Vec<String>,
    },

    /// Re-export everything in the manifest and refresh local files
    Pull,

    /// Import the local files into the remote store
    Push,

    /// Push with every object marked managed (frozen in the remote UI)
    Togo,

    /// Summarize the pending git diff of the object files
    Diff,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
