//! Refresh the local mirror from the remote store.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::run_export;
use crate::config::Config;
use crate::error::Result;
use crate::sync::ExportSelection;

/// Execute the pull command.
///
/// Exports everything in the manifest (plus the reference closure),
/// rewrites the per-object files, and merges newly discovered references
/// back into the manifest.
///
/// # Errors
///
/// Fails on a missing manifest or any pipeline error.
pub fn execute(config: &Config, root: &Path) -> Result<()> {
    let stats = run_export(config, root, ExportSelection::Manifest)?;

    println!("{}", "Pull complete".bold());
    println!("  Files refreshed: {}", stats.written);
    if stats.added > 0 {
        println!(
            "  {} new reference(s) picked up by the closure",
            stats.added
        );
    }
    println!();
    println!("{}", "Review with `git diff` or `kibsync diff`.".dimmed());

    Ok(())
}
