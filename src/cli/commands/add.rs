//! Track new objects and fetch them.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::run_export;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::parse_ref;
use crate::sync::ExportSelection;

/// Execute the add command.
///
/// Each argument is a `type=id` pair. The referenced objects are
/// exported together with their reference closure, written to the local
/// mirror, and merged into the manifest.
///
/// # Errors
///
/// Fails on a malformed reference before anything is fetched, or on any
/// pipeline error.
pub fn execute(config: &Config, root: &Path, refs: &[String]) -> Result<()> {
    let refs = refs
        .iter()
        .map(|arg| parse_ref(arg))
        .collect::<Result<Vec<_>>>()?;
    let requested = refs.len();

    let stats = run_export(config, root, ExportSelection::Refs(refs))?;

    println!("{}", "Add complete".bold());
    println!("  Requested: {requested}");
    println!("  Fetched (with references): {}", stats.fetched);
    println!("  Newly tracked: {}", stats.added);

    Ok(())
}
