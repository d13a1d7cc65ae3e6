//! Import the local mirror into the remote store.

use std::path::Path;

use colored::Colorize;

use crate::cli::commands::run_import;
use crate::config::Config;
use crate::error::Result;

/// Execute the push command.
///
/// With `managed` set every document is frozen against remote UI edits
/// before bundling (the `togo` command); otherwise documents go up
/// unchanged.
///
/// A `successCount` short of the submitted count is reported as a
/// warning, not an error — the remote's `success` flag is the sole
/// pass/fail signal.
///
/// # Errors
///
/// Fails on an empty mirror, a transport error, or an import rejection.
pub fn execute(config: &Config, root: &Path, managed: bool) -> Result<()> {
    let stats = run_import(config, root, managed)?;

    println!(
        "{} {} of {} objects imported",
        "Push complete.".bold(),
        stats.success_count,
        stats.submitted
    );
    if managed {
        println!("  Objects are marked managed (read-only in the remote UI).");
    }
    if stats.shortfall() > 0 {
        println!(
            "{}",
            format!(
                "Warning: {} object(s) were not acknowledged by the remote store.",
                stats.shortfall()
            )
            .yellow()
        );
    }

    Ok(())
}
