//! Summarize the pending git diff of the object files.
//!
//! Collects `git diff` scoped to the objects directory, chunks it, and
//! asks the configured summarization endpoint to describe the changes in
//! user-facing terms. An empty diff short-circuits without any request.

use std::path::Path;
use std::process::Command;

use colored::Colorize;

use crate::config::{Config, OBJECTS_DIR};
use crate::error::{Error, Result};
use crate::summarize::{chunk_lines, Summarizer, CHUNK_LINES, NO_CHANGES};
use crate::sync::{atomic_write, Scratch};

/// Execute the diff command.
///
/// # Errors
///
/// Fails if git is unavailable, the summarizer endpoint is not
/// configured, or a summarization request fails.
pub fn execute(config: &Config, root: &Path) -> Result<()> {
    let diff = git_diff(root)?;
    if diff.trim().is_empty() {
        println!("{}", NO_CHANGES.green());
        return Ok(());
    }

    let summarizer_config = config.summarizer.clone().ok_or_else(|| {
        Error::Config("AI_ENDPOINT is not configured; cannot summarize the diff".to_string())
    })?;

    let scratch = Scratch::create(root, config.keep_temp)?;
    atomic_write(&scratch.path("diff.patch"), &diff)?;
    for (index, chunk) in chunk_lines(&diff, CHUNK_LINES).iter().enumerate() {
        atomic_write(&scratch.path(&format!("diff-chunk-{:03}.patch", index + 1)), chunk)?;
    }

    let summarizer = Summarizer::new(summarizer_config);
    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(summarizer.summarize(&diff))?;

    println!("{}", "Change summary".bold().underline());
    println!();
    println!("{summary}");

    scratch.finish()?;
    Ok(())
}

/// Unified diff of the objects directory against the git index.
fn git_diff(root: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["diff", "--", OBJECTS_DIR])
        .current_dir(root)
        .output()
        .map_err(|e| Error::Other(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(Error::Other(format!(
            "git diff failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
