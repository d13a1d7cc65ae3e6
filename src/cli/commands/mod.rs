//! Command implementations.
//!
//! Commands are thin: they resolve inputs, bridge into the async remote
//! client with a per-command tokio runtime, and print summaries. The
//! pipelines in [`crate::sync`] do the work.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::remote::RemoteStore;
use crate::sync::{
    ExportPipeline, ExportSelection, ExportStats, ImportPipeline, ImportStats, Scratch,
};

pub mod add;
pub mod auth;
pub mod completions;
pub mod diff;
pub mod init;
pub mod pull;
pub mod push;
pub mod togo;

/// Run an export pipeline to completion, cleaning up scratch files only
/// when the whole flow succeeded.
pub(crate) fn run_export(
    config: &Config,
    root: &Path,
    selection: ExportSelection,
) -> Result<ExportStats> {
    let store = RemoteStore::new(config);
    let pipeline = ExportPipeline::new(&store, root);
    let scratch = Scratch::create(root, config.keep_temp)?;

    let rt = tokio::runtime::Runtime::new()?;
    let stats = rt.block_on(pipeline.run(selection, &scratch))?;

    scratch.finish()?;
    Ok(stats)
}

/// Run an import pipeline to completion. On failure the scratch directory
/// (including any preserved raw response) stays behind.
pub(crate) fn run_import(config: &Config, root: &Path, managed: bool) -> Result<ImportStats> {
    let store = RemoteStore::new(config);
    let pipeline = ImportPipeline::new(&store, root);
    let scratch = Scratch::create(root, config.keep_temp)?;

    let rt = tokio::runtime::Runtime::new()?;
    let stats = rt.block_on(pipeline.run(managed, &scratch))?;

    scratch.finish()?;
    Ok(stats)
}
