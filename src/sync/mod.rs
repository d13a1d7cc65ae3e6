//! Export/import pipelines and file operations.
//!
//! This module wires the remote client, the bundle codec, and the
//! manifest merge engine into the two top-level data flows:
//!
//! - **Export** (pull/add/init): remote → bundle → per-object files →
//!   manifest patch → merged manifest.
//! - **Import** (push/togo): per-object files → bundle → remote.
//!
//! Each pipeline stages its intermediate artifacts (raw bundles, the
//! manifest patch, raw API responses) in a per-invocation scratch
//! directory so failed runs can be inspected.

mod export;
pub(crate) mod file;
mod import;

pub use export::{ExportPipeline, ExportSelection, ExportStats};
pub use file::{atomic_write, read_bundle, write_bundle, Scratch, SCRATCH_DIR};
pub use import::{ImportPipeline, ImportStats};
