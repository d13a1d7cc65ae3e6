//! Import pipeline: local mirror → remote store.
//!
//! Joins the per-object files into a single NDJSON bundle, stages it in
//! the scratch directory, and submits it in one overwrite-existing batch.
//! The remote's `success` flag is the sole pass/fail signal: `false` is
//! fatal (the raw response is kept for inspection), while a
//! `successCount` short of the submitted count only warrants a warning.

use std::path::{Path, PathBuf};

use crate::codec::join_files;
use crate::config::objects_dir;
use crate::error::{Error, Result};
use crate::remote::{ImportOutcome, RemoteStore};
use crate::sync::file::{atomic_write, write_bundle, Scratch};

/// Counters reported by a completed import.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportStats {
    /// Documents submitted in the bundle.
    pub submitted: usize,
    /// `successCount` reported by the remote store.
    pub success_count: usize,
}

impl ImportStats {
    /// Documents the remote did not acknowledge. Warned about, never
    /// treated as an error by itself.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.submitted.saturating_sub(self.success_count)
    }
}

/// The import orchestrator.
pub struct ImportPipeline<'a> {
    store: &'a RemoteStore,
    root: PathBuf,
}

impl<'a> ImportPipeline<'a> {
    #[must_use]
    pub fn new(store: &'a RemoteStore, root: &Path) -> Self {
        Self {
            store,
            root: root.to_path_buf(),
        }
    }

    /// Run the import flow.
    ///
    /// With `managed` set, every document is frozen against remote UI
    /// edits before bundling (`togo`); otherwise documents go up
    /// unchanged (`push`).
    ///
    /// # Errors
    ///
    /// Fails on a missing objects directory, an empty mirror, a
    /// transport error, or `success: false` from the remote — in the
    /// last case the raw response is preserved in the scratch directory
    /// and named in the error.
    pub async fn run(&self, managed: bool, scratch: &Scratch) -> Result<ImportStats> {
        let docs = join_files(&objects_dir(&self.root), managed)?;
        if docs.is_empty() {
            return Err(Error::Config(
                "no object files to push (run `kibsync pull` first)".to_string(),
            ));
        }

        let bundle_path = scratch.path("import.ndjson");
        write_bundle(&bundle_path, &docs)?;
        tracing::info!(submitted = docs.len(), managed, "importing bundle");

        let outcome = self.store.import(&bundle_path).await?;
        check_outcome(&outcome, docs.len(), scratch)
    }
}

/// Turn the remote's answer into stats or a fatal rejection.
///
/// A rejection writes the raw response into the scratch directory before
/// failing, so the per-object errors survive for inspection. A shortfall
/// with `success: true` only warns.
///
/// # Errors
///
/// Returns `ImportFailed` naming the preserved response file when the
/// remote reported `success: false`.
fn check_outcome(
    outcome: &ImportOutcome,
    submitted: usize,
    scratch: &Scratch,
) -> Result<ImportStats> {
    if !outcome.success {
        let response_path = scratch.path("import-response.json");
        atomic_write(&response_path, &outcome.raw)?;
        return Err(Error::ImportFailed { response_path });
    }

    let stats = ImportStats {
        submitted,
        success_count: outcome.success_count,
    };
    if stats.shortfall() > 0 {
        tracing::warn!(
            submitted = stats.submitted,
            success_count = stats.success_count,
            "remote acknowledged fewer objects than submitted"
        );
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OBJECTS_DIR;
    use tempfile::TempDir;

    #[test]
    fn test_shortfall() {
        let stats = ImportStats {
            submitted: 15,
            success_count: 12,
        };
        assert_eq!(stats.shortfall(), 3);

        let exact = ImportStats {
            submitted: 5,
            success_count: 5,
        };
        assert_eq!(exact.shortfall(), 0);

        // An over-count (remote created more than submitted) never
        // underflows.
        let over = ImportStats {
            submitted: 2,
            success_count: 3,
        };
        assert_eq!(over.shortfall(), 0);
    }

    #[test]
    fn test_rejected_import_preserves_raw_response() {
        let temp_dir = TempDir::new().unwrap();
        let scratch = Scratch::create(temp_dir.path(), false).unwrap();

        let raw = r#"{"success":false,"successCount":0,"errors":[{"id":"d1","type":"dashboard","error":{"type":"unsupported_type"}}]}"#;
        let outcome = ImportOutcome {
            success: false,
            success_count: 0,
            raw: raw.to_string(),
        };

        let err = check_outcome(&outcome, 3, &scratch).unwrap_err();
        match err {
            Error::ImportFailed { response_path } => {
                assert_eq!(response_path, scratch.path("import-response.json"));
                let kept = std::fs::read_to_string(&response_path).unwrap();
                assert_eq!(kept, raw);
            }
            other => panic!("expected ImportFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_success_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let scratch = Scratch::create(temp_dir.path(), false).unwrap();

        let outcome = ImportOutcome {
            success: true,
            success_count: 2,
            raw: r#"{"success":true,"successCount":2}"#.to_string(),
        };

        let stats = check_outcome(&outcome, 3, &scratch).unwrap();
        assert_eq!(stats.shortfall(), 1);
        // Nothing is preserved when the remote accepted the batch.
        assert!(!scratch.path("import-response.json").exists());
    }

    #[test]
    fn test_empty_mirror_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(OBJECTS_DIR)).unwrap();

        let docs = join_files(&objects_dir(temp_dir.path()), false).unwrap();
        assert!(docs.is_empty());
        // The pipeline refuses to submit an empty bundle; the check lives
        // before any network call, so it is exercised here directly.
    }
}
