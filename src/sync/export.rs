//! Export pipeline: remote store → local mirror.
//!
//! One linear flow, failing fast on the first error:
//!
//! 1. Build the export request from the selection (the manifest, explicit
//!    refs, or a type list for `init`).
//! 2. Fetch the bundle (requested objects plus reference closure) and
//!    stage it in the scratch directory.
//! 3. Split the bundle into normalized per-object files.
//! 4. Derive a manifest patch from the bundle and merge it into the
//!    master manifest, picking up any references the closure dragged in.

use std::path::{Path, PathBuf};

use crate::codec::split_bundle;
use crate::config::{manifest_path, objects_dir};
use crate::error::Result;
use crate::manifest::{merge_into, Manifest, ObjectRef};
use crate::remote::{ExportRequest, RemoteStore};
use crate::sync::file::{write_bundle, Scratch};

/// What to ask the remote store for.
#[derive(Debug, Clone)]
pub enum ExportSelection {
    /// Everything the manifest tracks (`pull`).
    Manifest,
    /// An explicit reference list (`add`).
    Refs(Vec<ObjectRef>),
    /// Every object of the given types (`init`).
    Types(Vec<String>),
}

/// Counters reported by a completed export.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportStats {
    /// Documents in the fetched bundle (summary record excluded).
    pub fetched: usize,
    /// Object files written.
    pub written: usize,
    /// References newly added to the manifest.
    pub added: usize,
}

/// The export orchestrator.
pub struct ExportPipeline<'a> {
    store: &'a RemoteStore,
    root: PathBuf,
}

impl<'a> ExportPipeline<'a> {
    #[must_use]
    pub fn new(store: &'a RemoteStore, root: &Path) -> Self {
        Self {
            store,
            root: root.to_path_buf(),
        }
    }

    /// Run the export flow for a selection.
    ///
    /// The master manifest must already exist on disk (`init` saves an
    /// empty one before its full export).
    ///
    /// # Errors
    ///
    /// Fails fast on a missing manifest, a remote error envelope, or any
    /// IO failure. Nothing is retried.
    pub async fn run(
        &self,
        selection: ExportSelection,
        scratch: &Scratch,
    ) -> Result<ExportStats> {
        let request = build_request(&selection, &manifest_path(&self.root))?;

        let bundle = self.store.export(&request).await?;
        write_bundle(&scratch.path("export.ndjson"), &bundle)?;

        let entries = split_bundle(&bundle, &objects_dir(&self.root))?;
        for entry in &entries {
            tracing::debug!(
                object = %entry.object,
                title = entry.title.as_deref().unwrap_or("-"),
                "wrote {}",
                entry.path.display()
            );
        }

        let patch = Manifest::from_bundle(&bundle);
        let patch_path = scratch.path("manifest-patch.json");
        patch.save(&patch_path)?;

        let added = merge_into(&manifest_path(&self.root), &patch_path)?;

        Ok(ExportStats {
            fetched: entries.len(),
            written: entries.len(),
            added,
        })
    }
}

/// Build the request body for a selection.
///
/// The `Manifest` selection loads the master manifest and posts it as-is.
///
/// # Errors
///
/// Returns `ManifestMissing` when pulling without a manifest on disk.
fn build_request(selection: &ExportSelection, manifest: &Path) -> Result<ExportRequest> {
    match selection {
        ExportSelection::Manifest => {
            let manifest = Manifest::load(manifest)?;
            Ok(ExportRequest::from_manifest(&manifest))
        }
        ExportSelection::Refs(refs) => Ok(ExportRequest::from_refs(refs.clone())),
        ExportSelection::Types(types) => Ok(ExportRequest::from_types(types.clone())),
    }
}
