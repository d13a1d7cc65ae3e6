//! Tracked-object manifest and merge engine.
//!
//! The manifest is the durable source of truth for which saved objects a
//! repository tracks. It is created by `init` from a full export and grown
//! by `add`/`pull`: newly discovered references are merged in as a patch,
//! deduplicated, and kept in a canonical sort order so the file diffs
//! cleanly in git.
//!
//! # File format
//!
//! ```json
//! {
//!   "objects": [{"type": "dashboard", "id": "722b74f0-..."}],
//!   "excludeExportDetails": true,
//!   "includeReferencesDeep": true
//! }
//! ```
//!
//! The two flags are stored in the manifest because the export request body
//! is literally the manifest: `pull` posts it as-is to the export API.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::file::atomic_write;

/// Reference to a saved object, unique by `(type, id)`.
///
/// The derived ordering is lexicographic by type then id, which is the
/// canonical manifest order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Saved-object type, e.g. `dashboard` or `index-pattern`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Saved-object id (normally a UUID).
    pub id: String,
}

impl ObjectRef {
    #[must_use]
    pub fn new(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.ty, self.id)
    }
}

/// Parse a `type=id` reference as given on the `add` command line.
///
/// # Errors
///
/// Returns `InvalidObjectRef` if the argument does not contain a `=`
/// separating two non-empty parts.
pub fn parse_ref(arg: &str) -> Result<ObjectRef> {
    match arg.split_once('=') {
        Some((ty, id)) if !ty.is_empty() && !id.is_empty() => Ok(ObjectRef::new(ty, id)),
        _ => Err(Error::InvalidObjectRef(arg.to_string())),
    }
}

/// The tracked-object manifest.
///
/// Invariant (after any merge): `objects` contains no duplicate ids and is
/// sorted by `(type, id)` ascending, case-sensitive byte ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub objects: Vec<ObjectRef>,
    pub exclude_export_details: bool,
    pub include_references_deep: bool,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            exclude_export_details: true,
            include_references_deep: true,
        }
    }
}

impl Manifest {
    /// Build a patch manifest from an explicit reference list.
    ///
    /// Keeps insertion order; canonical order is imposed by the merge.
    #[must_use]
    pub fn from_refs(refs: Vec<ObjectRef>) -> Self {
        Self {
            objects: refs,
            ..Self::default()
        }
    }

    /// Build a patch manifest from an export bundle.
    ///
    /// Extracts `(type, originId ?? id)` from every document. Records
    /// missing either field are silently dropped — that discards the
    /// bundle's trailing export-details record, and keeps one malformed
    /// document from blocking tracking of the rest. Equivalent to merging
    /// the extracted refs into an empty master, so the result is already
    /// deduplicated and sorted.
    #[must_use]
    pub fn from_bundle(docs: &[Value]) -> Self {
        let refs: Vec<ObjectRef> = docs
            .iter()
            .filter_map(|doc| {
                let ty = doc.get("type")?.as_str()?;
                let id = doc
                    .get("originId")
                    .and_then(Value::as_str)
                    .or_else(|| doc.get("id").and_then(Value::as_str))?;
                Some(ObjectRef::new(ty, id))
            })
            .collect();

        let (merged, _) = Self::merge(&Self::default(), &Self::from_refs(refs));
        merged
    }

    /// Merge a patch into a master manifest.
    ///
    /// Concatenates master and patch, deduplicates, and sorts by
    /// `(type, id)`. Returns the merged manifest and `added_count`, the
    /// number of references the patch contributed.
    ///
    /// Deduplication is by `id` alone, not the full `(type, id)` pair:
    /// two objects of different types sharing an id collapse to whichever
    /// came first. Ids are UUIDs in practice so the collision is
    /// theoretical, but the behavior is pinned by a test below rather than
    /// silently changed.
    #[must_use]
    pub fn merge(master: &Self, patch: &Self) -> (Self, usize) {
        let mut seen = std::collections::HashSet::new();
        let mut objects: Vec<ObjectRef> = master
            .objects
            .iter()
            .chain(patch.objects.iter())
            .filter(|r| seen.insert(r.id.clone()))
            .cloned()
            .collect();
        objects.sort();

        let added = objects.len() - master.objects.len().min(objects.len());
        (
            Self {
                objects,
                exclude_export_details: master.exclude_export_details,
                include_references_deep: master.include_references_deep,
            },
            added,
        )
    }

    /// Load the master manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns `ManifestMissing` if the file does not exist, or a JSON
    /// error if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestMissing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a patch manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns `PatchMissing` if the file does not exist.
    pub fn load_patch(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PatchMissing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the manifest atomically, pretty-printed with a trailing
    /// newline so it diffs cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        atomic_write(path, &content)
    }
}

/// Merge the patch file into the master manifest file on disk.
///
/// Loads both (failing fast if either is missing), merges, and atomically
/// rewrites the master. Returns `added_count` for reporting.
///
/// # Errors
///
/// Returns `ManifestMissing`/`PatchMissing` if either file is absent,
/// or an IO/JSON error from loading or saving.
pub fn merge_into(master_path: &Path, patch_path: &Path) -> Result<usize> {
    let master = Manifest::load(master_path)?;
    let patch = Manifest::load_patch(patch_path)?;

    let (merged, added) = Manifest::merge(&master, &patch);
    merged.save(master_path)?;

    tracing::info!(added, total = merged.objects.len(), "manifest merged");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn refs(pairs: &[(&str, &str)]) -> Vec<ObjectRef> {
        pairs.iter().map(|(t, i)| ObjectRef::new(*t, *i)).collect()
    }

    #[test]
    fn test_parse_ref() {
        let r = parse_ref("dashboard=abc-123").unwrap();
        assert_eq!(r.ty, "dashboard");
        assert_eq!(r.id, "abc-123");

        assert!(matches!(
            parse_ref("dashboard"),
            Err(Error::InvalidObjectRef(_))
        ));
        assert!(matches!(parse_ref("=abc"), Err(Error::InvalidObjectRef(_))));
        assert!(matches!(
            parse_ref("dashboard="),
            Err(Error::InvalidObjectRef(_))
        ));
    }

    #[test]
    fn test_merge_dedups_and_sorts() {
        let master = Manifest::from_refs(refs(&[("visualization", "z"), ("dashboard", "m")]));
        let patch = Manifest::from_refs(refs(&[("dashboard", "a"), ("dashboard", "m")]));

        let (merged, added) = Manifest::merge(&master, &patch);

        assert_eq!(
            merged.objects,
            refs(&[("dashboard", "a"), ("dashboard", "m"), ("visualization", "z")])
        );
        assert_eq!(added, 1);
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let mut master = Manifest::from_refs(refs(&[("dashboard", "a"), ("lens", "b")]));
        master.objects.sort();

        let (merged, added) = Manifest::merge(&master, &Manifest::default());

        assert_eq!(merged, master);
        assert_eq!(added, 0);
    }

    #[test]
    fn test_merge_reported_scenario() {
        // {dashboard,a} + {dashboard,a; index-pattern,b} -> both, added 1.
        let master = Manifest::from_refs(refs(&[("dashboard", "a")]));
        let patch = Manifest::from_refs(refs(&[("dashboard", "a"), ("index-pattern", "b")]));

        let (merged, added) = Manifest::merge(&master, &patch);

        assert_eq!(
            merged.objects,
            refs(&[("dashboard", "a"), ("index-pattern", "b")])
        );
        assert_eq!(added, 1);
    }

    #[test]
    fn test_merge_collapses_distinct_types_sharing_an_id() {
        // Dedup is by id alone: a lens and a dashboard with the same id
        // collapse to the first occurrence. Pinned on purpose.
        let master = Manifest::from_refs(refs(&[("dashboard", "shared")]));
        let patch = Manifest::from_refs(refs(&[("lens", "shared")]));

        let (merged, added) = Manifest::merge(&master, &patch);

        assert_eq!(merged.objects, refs(&[("dashboard", "shared")]));
        assert_eq!(added, 0);
    }

    #[test]
    fn test_merge_preserves_flags() {
        let master = Manifest {
            objects: Vec::new(),
            exclude_export_details: false,
            include_references_deep: true,
        };
        let (merged, _) = Manifest::merge(&master, &Manifest::default());
        assert!(!merged.exclude_export_details);
        assert!(merged.include_references_deep);
    }

    #[test]
    fn test_from_bundle_skips_summary_record() {
        let docs = vec![
            json!({"type": "dashboard", "id": "d1", "attributes": {}}),
            json!({"type": "index-pattern", "id": "p1", "attributes": {}}),
            // Trailing export-details record: no type/id.
            json!({"exportedCount": 2, "missingRefCount": 0, "missingReferences": []}),
        ];

        let patch = Manifest::from_bundle(&docs);

        assert_eq!(
            patch.objects,
            refs(&[("dashboard", "d1"), ("index-pattern", "p1")])
        );
    }

    #[test]
    fn test_from_bundle_prefers_origin_id() {
        let docs = vec![json!({
            "type": "dashboard",
            "id": "copy-on-save-id",
            "originId": "original-id",
        })];

        let patch = Manifest::from_bundle(&docs);
        assert_eq!(patch.objects, refs(&[("dashboard", "original-id")]));
    }

    #[test]
    fn test_from_bundle_drops_malformed_records() {
        let docs = vec![
            json!({"type": "dashboard"}),
            json!({"id": "orphan"}),
            json!({"type": "lens", "id": "ok"}),
        ];

        let patch = Manifest::from_bundle(&docs);
        assert_eq!(patch.objects, refs(&[("lens", "ok")]));
    }

    #[test]
    fn test_manifest_json_shape() {
        let manifest = Manifest::from_refs(refs(&[("dashboard", "a")]));
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(
            value,
            json!({
                "objects": [{"type": "dashboard", "id": "a"}],
                "excludeExportDetails": true,
                "includeReferencesDeep": true,
            })
        );
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");

        assert!(matches!(
            Manifest::load(&path),
            Err(Error::ManifestMissing { .. })
        ));
        assert!(matches!(
            Manifest::load_patch(&path),
            Err(Error::PatchMissing { .. })
        ));
    }

    #[test]
    fn test_merge_into_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let master_path = temp_dir.path().join("manifest.json");
        let patch_path = temp_dir.path().join("patch.json");

        Manifest::from_refs(refs(&[("dashboard", "a")]))
            .save(&master_path)
            .unwrap();
        Manifest::from_refs(refs(&[("dashboard", "a"), ("index-pattern", "b")]))
            .save(&patch_path)
            .unwrap();

        let added = merge_into(&master_path, &patch_path).unwrap();
        assert_eq!(added, 1);

        let merged = Manifest::load(&master_path).unwrap();
        assert_eq!(
            merged.objects,
            refs(&[("dashboard", "a"), ("index-pattern", "b")])
        );
    }

    #[test]
    fn test_merge_into_requires_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let master_path = temp_dir.path().join("manifest.json");
        let patch_path = temp_dir.path().join("patch.json");

        assert!(matches!(
            merge_into(&master_path, &patch_path),
            Err(Error::ManifestMissing { .. })
        ));

        Manifest::default().save(&master_path).unwrap();
        assert!(matches!(
            merge_into(&master_path, &patch_path),
            Err(Error::PatchMissing { .. })
        ));
    }
}
