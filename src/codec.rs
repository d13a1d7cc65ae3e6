//! Bundle ⇄ per-object file reconciliation.
//!
//! The remote API speaks a single NDJSON bundle; version control wants one
//! reviewable file per object. This module translates between the two:
//!
//! - **Split** (export direction): each document is normalized, its
//!   escaped-JSON attributes are expanded into structured form, and it is
//!   written pretty-printed to `objects/<type>/<id>.json`.
//! - **Join** (import direction): files are read back in lexicographic
//!   order, the `managed` flag is applied if requested, and the expanded
//!   attributes are re-escaped into single-line JSON strings the API
//!   expects.
//!
//! Escaping and unescaping are exact inverses over the enumerated path
//! set, so `join(split(bundle))` reproduces the bundle modulo the
//! normalizer-stripped fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::manifest::ObjectRef;
use crate::normalize::normalize;
use crate::sync::file::atomic_write;

/// Attribute paths that hold JSON serialized into a string.
///
/// Left escaped, these fields diff as opaque one-line noise; expanded,
/// every nested change is reviewable. The set is fixed by the remote
/// store's document schemas (dashboard panel layout, visualization state,
/// index-pattern field formats, saved-search source).
pub const ESCAPED_JSON_PATHS: [&str; 7] = [
    "attributes.panelsJSON",
    "attributes.optionsJSON",
    "attributes.uiStateJSON",
    "attributes.visState",
    "attributes.fieldFormatMap",
    "attributes.fieldAttrs",
    "attributes.kibanaSavedObjectMeta.searchSourceJSON",
];

/// One file written by a split, with its display metadata.
#[derive(Debug, Clone)]
pub struct SplitEntry {
    /// Identity of the document (always by `(type, id)`).
    pub object: ObjectRef,
    /// Human-readable title from `attributes.title`/`attributes.name`.
    pub title: Option<String>,
    /// Path of the written file.
    pub path: PathBuf,
}

fn lookup_path_mut<'a>(doc: &'a mut Value, dotted: &str) -> Option<&'a mut Value> {
    let mut current = doc;
    for segment in dotted.split('.') {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Expand the enumerated escaped-JSON attributes into structured form.
///
/// Absent paths and strings that do not parse as JSON are left untouched.
pub fn unescape_embedded_json(doc: &mut Value) {
    for dotted in ESCAPED_JSON_PATHS {
        if let Some(slot) = lookup_path_mut(doc, dotted) {
            let parsed = slot
                .as_str()
                .and_then(|raw| serde_json::from_str::<Value>(raw).ok());
            if let Some(parsed) = parsed {
                *slot = parsed;
            }
        }
    }
}

/// Re-escape the enumerated attributes into single-line JSON strings.
///
/// Exact inverse of [`unescape_embedded_json`]: values that are already
/// strings (never expanded) are left untouched.
pub fn escape_embedded_json(doc: &mut Value) {
    for dotted in ESCAPED_JSON_PATHS {
        if let Some(slot) = lookup_path_mut(doc, dotted) {
            if slot.is_string() {
                continue;
            }
            // Compact serialization matches the API's own encoding.
            if let Ok(raw) = serde_json::to_string(slot) {
                *slot = Value::String(raw);
            }
        }
    }
}

/// Display title for a document, when present in the conventional spot.
#[must_use]
pub fn display_title(doc: &Value) -> Option<String> {
    let attributes = doc.get("attributes")?;
    attributes
        .get("title")
        .or_else(|| attributes.get("name"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Keep ids usable as single path components.
fn file_safe(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

/// Split a bundle into per-object files under `objects_dir`.
///
/// Each document with both `type` and `id` is normalized, unescaped, and
/// written pretty-printed to `objects_dir/<type>/<id>.json`, overwriting
/// any existing file for the same object. Records without an identity
/// (the trailing export-details record) are skipped.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn split_bundle(docs: &[Value], objects_dir: &Path) -> Result<Vec<SplitEntry>> {
    let mut entries = Vec::new();

    for doc in docs {
        let Some(ty) = doc.get("type").and_then(Value::as_str) else {
            continue;
        };
        let Some(id) = doc.get("id").and_then(Value::as_str) else {
            continue;
        };
        let object = ObjectRef::new(ty, id);

        let mut doc = doc.clone();
        normalize(&mut doc);
        unescape_embedded_json(&mut doc);

        let path = objects_dir
            .join(file_safe(ty))
            .join(format!("{}.json", file_safe(id)));
        let mut content = serde_json::to_string_pretty(&doc)?;
        content.push('\n');
        atomic_write(&path, &content)?;

        entries.push(SplitEntry {
            title: display_title(&doc),
            object,
            path,
        });
    }

    tracing::debug!(written = entries.len(), "bundle split into object files");
    Ok(entries)
}

/// Join the per-object files back into a bundle.
///
/// Files are visited in the directory's lexicographic listing order
/// (types, then ids). With `managed` set, each document gets a top-level
/// `managed: true` before inclusion, freezing it against edits in the
/// remote UI; otherwise documents are bundled unchanged. Embedded JSON is
/// re-escaped either way.
///
/// # Errors
///
/// Returns a `Config` error if `objects_dir` does not exist, or an
/// IO/JSON error for an unreadable file.
pub fn join_files(objects_dir: &Path, managed: bool) -> Result<Vec<Value>> {
    if !objects_dir.is_dir() {
        return Err(Error::Config(format!(
            "objects directory not found: {}",
            objects_dir.display()
        )));
    }

    let mut docs = Vec::new();
    for type_dir in sorted_entries(objects_dir)? {
        if !type_dir.is_dir() {
            continue;
        }
        for file in sorted_entries(&type_dir)? {
            if file.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let content = fs::read_to_string(&file)?;
            let mut doc: Value = serde_json::from_str(&content)?;

            if managed {
                if let Some(map) = doc.as_object_mut() {
                    map.insert("managed".to_string(), Value::Bool(true));
                }
            }
            escape_embedded_json(&mut doc);
            docs.push(doc);
        }
    }

    Ok(docs)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}
