//! Atomic file operations for sync.
//!
//! All durable local state (the manifest, per-object files, bundle files)
//! goes through `atomic_write`: write to a temp file, fsync, then rename.
//! An interrupted write never leaves a half-written target behind.
//!
//! `Scratch` holds the per-invocation temporary directory (export bundles,
//! manifest patches, raw API responses, diff chunks). It is removed only by
//! an explicit `finish()` at the end of a successful run, so failed runs
//! leave their artifacts in place for inspection.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// Name of the per-invocation scratch directory inside a repository.
pub const SCRATCH_DIR: &str = ".kibsync-tmp";

/// Write content to a file atomically.
///
/// Writes to a sibling `.tmp` file, syncs it to disk, then renames it over
/// the target. If any step fails, the original file (if any) is untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let mut temp_name = path
        .file_name()
        .map_or_else(|| "kibsync".into(), std::ffi::OsStr::to_os_string);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Write a bundle as NDJSON, one compact document per line.
///
/// # Errors
///
/// Returns an error if serialization or the atomic write fails.
pub fn write_bundle(path: &Path, docs: &[Value]) -> Result<()> {
    let mut content = String::new();
    for doc in docs {
        content.push_str(&serde_json::to_string(doc)?);
        content.push('\n');
    }
    atomic_write(path, &content)
}

/// Read an NDJSON bundle into a sequence of documents.
///
/// Blank lines are skipped; any other unparseable line is an error.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not valid JSON.
pub fn read_bundle(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let mut docs = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(line)?);
    }
    Ok(docs)
}

/// Per-invocation scratch directory.
///
/// Created eagerly so pipelines can stage bundles and responses into it.
/// Call [`Scratch::finish`] after a fully successful run; on failure (or
/// when the operator asked to keep temp files) the directory stays behind.
pub struct Scratch {
    dir: PathBuf,
    keep: bool,
}

impl Scratch {
    /// Create the scratch directory under the repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(root: &Path, keep: bool) -> Result<Self> {
        let dir = root.join(SCRATCH_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, keep })
    }

    /// Path of a file inside the scratch directory.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Remove the scratch directory after a successful run.
    ///
    /// A no-op when temp-file retention was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn finish(self) -> Result<()> {
        if self.keep {
            tracing::debug!(dir = %self.dir.display(), "keeping scratch directory");
            return Ok(());
        }
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}
