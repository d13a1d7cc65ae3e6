//! Create a kibsync repository from a full export.
//!
//! `init` is the only command that runs without a manifest: it saves an
//! empty one, exports every object of the requested types from the
//! remote space, and builds the manifest from what came back. After that
//! the repository is ready to commit and `pull`/`push` take over.

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::cli::commands::run_export;
use crate::config::{manifest_path, objects_dir, Config};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::sync::ExportSelection;

/// Types exported when `--types` is not given: the common dashboard
/// stack plus the data views and tags they reference.
pub const DEFAULT_TYPES: [&str; 7] = [
    "dashboard",
    "visualization",
    "lens",
    "map",
    "search",
    "index-pattern",
    "tag",
];

const GITIGNORE: &str = "# kibsync local-only files\n.kibsync-tmp/\n.kibsync.env\n";

/// Execute the init command.
///
/// # Errors
///
/// Fails if the repository is already initialized (without `--force`),
/// or if the full export fails.
pub fn execute(
    config: &Config,
    root: &Path,
    types: Option<&[String]>,
    force: bool,
) -> Result<()> {
    let manifest_file = manifest_path(root);
    if manifest_file.exists() && !force {
        return Err(Error::Config(format!(
            "already initialized ({} exists); use --force to rebuild",
            manifest_file.display()
        )));
    }

    fs::create_dir_all(objects_dir(root))?;

    let gitignore_path = root.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE)?;
    }

    // Empty master manifest; the export's derived patch fills it in.
    Manifest::default().save(&manifest_file)?;

    let types: Vec<String> = match types {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => DEFAULT_TYPES.iter().map(ToString::to_string).collect(),
    };

    let stats = run_export(config, root, ExportSelection::Types(types))?;

    println!("{}", "Initialized kibsync repository".bold());
    println!("  Objects exported: {}", stats.fetched);
    println!("  Tracked in manifest: {}", stats.added);
    println!("  Manifest: {}", manifest_file.display());
    println!("  Files: {}", objects_dir(root).display());
    println!();
    println!(
        "{}",
        "Commit the manifest and objects/ directory to version control.".dimmed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_existing_manifest() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        Manifest::default()
            .save(&manifest_path(temp_dir.path()))
            .unwrap();

        let config = Config {
            url: "http://localhost:5601".to_string(),
            space: "default".to_string(),
            auth: crate::config::AuthMethod::None,
            keep_temp: false,
            summarizer: None,
        };

        let result = execute(&config, temp_dir.path(), None, false);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
