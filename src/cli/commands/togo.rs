//! Push with every object marked managed.
//!
//! Identical to `push` except that each document gets `managed: true`
//! before bundling, so the remote UI treats the imported objects as
//! read-only and edits can only arrive through this tool.

use std::path::Path;

use crate::cli::commands::push;
use crate::config::Config;
use crate::error::Result;

/// Execute the togo command.
///
/// # Errors
///
/// Same failure modes as `push`.
pub fn execute(config: &Config, root: &Path) -> Result<()> {
    push::execute(config, root, true)
}
