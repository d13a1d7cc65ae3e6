//! Generate shell completions.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::error::Result;

/// Execute the completions command, writing the script to stdout.
///
/// # Errors
///
/// Infallible in practice; returns `Result` for dispatch uniformity.
pub fn execute(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "kibsync", &mut std::io::stdout());
    Ok(())
}
