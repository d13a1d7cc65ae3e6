//! Verify credentials against the configured space.

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::remote::RemoteStore;

/// Execute the auth command.
///
/// # Errors
///
/// Fails with the remote's error envelope when the credentials are
/// rejected or the space does not exist.
pub fn execute(config: &Config) -> Result<()> {
    let store = RemoteStore::new(config);

    let rt = tokio::runtime::Runtime::new()?;
    let space = rt.block_on(store.check_space())?;

    println!("{} {}", "Authenticated.".green().bold(), config.url);
    println!("  Space: {} ({})", space.name, config.space);
    if let Some(description) = space.description {
        println!("  {}", description.dimmed());
    }

    Ok(())
}
