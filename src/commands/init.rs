//! The `spendsheet init` command.

use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Creates the home directory:
/// - writes an initial `config.json` pointing at `sheet_url`
/// - moves `secret_file` into its default location under `.secrets/`
///
/// `home` is the directory that becomes the spendsheet home, e.g. `$HOME/spendsheet`.
/// `secret_file` is the OAuth 2.0 client credentials JSON downloaded from the Google Cloud
/// Console.
pub async fn init(home: &Path, secret_file: &Path, sheet_url: &str) -> Result<()> {
    let config = Config::create(home, secret_file, sheet_url)
        .await
        .context("Unable to create the home directory and config")?;
    info!(
        "Created the spendsheet home directory at {}",
        config.root().display()
    );
    info!("Next, run 'spendsheet auth' to authorize access to your sheet.");
    Ok(())
}
