//! Authentication command handlers for the OAuth flow.
//!
//! - `spendsheet auth` runs the initial OAuth consent flow
//! - `spendsheet auth --verify` verifies and refreshes existing tokens

use crate::api::TokenProvider;
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

/// Handles the `spendsheet auth` command. This is the only command that asks the user to open
/// a browser: it runs the OAuth consent flow and saves the resulting token file.
pub async fn auth(config: &Config) -> Result<()> {
    let _ = TokenProvider::initialize(config.client_secret_path(), config.token_path()).await?;
    info!("Authentication succeeded and the token has been saved.");
    Ok(())
}

/// Handles the `spendsheet auth --verify` command. This never opens a browser: it loads the
/// existing token, exercises a refresh against Google, and reports the outcome. If the token
/// file is missing or stale the user is told to run `spendsheet auth`.
pub async fn auth_verify(config: &Config) -> Result<()> {
    let mut token_provider = TokenProvider::load(config.client_secret_path(), config.token_path())
        .await
        .context(
            "Unable to use the existing tokens found in the token JSON file. \n\n\
            You should run 'spendsheet auth' (without the --verify flag).",
        )?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")?;
    info!("Your OAuth token is valid!");
    Ok(())
}
