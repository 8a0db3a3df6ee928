//! Command handlers for the spendsheet CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod init;
mod run;

pub use auth::{auth, auth_verify};
pub use init::init;
pub use run::run;
