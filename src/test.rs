//! Shared test utilities.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

/// Test environment that sets up a spendsheet home directory with a Config. Holds the TempDir
/// to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a home directory under a temp dir, with a minimal client secret file and a
    /// random spreadsheet URL.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("spendsheet");
        let secret_path = temp_dir.path().join("client_secret.json");

        let secret_content = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        std::fs::write(&secret_path, secret_content).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{rand}/edit");
        let config = Config::create(&root, &secret_path, &sheet_url)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }
}

/// Counts error-level tracing events so tests can assert how often a fail-soft path logged.
#[derive(Default, Clone)]
pub(crate) struct ErrorCount(Arc<AtomicUsize>);

impl ErrorCount {
    pub(crate) fn value(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCount {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Installs a subscriber on the current thread that counts error events. Keep the guard alive
/// for the duration of the test.
pub(crate) fn counting_subscriber() -> (ErrorCount, tracing::subscriber::DefaultGuard) {
    let count = ErrorCount::default();
    let subscriber = tracing_subscriber::registry().with(count.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (count, guard)
}
