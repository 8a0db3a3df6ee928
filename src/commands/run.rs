//! The `spendsheet run` command: load the ledger and start the interactive session.

use crate::api::{self, Mode};
use crate::ledger::{Ledger, LoadMode};
use crate::store::SheetStore;
use crate::{shell, Config, Result};
use tracing::info;

/// Loads the ledger from the configured sheet and runs the menu session until the user exits.
///
/// With `strict` set, startup fails when the expense columns have unequal lengths instead of
/// silently dropping the trailing entries of the longer columns.
pub async fn run(config: &Config, mode: Mode, strict: bool) -> Result<()> {
    let sheet = api::client(config, mode).await?;
    let store = SheetStore::new(sheet);
    let load_mode = if strict {
        LoadMode::Strict
    } else {
        LoadMode::Truncate
    };
    let mut ledger = Ledger::load(store, load_mode).await?;
    info!(
        "Loaded {} expenses and {} categories",
        ledger.expenses().len(),
        ledger.categories().len()
    );
    shell::run(&mut ledger).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_the_ledger_loads_in_test_mode() {
        let env = TestEnv::new().await;
        let sheet = api::client(&env.config(), Mode::Test).await.unwrap();
        let store = SheetStore::new(sheet);
        let ledger = Ledger::load(store, LoadMode::Truncate).await.unwrap();
        assert_eq!(ledger.expenses().len(), 6);
        assert_eq!(ledger.categories().len(), 5);
    }
}
