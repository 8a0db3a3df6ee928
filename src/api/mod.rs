//! The client seam between the ledger and its backing tabular store.

mod auth;
mod google;
mod test_sheet;

use crate::{Config, Result};

pub(crate) use auth::TokenProvider;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

/// Name of the sheet tab holding the expense rows.
pub(crate) const EXPENSES: &str = "expenses";
/// Name of the sheet tab holding the category column.
pub(crate) const CATEGORIES: &str = "categories";

/// Environment variable that switches the app onto the in-memory sheet client.
pub(crate) const IN_TEST_MODE: &str = "SPENDSHEET_IN_TEST_MODE";

/// A minimal client for one spreadsheet full of named tabs.
///
/// Writes are whole-tab or whole-column replacements; there are no row-level
/// operations. Implementations exist for Google Sheets and for an in-memory
/// store used in tests and in test mode.
#[async_trait::async_trait]
pub trait Sheet {
    /// Returns the full value grid of the named tab, as rows of cells.
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>>;

    /// Clears the named tab and writes `rows` starting at the top-left cell.
    async fn put(&mut self, sheet_name: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Clears one column (0-based index) of the named tab and writes `cells`
    /// downward from the first row.
    async fn put_column(&mut self, sheet_name: &str, column: usize, cells: &[String])
        -> Result<()>;
}

/// Which kind of sheet client to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The real Google Sheets client.
    Google,
    /// The in-memory client, seeded with sample data.
    Test,
}

impl Mode {
    /// Selects the client implementation from the environment: when
    /// `SPENDSHEET_IN_TEST_MODE` is set and non-empty, the in-memory client
    /// is used and no Google account is needed.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// Constructs the sheet client for `mode`.
pub(crate) async fn client(config: &Config, mode: Mode) -> Result<Box<dyn Sheet + Send>> {
    match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            let sheet = google::GoogleSheet::new(config.clone(), token_provider).await?;
            Ok(Box::new(sheet))
        }
        Mode::Test => Ok(Box::new(TestSheet::default())),
    }
}

/// Converts a 0-based column index to its A1 letter: 0 -> "A", 25 -> "Z",
/// 26 -> "AA".
pub(crate) fn column_letter(index: usize) -> String {
    let mut letters = String::new();
    let mut n = index as i64;
    while n >= 0 {
        letters.insert(0, (b'A' + (n % 26) as u8) as char);
        n = n / 26 - 1;
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(52), "BA");
    }
}
