//! Implements the very simple `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without using Google Sheets.

use crate::api::{Sheet, CATEGORIES, EXPENSES};
use crate::Result;
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

/// An implementation of the `Sheet` trait that does not use Google sheets. It can hold any data
/// in memory and, by default, is seeded with some existing data.
///
/// The state sits behind a shared handle: tests keep a clone of the handle and inspect what the
/// application wrote after the client itself has been moved into the ledger.
pub(crate) struct TestSheet {
    state: Arc<Mutex<TestSheetState>>,
}

/// The tables held by a `TestSheet`, plus a record of the writes made to them.
#[derive(Debug, Default)]
pub(crate) struct TestSheetState {
    /// The map key is the sheet name and the map value is the rows of the sheet.
    pub(crate) tables: HashMap<String, Vec<Vec<String>>>,
    /// One entry per write call, e.g. `put expenses` or `put_column categories`.
    pub(crate) writes: Vec<String>,
}

impl TestSheet {
    /// Create a new `TestSheet` using `tables`. The map key is sheet name and the map value is
    /// the rows of the sheet.
    pub(crate) fn new(tables: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TestSheetState {
                tables,
                writes: Vec::new(),
            })),
        }
    }

    /// Returns a handle to the shared state.
    pub(crate) fn state(&self) -> Arc<Mutex<TestSheetState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, TestSheetState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("the test sheet state mutex is poisoned"))
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        let state = self.lock()?;
        state
            .tables
            .get(sheet_name)
            .cloned()
            .with_context(|| format!("Sheet '{sheet_name}' not found"))
    }

    async fn put(&mut self, sheet_name: &str, rows: &[Vec<String>]) -> Result<()> {
        let mut state = self.lock()?;
        state.writes.push(format!("put {sheet_name}"));
        state.tables.insert(sheet_name.to_string(), rows.to_vec());
        Ok(())
    }

    async fn put_column(
        &mut self,
        sheet_name: &str,
        column: usize,
        cells: &[String],
    ) -> Result<()> {
        let mut state = self.lock()?;
        state.writes.push(format!("put_column {sheet_name}"));
        let rows = state.tables.entry(sheet_name.to_string()).or_default();
        while rows.len() < cells.len() {
            rows.push(Vec::new());
        }
        for (i, row) in rows.iter_mut().enumerate() {
            match cells.get(i) {
                Some(cell) => {
                    if row.len() <= column {
                        row.resize(column + 1, String::new());
                    }
                    row[column] = cell.clone();
                }
                // The column was cleared before writing, so cells below the
                // new content become empty.
                None => {
                    if let Some(slot) = row.get_mut(column) {
                        slot.clear();
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for TestSheet {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(default_data())
    }
}

/// Provides the seed data from this module.
fn default_data() -> HashMap<String, Vec<Vec<String>>> {
    let mut map = HashMap::new();
    let expenses = load_csv(EXPENSE_DATA).unwrap();
    map.insert(EXPENSES.to_string(), expenses);
    let categories = load_csv(CATEGORY_DATA).unwrap();
    map.insert(CATEGORIES.to_string(), categories);
    map
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let bytes = csv_data.as_bytes();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .from_reader(Cursor::new(bytes));

    let mut rows: Vec<Vec<String>> = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Seed expense data.
const EXPENSE_DATA: &str = r##"Expense Name,Amount,Category
Groceries at Lidl,54.30,Groceries
Cinema tickets,21.00,Entertainment
Monthly transit pass,49.90,Transport
Electricity bill,88.35,Utilities
Pizza night,18.75,Dining Out
Farmers market,12.40,Groceries
"##;

/// Seed category data.
const CATEGORY_DATA: &str = r##"Category
Groceries
Entertainment
Transport
Utilities
Dining Out
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_data_shape() {
        let mut sheet = TestSheet::default();
        let expenses = sheet.get(EXPENSES).await.expect("expenses tab must exist");
        assert_eq!(
            expenses[0],
            vec!["Expense Name", "Amount", "Category"],
            "Expected the header row first"
        );
        assert_eq!(expenses.len(), 7, "Expected a header plus six seed rows");
        let categories = sheet
            .get(CATEGORIES)
            .await
            .expect("categories tab must exist");
        assert_eq!(categories[0], vec!["Category"]);
        assert_eq!(categories.len(), 6);
    }

    #[tokio::test]
    async fn test_get_missing_sheet_is_an_error() {
        let mut sheet = TestSheet::new(HashMap::new());
        let result = sheet.get("nope").await;
        assert!(result.is_err(), "Expected an error for a missing sheet");
    }

    #[tokio::test]
    async fn test_put_replaces_the_whole_tab() {
        let mut sheet = TestSheet::default();
        let rows = vec![vec!["only".to_string()]];
        sheet.put(EXPENSES, &rows).await.unwrap();
        assert_eq!(sheet.get(EXPENSES).await.unwrap(), rows);
    }

    #[tokio::test]
    async fn test_put_column_clears_residue_below_the_new_cells() {
        let mut sheet = TestSheet::new(HashMap::new());
        let long = vec![
            "Category".to_string(),
            "One".to_string(),
            "Two".to_string(),
            "Three".to_string(),
        ];
        sheet.put_column(CATEGORIES, 0, &long).await.unwrap();
        let short = vec!["Category".to_string(), "Only".to_string()];
        sheet.put_column(CATEGORIES, 0, &short).await.unwrap();
        let rows = sheet.get(CATEGORIES).await.unwrap();
        assert_eq!(rows[0][0], "Category");
        assert_eq!(rows[1][0], "Only");
        assert_eq!(rows[2][0], "");
        assert_eq!(rows[3][0], "");
    }

    #[tokio::test]
    async fn test_put_column_leaves_other_columns_alone() {
        let mut sheet = TestSheet::new(HashMap::new());
        let rows = vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["a1".to_string(), "b1".to_string()],
        ];
        sheet.put("grid", &rows).await.unwrap();
        let cells = vec!["B".to_string(), "b1-new".to_string()];
        sheet.put_column("grid", 1, &cells).await.unwrap();
        let grid = sheet.get("grid").await.unwrap();
        assert_eq!(grid[0], vec!["A", "B"]);
        assert_eq!(grid[1], vec!["a1", "b1-new"]);
    }

    #[tokio::test]
    async fn test_writes_are_recorded() {
        let mut sheet = TestSheet::default();
        let state = sheet.state();
        sheet.put(EXPENSES, &[]).await.unwrap();
        sheet
            .put_column(CATEGORIES, 0, &["Category".to_string()])
            .await
            .unwrap();
        let writes = state.lock().unwrap().writes.clone();
        assert_eq!(writes, vec!["put expenses", "put_column categories"]);
    }
}
