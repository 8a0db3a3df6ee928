//! Column-oriented, fail-soft access to the backing spreadsheet.

use crate::api::Sheet;
use tracing::error;

/// Moves data between the ledger and the spreadsheet, one named column (or whole tab) at a
/// time.
///
/// Every operation absorbs backend failures: the error is logged and the call degrades to an
/// empty result or a no-op, so a flaky connection spoils one operation instead of ending the
/// session. The cost is that callers cannot tell a failed read from a genuinely empty column,
/// and a failed write leaves the sheet out of step with memory until the next successful write.
pub struct SheetStore {
    sheet: Box<dyn Sheet + Send>,
}

impl SheetStore {
    pub fn new(sheet: Box<dyn Sheet + Send>) -> Self {
        Self { sheet }
    }

    /// Returns the values below the named header cell, in row order.
    ///
    /// Missing tab, missing header, and backend failure all come back as an empty list; only
    /// the backend failure is logged. Trailing empty cells are dropped so a column keeps its
    /// own length even when a neighboring column is longer.
    pub async fn read_column(&mut self, table: &str, header: &str) -> Vec<String> {
        let rows = match self.sheet.get(table).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Unable to read the {table} sheet: {e:#}");
                return Vec::new();
            }
        };
        let Some(header_row) = rows.first() else {
            return Vec::new();
        };
        let Some(index) = header_row.iter().position(|cell| cell == header) else {
            return Vec::new();
        };
        let mut values: Vec<String> = rows[1..]
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect();
        while values.last().is_some_and(|cell| cell.is_empty()) {
            values.pop();
        }
        values
    }

    /// Replaces the named column with the header followed by `values`, clearing whatever was
    /// below. When the header cannot be found the leftmost column is used. A backend failure
    /// is logged and the write is abandoned.
    pub async fn write_column(&mut self, table: &str, header: &str, values: &[String]) {
        let index = match self.sheet.get(table).await {
            Ok(rows) => rows
                .first()
                .and_then(|header_row| header_row.iter().position(|cell| cell == header))
                .unwrap_or(0),
            Err(e) => {
                error!("Unable to read the {table} sheet before writing the {header} column: {e:#}");
                return;
            }
        };
        let mut cells = Vec::with_capacity(values.len() + 1);
        cells.push(header.to_string());
        cells.extend_from_slice(values);
        if let Err(e) = self.sheet.put_column(table, index, &cells).await {
            error!("Unable to write the {header} column of the {table} sheet: {e:#}");
        }
    }

    /// Clears the named tab and rewrites it from parallel columns: one header row built from
    /// the column names, then one row per value position. Short columns are padded with empty
    /// cells. A backend failure is logged and the write is abandoned.
    pub async fn overwrite_table(&mut self, table: &str, columns: &[(&str, Vec<String>)]) {
        let length = columns
            .iter()
            .map(|(_, values)| values.len())
            .max()
            .unwrap_or(0);
        let mut rows = Vec::with_capacity(length + 1);
        rows.push(
            columns
                .iter()
                .map(|(header, _)| (*header).to_string())
                .collect::<Vec<String>>(),
        );
        for i in 0..length {
            rows.push(
                columns
                    .iter()
                    .map(|(_, values)| values.get(i).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        if let Err(e) = self.sheet.put(table, &rows).await {
            error!("Unable to rewrite the {table} sheet: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, CATEGORIES, EXPENSES};
    use crate::model::{AMOUNT_STR, CATEGORY_STR, EXPENSE_NAME_STR};
    use crate::test::counting_subscriber;
    use crate::Result;
    use anyhow::anyhow;
    use std::collections::HashMap;

    /// A `Sheet` whose every operation fails, for exercising the fail-soft paths.
    struct FailingSheet;

    #[async_trait::async_trait]
    impl Sheet for FailingSheet {
        async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
            Err(anyhow!("no connection to the {sheet_name} sheet"))
        }

        async fn put(&mut self, sheet_name: &str, _rows: &[Vec<String>]) -> Result<()> {
            Err(anyhow!("no connection to the {sheet_name} sheet"))
        }

        async fn put_column(
            &mut self,
            sheet_name: &str,
            _column: usize,
            _cells: &[String],
        ) -> Result<()> {
            Err(anyhow!("no connection to the {sheet_name} sheet"))
        }
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[tokio::test]
    async fn test_read_column_returns_values_without_the_header() {
        let mut store = SheetStore::new(Box::new(TestSheet::default()));
        let amounts = store.read_column(EXPENSES, AMOUNT_STR).await;
        assert_eq!(amounts.len(), 6);
        assert_eq!(amounts[0], "54.30");
        let categories = store.read_column(CATEGORIES, CATEGORY_STR).await;
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[4], "Dining Out");
    }

    #[tokio::test]
    async fn test_read_column_missing_header_is_empty() {
        let mut store = SheetStore::new(Box::new(TestSheet::default()));
        let values = store.read_column(EXPENSES, "No Such Header").await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_read_column_empty_tab_is_empty() {
        let mut tables = HashMap::new();
        tables.insert(EXPENSES.to_string(), Vec::new());
        let mut store = SheetStore::new(Box::new(TestSheet::new(tables)));
        let values = store.read_column(EXPENSES, EXPENSE_NAME_STR).await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_read_column_stops_at_its_own_length() {
        // The name and category columns are longer than the amount column, so the amount rows
        // below the last value come back as empty cells that must be dropped.
        let mut tables = HashMap::new();
        tables.insert(
            EXPENSES.to_string(),
            vec![
                cells(&[EXPENSE_NAME_STR, AMOUNT_STR, CATEGORY_STR]),
                cells(&["Coffee", "3.50", "Dining Out"]),
                cells(&["Bus", "2.10", "Transport"]),
                cells(&["Rent", "", "Housing"]),
            ],
        );
        let mut store = SheetStore::new(Box::new(TestSheet::new(tables)));
        assert_eq!(store.read_column(EXPENSES, EXPENSE_NAME_STR).await.len(), 3);
        assert_eq!(store.read_column(EXPENSES, AMOUNT_STR).await.len(), 2);
        assert_eq!(store.read_column(EXPENSES, CATEGORY_STR).await.len(), 3);
    }

    #[tokio::test]
    async fn test_read_column_keeps_interior_empty_cells() {
        let mut tables = HashMap::new();
        tables.insert(
            CATEGORIES.to_string(),
            vec![
                cells(&[CATEGORY_STR]),
                cells(&["Groceries"]),
                cells(&[""]),
                cells(&["Transport"]),
            ],
        );
        let mut store = SheetStore::new(Box::new(TestSheet::new(tables)));
        let values = store.read_column(CATEGORIES, CATEGORY_STR).await;
        assert_eq!(values, cells(&["Groceries", "", "Transport"]));
    }

    #[tokio::test]
    async fn test_read_failure_is_absorbed_and_logged_once() {
        let (count, _guard) = counting_subscriber();
        let mut store = SheetStore::new(Box::new(FailingSheet));
        let values = store.read_column(EXPENSES, AMOUNT_STR).await;
        assert!(values.is_empty(), "Expected an empty result, not an error");
        assert_eq!(count.value(), 1, "Expected exactly one error log entry");
    }

    #[tokio::test]
    async fn test_write_column_failure_is_absorbed_and_logged_once() {
        let (count, _guard) = counting_subscriber();
        let mut store = SheetStore::new(Box::new(FailingSheet));
        store
            .write_column(CATEGORIES, CATEGORY_STR, &cells(&["Groceries"]))
            .await;
        assert_eq!(count.value(), 1, "Expected exactly one error log entry");
    }

    #[tokio::test]
    async fn test_overwrite_table_failure_is_absorbed_and_logged_once() {
        let (count, _guard) = counting_subscriber();
        let mut store = SheetStore::new(Box::new(FailingSheet));
        store
            .overwrite_table(EXPENSES, &[(EXPENSE_NAME_STR, cells(&["Coffee"]))])
            .await;
        assert_eq!(count.value(), 1, "Expected exactly one error log entry");
    }

    #[tokio::test]
    async fn test_write_column_prepends_the_header() {
        let sheet = TestSheet::default();
        let state = sheet.state();
        let mut store = SheetStore::new(Box::new(sheet));
        store
            .write_column(CATEGORIES, CATEGORY_STR, &cells(&["Rent", "Fun"]))
            .await;
        let tables = state.lock().unwrap().tables.clone();
        let rows = &tables[CATEGORIES];
        assert_eq!(rows[0][0], CATEGORY_STR);
        assert_eq!(rows[1][0], "Rent");
        assert_eq!(rows[2][0], "Fun");
    }

    #[tokio::test]
    async fn test_write_column_finds_the_header_position() {
        let mut tables = HashMap::new();
        tables.insert(
            EXPENSES.to_string(),
            vec![
                cells(&[EXPENSE_NAME_STR, AMOUNT_STR]),
                cells(&["Coffee", "3.50"]),
            ],
        );
        let sheet = TestSheet::new(tables);
        let state = sheet.state();
        let mut store = SheetStore::new(Box::new(sheet));
        store
            .write_column(EXPENSES, AMOUNT_STR, &cells(&["4.00"]))
            .await;
        let tables = state.lock().unwrap().tables.clone();
        let rows = &tables[EXPENSES];
        assert_eq!(rows[0], cells(&[EXPENSE_NAME_STR, AMOUNT_STR]));
        assert_eq!(rows[1], cells(&["Coffee", "4.00"]));
    }

    #[tokio::test]
    async fn test_write_column_missing_header_uses_the_first_column() {
        let mut tables = HashMap::new();
        tables.insert(CATEGORIES.to_string(), Vec::new());
        let sheet = TestSheet::new(tables);
        let state = sheet.state();
        let mut store = SheetStore::new(Box::new(sheet));
        store
            .write_column(CATEGORIES, CATEGORY_STR, &cells(&["Groceries"]))
            .await;
        let tables = state.lock().unwrap().tables.clone();
        let rows = &tables[CATEGORIES];
        assert_eq!(rows[0], cells(&[CATEGORY_STR]));
        assert_eq!(rows[1], cells(&["Groceries"]));
    }

    #[tokio::test]
    async fn test_overwrite_table_builds_rows_from_columns() {
        let sheet = TestSheet::default();
        let state = sheet.state();
        let mut store = SheetStore::new(Box::new(sheet));
        store
            .overwrite_table(
                EXPENSES,
                &[
                    (EXPENSE_NAME_STR, cells(&["Coffee", "Bus"])),
                    (AMOUNT_STR, cells(&["3.50", "2.10"])),
                    (CATEGORY_STR, cells(&["Dining Out", "Transport"])),
                ],
            )
            .await;
        let tables = state.lock().unwrap().tables.clone();
        let rows = &tables[EXPENSES];
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], cells(&[EXPENSE_NAME_STR, AMOUNT_STR, CATEGORY_STR]));
        assert_eq!(rows[1], cells(&["Coffee", "3.50", "Dining Out"]));
        assert_eq!(rows[2], cells(&["Bus", "2.10", "Transport"]));
    }

    #[tokio::test]
    async fn test_overwrite_table_pads_short_columns() {
        let sheet = TestSheet::default();
        let state = sheet.state();
        let mut store = SheetStore::new(Box::new(sheet));
        store
            .overwrite_table(
                EXPENSES,
                &[
                    (EXPENSE_NAME_STR, cells(&["Coffee", "Bus"])),
                    (AMOUNT_STR, cells(&["3.50"])),
                ],
            )
            .await;
        let tables = state.lock().unwrap().tables.clone();
        let rows = &tables[EXPENSES];
        assert_eq!(rows[2], cells(&["Bus", ""]));
    }
}
