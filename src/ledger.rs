//! The ledger: the in-memory expense and category sequences, their invariants, and their
//! persistence through the [`SheetStore`].

use crate::api::{CATEGORIES, EXPENSES};
use crate::model::{
    Amount, AmountError, Expense, ExpenseUpdates, Summary, AMOUNT_STR, CATEGORY_STR,
    EXPENSE_NAME_STR,
};
use crate::store::SheetStore;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error};

/// How [`Ledger::load`] treats expense columns of unequal length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Pair the columns positionally and drop trailing entries of longer columns.
    #[default]
    Truncate,
    /// Fail with [`LedgerError::MisalignedColumns`] instead of dropping data.
    Strict,
}

/// Rejections the ledger reports to its callers.
///
/// Backend failures never appear here; the store absorbs those. A rejected operation did not
/// happen: nothing was mutated and nothing was persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("expense {index} does not exist; there are {len} expenses")]
    ExpenseIndexOutOfRange { index: usize, len: usize },

    #[error("category {index} does not exist; there are {len} categories")]
    CategoryIndexOutOfRange { index: usize, len: usize },

    #[error("the category '{0}' already exists")]
    DuplicateCategory(String),

    #[error(
        "the expense columns are misaligned: {names} names, {amounts} amounts, {categories} categories"
    )]
    MisalignedColumns {
        names: usize,
        amounts: usize,
        categories: usize,
    },
}

/// The expense and category sequences, the session budget, and the store they persist to.
///
/// Both sequences are ordered: insertion order is display order is persistence order. Every
/// mutating operation rewrites the backing sheet, the whole "expenses" tab for expense changes
/// and just the category column for category changes. The budget is an in-memory scalar and is
/// never persisted.
///
/// Indices are 1-based, matching how the shell displays the lists. An out-of-range index is
/// rejected without mutation or persistence.
pub struct Ledger {
    store: SheetStore,
    expenses: Vec<Expense>,
    categories: Vec<String>,
    budget: Amount,
}

impl Ledger {
    /// Reads the sheet and rebuilds the ledger: the Nth name, amount, and category cells form
    /// the Nth expense.
    ///
    /// In [`LoadMode::Truncate`] mode, columns of unequal length are paired up to the shortest
    /// and the rest is dropped. An unparseable amount cell empties the expense list, with one
    /// error log, rather than failing startup; categories still load.
    pub async fn load(mut store: SheetStore, mode: LoadMode) -> Result<Self, LedgerError> {
        let names = store.read_column(EXPENSES, EXPENSE_NAME_STR).await;
        let amounts = store.read_column(EXPENSES, AMOUNT_STR).await;
        let expense_categories = store.read_column(EXPENSES, CATEGORY_STR).await;
        if mode == LoadMode::Strict
            && (names.len() != amounts.len() || names.len() != expense_categories.len())
        {
            return Err(LedgerError::MisalignedColumns {
                names: names.len(),
                amounts: amounts.len(),
                categories: expense_categories.len(),
            });
        }
        let expenses = match zip_expenses(names, amounts, expense_categories) {
            Ok(expenses) => expenses,
            Err(e) => {
                error!("Unable to rebuild the expense list from the sheet: {e}");
                Vec::new()
            }
        };
        let categories = store.read_column(CATEGORIES, CATEGORY_STR).await;
        debug!(
            "loaded {} expenses and {} categories",
            expenses.len(),
            categories.len()
        );
        Ok(Self {
            store,
            expenses,
            categories,
            budget: Amount::default(),
        })
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn budget(&self) -> Amount {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Amount) {
        self.budget = budget;
    }

    /// The expense at the 1-based `index`.
    pub fn expense_at(&self, index: usize) -> Result<&Expense, LedgerError> {
        let slot = self.expense_slot(index)?;
        Ok(&self.expenses[slot])
    }

    /// The category label at the 1-based `index`.
    pub fn category_at(&self, index: usize) -> Result<&str, LedgerError> {
        let slot = self.category_slot(index)?;
        Ok(&self.categories[slot])
    }

    /// Appends an expense and rewrites the expenses tab.
    pub async fn add_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
        self.persist_expenses().await;
    }

    /// Applies a partial update to the expense at the 1-based `index` and rewrites the
    /// expenses tab. Returns the updated expense.
    pub async fn update_expense(
        &mut self,
        index: usize,
        updates: ExpenseUpdates,
    ) -> Result<Expense, LedgerError> {
        let slot = self.expense_slot(index)?;
        self.expenses[slot].apply(updates);
        let updated = self.expenses[slot].clone();
        self.persist_expenses().await;
        Ok(updated)
    }

    /// Removes the expense at the 1-based `index` and rewrites the expenses tab. Later
    /// expenses shift down one position. Returns the removed expense.
    pub async fn remove_expense(&mut self, index: usize) -> Result<Expense, LedgerError> {
        let slot = self.expense_slot(index)?;
        let removed = self.expenses.remove(slot);
        self.persist_expenses().await;
        Ok(removed)
    }

    /// Appends a category label and rewrites the category column. A label equal to an
    /// existing one (exact match) is rejected.
    pub async fn add_category(&mut self, label: impl Into<String>) -> Result<(), LedgerError> {
        let label = label.into();
        if self.categories.contains(&label) {
            return Err(LedgerError::DuplicateCategory(label));
        }
        self.categories.push(label);
        self.persist_categories().await;
        Ok(())
    }

    /// Replaces the label at the 1-based `index` and rewrites the category column. Expenses
    /// that reference the old label keep it. Returns the old label.
    pub async fn rename_category(
        &mut self,
        index: usize,
        label: impl Into<String>,
    ) -> Result<String, LedgerError> {
        let slot = self.category_slot(index)?;
        let old = std::mem::replace(&mut self.categories[slot], label.into());
        self.persist_categories().await;
        Ok(old)
    }

    /// Removes the label at the 1-based `index` and rewrites the category column. Expenses
    /// that reference the label keep it. Returns the removed label.
    pub async fn remove_category(&mut self, index: usize) -> Result<String, LedgerError> {
        let slot = self.category_slot(index)?;
        let removed = self.categories.remove(slot);
        self.persist_categories().await;
        Ok(removed)
    }

    /// Summarizes the current expenses against `budget`. The stored budget is not consulted;
    /// callers choose which value to compare against.
    pub fn summarize(&self, budget: Amount) -> Summary {
        Summary::compute(&self.expenses, budget)
    }

    fn expense_slot(&self, index: usize) -> Result<usize, LedgerError> {
        let len = self.expenses.len();
        if index == 0 || index > len {
            return Err(LedgerError::ExpenseIndexOutOfRange { index, len });
        }
        Ok(index - 1)
    }

    fn category_slot(&self, index: usize) -> Result<usize, LedgerError> {
        let len = self.categories.len();
        if index == 0 || index > len {
            return Err(LedgerError::CategoryIndexOutOfRange { index, len });
        }
        Ok(index - 1)
    }

    /// Rewrites the whole expenses tab from the in-memory sequence.
    async fn persist_expenses(&mut self) {
        let names: Vec<String> = self.expenses.iter().map(|e| e.name().to_string()).collect();
        let amounts: Vec<String> = self
            .expenses
            .iter()
            .map(|e| e.amount().value().to_string())
            .collect();
        let categories: Vec<String> = self
            .expenses
            .iter()
            .map(|e| e.category().to_string())
            .collect();
        self.store
            .overwrite_table(
                EXPENSES,
                &[
                    (EXPENSE_NAME_STR, names),
                    (AMOUNT_STR, amounts),
                    (CATEGORY_STR, categories),
                ],
            )
            .await;
    }

    /// Rewrites the category column from the in-memory sequence.
    async fn persist_categories(&mut self) {
        self.store
            .write_column(CATEGORIES, CATEGORY_STR, &self.categories)
            .await;
    }
}

/// Pairs the three columns positionally into expenses, stopping at the shortest column.
fn zip_expenses(
    names: Vec<String>,
    amounts: Vec<String>,
    categories: Vec<String>,
) -> Result<Vec<Expense>, AmountError> {
    names
        .into_iter()
        .zip(amounts)
        .zip(categories)
        .map(|((name, amount), category)| {
            Ok(Expense::new(name, Amount::from_str(&amount)?, category))
        })
        .collect()
}
