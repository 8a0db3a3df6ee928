//! Types that represent the ledger's data model.

mod amount;
mod expense;
mod summary;

pub use amount::{Amount, AmountError};
pub use expense::{Expense, ExpenseUpdates};
pub use summary::{BudgetStanding, Summary};

pub(crate) use expense::{AMOUNT_STR, CATEGORY_STR, EXPENSE_NAME_STR};
