mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
mod shell;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub use api::{Mode, Sheet};
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use ledger::{Ledger, LedgerError, LoadMode};
pub use model::{Amount, BudgetStanding, Expense, ExpenseUpdates, Summary};
pub use store::SheetStore;
