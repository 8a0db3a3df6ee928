//! The `Expense` record and the sheet header constants for its columns.

use crate::model::Amount;
use std::fmt;

/// Header of the name column in the "expenses" tab.
pub(crate) const EXPENSE_NAME_STR: &str = "Expense Name";
/// Header of the amount column in the "expenses" tab.
pub(crate) const AMOUNT_STR: &str = "Amount";
/// Header of the category column, used by both tabs.
pub(crate) const CATEGORY_STR: &str = "Category";

/// One recorded expense transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    name: String,
    amount: Amount,
    category: String,
}

impl Expense {
    pub fn new(name: impl Into<String>, amount: Amount, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            category: category.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Applies a partial update; fields that are `None` keep their value.
    pub(crate) fn apply(&mut self, updates: ExpenseUpdates) {
        if let Some(name) = updates.name {
            self.name = name;
        }
        if let Some(amount) = updates.amount {
            self.amount = amount;
        }
        if let Some(category) = updates.category {
            self.category = category;
        }
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.name, self.category, self.amount)
    }
}

/// The fields of an expense edit. `None` means "keep the current value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseUpdates {
    pub name: Option<String>,
    pub amount: Option<Amount>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display() {
        let expense = Expense::new("Coffee", Amount::from_str("3.5").unwrap(), "Food");
        assert_eq!(expense.to_string(), "Coffee - Food - 3.50");
    }

    #[test]
    fn test_apply_full_update() {
        let mut expense = Expense::new("Coffee", Amount::from_str("3.50").unwrap(), "Food");
        expense.apply(ExpenseUpdates {
            name: Some("Espresso".into()),
            amount: Some(Amount::from_str("2.80").unwrap()),
            category: Some("Drinks".into()),
        });
        assert_eq!(
            expense,
            Expense::new("Espresso", Amount::from_str("2.80").unwrap(), "Drinks")
        );
    }

    #[test]
    fn test_apply_partial_update_keeps_other_fields() {
        let mut expense = Expense::new("Coffee", Amount::from_str("3.50").unwrap(), "Food");
        expense.apply(ExpenseUpdates {
            amount: Some(Amount::from_str("4.00").unwrap()),
            ..ExpenseUpdates::default()
        });
        assert_eq!(expense.name(), "Coffee");
        assert_eq!(expense.category(), "Food");
        assert_eq!(expense.amount(), Amount::from_str("4.00").unwrap());
    }

    #[test]
    fn test_apply_empty_update_is_a_no_op() {
        let mut expense = Expense::new("Coffee", Amount::from_str("3.50").unwrap(), "Food");
        let before = expense.clone();
        expense.apply(ExpenseUpdates::default());
        assert_eq!(expense, before);
    }
}
