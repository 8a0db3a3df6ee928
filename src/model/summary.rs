//! Budget-relative summarization of the expense sequence.

use crate::model::{Amount, Expense};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Where a total stands relative to a budget.
///
/// The classification is an exact decimal comparison with no tolerance: one
/// cent over the budget is `OverBudget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStanding {
    UnderBudget,
    OverBudget,
    OnBudget,
}

/// The result of summarizing the expense sequence against a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    total: Amount,
    category_totals: Vec<(String, Amount)>,
    standing: BudgetStanding,
}

impl Summary {
    /// Computes the total and the per-category totals in a single pass over
    /// the expenses, grouping categories in first-seen order (exact label
    /// match, case-sensitive), and classifies the total against `budget`.
    pub fn compute(expenses: &[Expense], budget: Amount) -> Self {
        let mut total = Decimal::ZERO;
        let mut category_totals: Vec<(String, Decimal)> = Vec::new();
        for expense in expenses {
            let amount = expense.amount().value();
            total += amount;
            match category_totals
                .iter_mut()
                .find(|(label, _)| label.as_str() == expense.category())
            {
                Some((_, sum)) => *sum += amount,
                None => category_totals.push((expense.category().to_string(), amount)),
            }
        }
        let standing = match total.cmp(&budget.value()) {
            Ordering::Less => BudgetStanding::UnderBudget,
            Ordering::Greater => BudgetStanding::OverBudget,
            Ordering::Equal => BudgetStanding::OnBudget,
        };
        Self {
            total: Amount::new(total),
            category_totals: category_totals
                .into_iter()
                .map(|(label, sum)| (label, Amount::new(sum)))
                .collect(),
            standing,
        }
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn category_totals(&self) -> &[(String, Amount)] {
        &self.category_totals
    }

    pub fn standing(&self) -> BudgetStanding {
        self.standing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn expense(name: &str, amount: &str, category: &str) -> Expense {
        Expense::new(name, Amount::from_str(amount).unwrap(), category)
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_sequence_totals_zero() {
        let summary = Summary::compute(&[], amount("100"));
        assert!(summary.total().is_zero());
        assert!(summary.category_totals().is_empty());
        assert_eq!(summary.standing(), BudgetStanding::UnderBudget);
    }

    #[test]
    fn test_total_is_the_sum_of_all_amounts() {
        let expenses = vec![
            expense("Rent", "850.00", "Housing"),
            expense("Groceries", "54.30", "Food"),
            expense("Coffee", "3.20", "Food"),
        ];
        let summary = Summary::compute(&expenses, amount("1000"));
        assert_eq!(summary.total(), amount("907.50"));
    }

    #[test]
    fn test_category_totals_sum_to_the_total() {
        let expenses = vec![
            expense("Rent", "850.00", "Housing"),
            expense("Groceries", "54.30", "Food"),
            expense("Coffee", "3.20", "Food"),
            expense("Bus", "2.50", "Transport"),
        ];
        let summary = Summary::compute(&expenses, amount("1000"));
        let grouped: Decimal = summary
            .category_totals()
            .iter()
            .map(|(_, sum)| sum.value())
            .sum();
        assert_eq!(grouped, summary.total().value());
        let food = summary
            .category_totals()
            .iter()
            .find(|(label, _)| label == "Food")
            .map(|(_, sum)| *sum);
        assert_eq!(food, Some(amount("57.50")));
    }

    #[test]
    fn test_categories_group_in_first_seen_order() {
        let expenses = vec![
            expense("Bus", "2.50", "Transport"),
            expense("Rent", "850.00", "Housing"),
            expense("Train", "12.00", "Transport"),
        ];
        let summary = Summary::compute(&expenses, amount("1000"));
        let labels: Vec<&str> = summary
            .category_totals()
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["Transport", "Housing"]);
    }

    #[test]
    fn test_grouping_is_case_sensitive() {
        let expenses = vec![
            expense("Groceries", "10.00", "Food"),
            expense("Takeout", "20.00", "food"),
        ];
        let summary = Summary::compute(&expenses, amount("100"));
        assert_eq!(summary.category_totals().len(), 2);
    }

    #[test]
    fn test_budget_classification_boundaries() {
        let expenses = vec![expense("Rent", "100.00", "Housing")];
        let on = Summary::compute(&expenses, amount("100.00"));
        assert_eq!(on.standing(), BudgetStanding::OnBudget);
        let under = Summary::compute(&expenses, amount("100.01"));
        assert_eq!(under.standing(), BudgetStanding::UnderBudget);
        let over = Summary::compute(&expenses, amount("99.99"));
        assert_eq!(over.standing(), BudgetStanding::OverBudget);
    }
}
