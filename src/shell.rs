//! The interactive menu session.
//!
//! Every prompt writes to stdout and reads one line from stdin. All durable state lives in the
//! [`Ledger`]; this module only parses input, routes to ledger operations, and prints the
//! outcome. Validation rejections re-prompt or abandon the operation; they never end the
//! session. Reaching end of input does end it, so a closed stdin cannot spin the menu forever.

use crate::ledger::{Ledger, LedgerError};
use crate::model::{Amount, BudgetStanding, Expense, ExpenseUpdates};
use crate::Result;
use anyhow::{bail, Context};
use crossterm::style::Stylize;
use std::io::{self, Write};
use std::str::FromStr;

/// Runs the menu loop until the user exits or stdin closes.
pub(crate) async fn run(ledger: &mut Ledger) -> Result<()> {
    let budget = prompt_amount("Enter your monthly budget: ")?;
    ledger.set_budget(budget);
    loop {
        println!("Expense Tracker Menu");
        println!("1. Add Expense");
        println!("2. Display Expenses");
        println!("3. Edit/Remove Expense");
        println!("4. Adjust Monthly Budget");
        println!("5. Manage Categories");
        println!("6. Summarize Expenses");
        println!("7. Exit");
        let choice = read_line("Select an option: ")?;
        match choice.as_str() {
            "1" => add_expense(ledger).await?,
            "2" => display_expenses(ledger),
            "3" => edit_or_remove_expense(ledger).await?,
            "4" => adjust_budget(ledger)?,
            "5" => manage_categories(ledger).await?,
            "6" => summarize(ledger)?,
            "7" => return Ok(()),
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

async fn add_expense(ledger: &mut Ledger) -> Result<()> {
    if ledger.categories().is_empty() {
        println!("There are no categories yet. Add one under Manage Categories first.");
        return Ok(());
    }
    let name = loop {
        let name = read_line("Enter expense name: ")?;
        if !name.is_empty() {
            break name;
        }
        println!("The name cannot be empty.");
    };
    let amount = prompt_amount("Enter expense amount: ")?;
    let category = loop {
        println!("Select a category: ");
        for (i, label) in ledger.categories().iter().enumerate() {
            println!("  {}. {label}", i + 1);
        }
        let prompt = format!("Enter a category number [1 - {}]: ", ledger.categories().len());
        let selection = prompt_index(&prompt)?.and_then(|index| ledger.category_at(index).ok());
        match selection {
            Some(label) => break label.to_string(),
            None => println!("Invalid category. Please try again!"),
        }
    };
    ledger.add_expense(Expense::new(name, amount, category)).await;
    println!("Expense added successfully.");
    Ok(())
}

fn display_expenses(ledger: &Ledger) {
    if ledger.expenses().is_empty() {
        println!("There are no expenses yet.");
        return;
    }
    for (i, expense) in ledger.expenses().iter().enumerate() {
        println!("{}. {expense}", i + 1);
    }
}

async fn edit_or_remove_expense(ledger: &mut Ledger) -> Result<()> {
    if ledger.expenses().is_empty() {
        println!("There are no expenses yet.");
        return Ok(());
    }
    display_expenses(ledger);
    let Some(index) = prompt_index("Enter the index of the expense to edit/remove: ")? else {
        println!("Invalid expense index.");
        return Ok(());
    };
    let Ok(expense) = ledger.expense_at(index) else {
        println!("Invalid expense index.");
        return Ok(());
    };
    println!("Selected Expense: {expense}");
    println!("1. Edit Expense");
    println!("2. Remove Expense");
    let action = read_line("Select an option (1 or 2): ")?;
    match action.as_str() {
        "1" => {
            let updates = prompt_updates()?;
            match ledger.update_expense(index, updates).await {
                Ok(_) => println!("Expense updated successfully."),
                Err(e) => println!("{e}"),
            }
        }
        "2" => match ledger.remove_expense(index).await {
            Ok(removed) => println!("Expense '{removed}' removed successfully."),
            Err(e) => println!("{e}"),
        },
        _ => println!("Invalid option."),
    }
    Ok(())
}

/// Prompts for each expense field; pressing Enter keeps the current value. The replacement
/// category is free text: the category set constrains expenses at creation time only.
fn prompt_updates() -> Result<ExpenseUpdates> {
    let name =
        read_line("Enter the updated expense name (or press Enter to keep the current name): ")?;
    let amount = loop {
        let line = read_line(
            "Enter the updated expense amount (or press Enter to keep the current amount): ",
        )?;
        if line.is_empty() {
            break None;
        }
        match Amount::from_str(&line) {
            Ok(amount) if !amount.is_negative() => break Some(amount),
            Ok(_) => println!("The amount cannot be negative."),
            Err(e) => println!("{e}"),
        }
    };
    let category = read_line(
        "Enter the updated expense category (or press Enter to keep the current category): ",
    )?;
    Ok(ExpenseUpdates {
        name: (!name.is_empty()).then_some(name),
        amount,
        category: (!category.is_empty()).then_some(category),
    })
}

fn adjust_budget(ledger: &mut Ledger) -> Result<()> {
    let budget = prompt_amount("Enter your monthly budget: ")?;
    ledger.set_budget(budget);
    println!("Monthly budget adjusted to {budget}");
    Ok(())
}

async fn manage_categories(ledger: &mut Ledger) -> Result<()> {
    loop {
        println!("Category Management");
        println!("1. Display Items");
        println!("2. Add Item");
        println!("3. Edit Item");
        println!("4. Delete Item");
        println!("5. Exit");
        let choice = read_line("Select an option: ")?;
        match choice.as_str() {
            "1" => display_categories(ledger),
            "2" => {
                let label = read_line("Enter the new category: ")?;
                if label.is_empty() {
                    // A trailing empty cell would be trimmed away on the next load.
                    println!("The category cannot be empty.");
                    continue;
                }
                match ledger.add_category(label.clone()).await {
                    Ok(()) => println!("Category '{label}' added successfully."),
                    Err(LedgerError::DuplicateCategory(_)) => {
                        println!("Category already exists.")
                    }
                    Err(e) => println!("{e}"),
                }
            }
            "3" => {
                display_categories(ledger);
                let Some(index) = prompt_index("Enter the index of the category to edit: ")?
                else {
                    println!("Invalid index.");
                    continue;
                };
                let Ok(current) = ledger.category_at(index) else {
                    println!("Invalid index.");
                    continue;
                };
                let label = read_line(&format!("Enter the new value for '{current}': "))?;
                if label.is_empty() {
                    println!("The category cannot be empty.");
                    continue;
                }
                match ledger.rename_category(index, label).await {
                    Ok(_) => println!("Category updated successfully."),
                    Err(_) => println!("Invalid index."),
                }
            }
            "4" => {
                display_categories(ledger);
                let Some(index) = prompt_index("Enter the index of the category to delete: ")?
                else {
                    println!("Invalid index.");
                    continue;
                };
                match ledger.remove_category(index).await {
                    Ok(removed) => println!("Category '{removed}' deleted successfully."),
                    Err(_) => println!("Invalid index."),
                }
            }
            "5" => return Ok(()),
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn display_categories(ledger: &Ledger) {
    println!("Category List:");
    for (i, label) in ledger.categories().iter().enumerate() {
        println!("{}. {label}", i + 1);
    }
}

fn summarize(ledger: &Ledger) -> Result<()> {
    let budget = prompt_amount("Enter your monthly budget: ")?;
    let summary = ledger.summarize(budget);
    let total = format!("Total Expenses: {}", summary.total());
    match summary.standing() {
        BudgetStanding::UnderBudget => println!("{}", total.green()),
        BudgetStanding::OverBudget => println!("{}", total.red()),
        BudgetStanding::OnBudget => println!("{total}"),
    }
    println!("Category-wise Expenses:");
    for (label, sum) in summary.category_totals() {
        println!("{label}: {}", sum.to_string().green());
    }
    Ok(())
}

/// Prints `prompt` and reads one trimmed line. Fails on end of input.
fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("Unable to flush stdout")?;
    let mut line = String::new();
    let read = io::stdin()
        .read_line(&mut line)
        .context("Unable to read from stdin")?;
    if read == 0 {
        bail!("Reached end of input");
    }
    Ok(line.trim().to_string())
}

/// Prompts until a non-negative amount is entered.
fn prompt_amount(prompt: &str) -> Result<Amount> {
    loop {
        let line = read_line(prompt)?;
        match Amount::from_str(&line) {
            Ok(amount) if !amount.is_negative() => return Ok(amount),
            Ok(_) => println!("The amount cannot be negative."),
            Err(e) => println!("{e}"),
        }
    }
}

/// Prompts once for a 1-based index; `None` when the input is not a number.
fn prompt_index(prompt: &str) -> Result<Option<usize>> {
    let line = read_line(prompt)?;
    Ok(line.parse().ok())
}
