// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use spendbook::application::ExpenseService;
use spendbook::domain::{Cents, NewExpense};
use spendbook::storage::LoadOutcome;
use tempfile::TempDir;

/// Helper to create a test service over a data file in a temporary directory
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let (service, outcome) = ExpenseService::open(temp_dir.path().join("expenses.json")).await;
    assert_eq!(outcome, LoadOutcome::Fresh);
    Ok((service, temp_dir))
}

/// Reopen the data file behind a service, as a new process would
pub async fn reopen(service: &ExpenseService) -> (ExpenseService, LoadOutcome) {
    ExpenseService::open(service.store().path()).await
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn expense(amount_cents: Cents, category: &str, date: &str, description: &str) -> NewExpense {
    NewExpense::new(amount_cents, category, parse_date(date), description).unwrap()
}

/// Test fixture: the three-expense example used across the reporting tests
pub async fn add_sample_expenses(service: &mut ExpenseService) -> Result<()> {
    for e in [
        expense(1250, "Food", "2024-01-05", "groceries"),
        expense(4000, "Bills", "2024-01-20", "electricity"),
        expense(725, "Food", "2024-02-01", ""),
    ] {
        let result = service.add_expense(e).await;
        if let Some(err) = result.save_error {
            return Err(err.into());
        }
    }
    Ok(())
}
