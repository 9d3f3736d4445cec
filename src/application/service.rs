use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::{
    CategorySet, ExpenseRecord, NewExpense, ValidationError, YearMonth, breakdown_by_category,
    filter_by_category, filter_by_date_range, filter_by_month, filter_by_recent_days,
    resolve_category, sort_by_date, sum,
};
use crate::storage::{Ledger, LedgerStore, LoadOutcome, StoreError};

use super::{AppError, CategoryReport, Period, PeriodTotal};

/// Application service providing high-level operations over the expense ledger.
/// This is the primary interface for any client (CLI, tests, etc.).
pub struct ExpenseService {
    store: LedgerStore,
    ledger: Ledger,
    /// Set when the in-memory ledger holds changes the last save did not write
    dirty: bool,
}

/// Result of adding an expense. The record is part of the ledger even when
/// `save_error` is set; it will be written by the next successful save.
pub struct AddResult {
    pub record: ExpenseRecord,
    pub save_error: Option<StoreError>,
}

/// Filter for listing expenses. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub month: Option<YearMonth>,
}

impl ExpenseService {
    /// Create a service over an already loaded ledger.
    pub fn new(store: LedgerStore, ledger: Ledger) -> Self {
        Self {
            store,
            ledger,
            dirty: false,
        }
    }

    /// Load the ledger from the data file at `path`. Never fails; the outcome
    /// says whether the file was missing, loaded, or unusable.
    pub async fn open(path: impl Into<PathBuf>) -> (Self, LoadOutcome) {
        let store = LedgerStore::new(path);
        let (ledger, outcome) = store.load().await;
        (Self::new(store, ledger), outcome)
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.ledger.records()
    }

    pub fn categories(&self) -> &CategorySet {
        self.ledger.categories()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ========================
    // Mutations
    // ========================

    /// Turn raw category input (menu number or name) into a category name.
    /// New names are registered so they show up in the next menu.
    pub fn choose_category(&mut self, raw: &str) -> Result<String, ValidationError> {
        let category = resolve_category(raw, self.ledger.categories())?;
        self.ledger.categories_mut().register(&category);
        Ok(category)
    }

    /// Record a new expense and persist the ledger.
    pub async fn add_expense(&mut self, expense: NewExpense) -> AddResult {
        let record = ExpenseRecord::new(expense);

        let save_error = match self.store.append(&mut self.ledger, record.clone()).await {
            Ok(()) => {
                self.dirty = false;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "expense kept in memory but not saved");
                self.dirty = true;
                Some(e)
            }
        };

        AddResult { record, save_error }
    }

    /// Write the whole ledger to the data file.
    pub async fn save(&mut self) -> Result<(), AppError> {
        match self.store.save(&self.ledger).await {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "save failed");
                self.dirty = true;
                Err(e.into())
            }
        }
    }

    /// Save only if there are unsaved changes.
    pub async fn flush(&mut self) -> Result<(), AppError> {
        if self.dirty {
            self.save().await?;
        }
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    /// Expenses matching the filter, ordered by date.
    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Vec<&ExpenseRecord> {
        let mut matched: Vec<&ExpenseRecord> = self.records().iter().collect();

        if let Some(category) = &filter.category {
            matched = filter_by_category(matched, category);
        }
        if let Some((start, end)) = filter.date_range {
            matched = filter_by_date_range(matched, start, end);
        }
        if let Some(month) = filter.month {
            matched = filter_by_month(matched, month);
        }

        sort_by_date(matched)
    }

    /// Distinct categories actually used by recorded expenses, in first-seen order.
    pub fn used_categories(&self) -> CategorySet {
        let mut used = CategorySet::empty();
        for record in self.records() {
            used.register(&record.category);
        }
        used
    }

    pub fn month_total(&self, month: YearMonth) -> PeriodTotal {
        let records = filter_by_month(self.records(), month);
        PeriodTotal {
            period: Period::Month(month),
            total: sum(records.iter().copied()),
            count: records.len(),
        }
    }

    /// Total over the `days` days up to and including `as_of`.
    pub fn recent_total(&self, days: u32, as_of: NaiveDate) -> PeriodTotal {
        let records = filter_by_recent_days(self.records(), days, as_of);
        PeriodTotal {
            period: Period::RecentDays { days, as_of },
            total: sum(records.iter().copied()),
            count: records.len(),
        }
    }

    pub fn all_time_total(&self) -> PeriodTotal {
        PeriodTotal {
            period: Period::AllTime,
            total: sum(self.records()),
            count: self.ledger.len(),
        }
    }

    /// Spending per category across every recorded expense.
    pub fn category_report(&self) -> CategoryReport {
        let categories = breakdown_by_category(self.records());
        let total = categories.iter().map(|c| c.total).sum();
        CategoryReport { categories, total }
    }
}
