use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Cents, ValidationError, cents_from_f64, cents_to_f64, validate_category};

/// Storage format for record dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single recorded expense. Records are immutable once created; the only
/// way to remove one is to edit the data file by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredExpense", into = "StoredExpense")]
pub struct ExpenseRecord {
    /// Amount in cents (always positive for records created by this tool)
    pub amount_cents: Cents,
    pub category: String,
    /// Calendar date as stored (`YYYY-MM-DD`). Kept verbatim so a hand-edited
    /// file with a bad date still loads; see [`ExpenseRecord::parsed_date`].
    pub date: String,
    pub description: String,
    /// When the record was captured, informational only. Hand-written
    /// records may not have one.
    pub timestamp: Option<NaiveDateTime>,
    /// Amount as read from the data file when it was finer than a cent
    loaded_amount: Option<f64>,
}

impl ExpenseRecord {
    /// Build a record from validated input, stamped with the current local time.
    pub fn new(expense: NewExpense) -> Self {
        Self::with_timestamp(expense, Local::now().naive_local())
    }

    pub fn with_timestamp(expense: NewExpense, timestamp: NaiveDateTime) -> Self {
        Self {
            amount_cents: expense.amount_cents,
            category: expense.category,
            date: expense.date.format(DATE_FORMAT).to_string(),
            description: expense.description,
            timestamp: Some(timestamp),
            loaded_amount: None,
        }
    }

    /// The record date, or `None` when the stored text is not a valid date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// The amount written to the data file. Sub-cent amounts read from an
    /// existing file are written back exactly as they were read.
    pub fn stored_amount(&self) -> f64 {
        self.loaded_amount
            .filter(|&amount| cents_from_f64(amount) == Some(self.amount_cents))
            .unwrap_or_else(|| cents_to_f64(self.amount_cents))
    }
}

/// On-disk shape of a record.
#[derive(Serialize, Deserialize)]
struct StoredExpense {
    amount: f64,
    category: String,
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<NaiveDateTime>,
}

impl TryFrom<StoredExpense> for ExpenseRecord {
    type Error = String;

    fn try_from(stored: StoredExpense) -> Result<Self, Self::Error> {
        let amount_cents = cents_from_f64(stored.amount)
            .ok_or_else(|| format!("amount out of range: {}", stored.amount))?;
        let loaded_amount = (cents_to_f64(amount_cents) != stored.amount).then_some(stored.amount);

        Ok(Self {
            amount_cents,
            category: stored.category,
            date: stored.date,
            description: stored.description,
            timestamp: stored.timestamp,
            loaded_amount,
        })
    }
}

impl From<ExpenseRecord> for StoredExpense {
    fn from(record: ExpenseRecord) -> Self {
        Self {
            amount: record.stored_amount(),
            category: record.category,
            date: record.date,
            description: record.description,
            timestamp: record.timestamp,
        }
    }
}

/// Validated input for a new expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub amount_cents: Cents,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl NewExpense {
    pub fn new(
        amount_cents: Cents,
        category: &str,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        let category = validate_category(category)?;

        Ok(Self {
            amount_cents,
            category,
            date,
            description: description.into().trim().to_string(),
        })
    }
}
