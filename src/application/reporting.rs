use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryTotal, Cents, YearMonth};

/// The window a [`PeriodTotal`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Month(YearMonth),
    RecentDays { days: u32, as_of: NaiveDate },
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub period: Period,
    pub total: Cents,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Ordered by descending total
    pub categories: Vec<CategoryTotal>,
    pub total: Cents,
}

impl CategoryReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
