//! Query and aggregation over expense records.
//!
//! Every function here is pure: it only reads the records it is given and
//! returns a new view. Empty input always produces an empty or zero result.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Cents, ExpenseRecord};

/// A calendar month, e.g. `2024-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearMonthError;

impl fmt::Display for ParseYearMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month must be in YYYY-MM format")
    }
}

impl std::error::Error for ParseYearMonthError {}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(ParseYearMonthError)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(ParseYearMonthError);
        }
        let year: i32 = year.parse().map_err(|_| ParseYearMonthError)?;
        let month: u32 = month.parse().map_err(|_| ParseYearMonthError)?;
        Self::new(year, month).ok_or(ParseYearMonthError)
    }
}

/// Total spent in one category, with its share of the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub percentage: f64,
}

/// Records whose category matches exactly (case-sensitive).
pub fn filter_by_category<'a, I>(records: I, category: &str) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| r.category == category)
        .collect()
}

/// Records dated within `start..=end`. Records with an unparsable stored
/// date are skipped.
pub fn filter_by_date_range<'a, I>(
    records: I,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| {
            r.parsed_date()
                .is_some_and(|date| start <= date && date <= end)
        })
        .collect()
}

/// Records dated within the given calendar month.
pub fn filter_by_month<'a, I>(records: I, month: YearMonth) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| r.parsed_date().is_some_and(|date| month.contains(date)))
        .collect()
}

/// Records dated within the `days` days up to and including `as_of`.
pub fn filter_by_recent_days<'a, I>(
    records: I,
    days: u32,
    as_of: NaiveDate,
) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let start = as_of
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    filter_by_date_range(records, start, as_of)
}

/// Records ordered by date, oldest first. Records sharing a date keep their
/// insertion order; unparsable dates sort first.
pub fn sort_by_date<'a, I>(records: I) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut sorted: Vec<&ExpenseRecord> = records.into_iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|r| r.parsed_date());
    sorted
}

/// Sum of all amounts.
pub fn sum<'a, I>(records: I) -> Cents
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records.into_iter().map(|r| r.amount_cents).sum()
}

/// Group records by category and total each group. Groups are ordered by
/// descending total; equal totals keep the order the category first appeared.
/// When the grand total is zero every percentage is reported as 0.
pub fn breakdown_by_category<'a, I>(records: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.category.as_str()) {
            Some(&i) => {
                groups[i].total += record.amount_cents;
                groups[i].count += 1;
            }
            None => {
                index.insert(record.category.as_str(), groups.len());
                groups.push(CategoryTotal {
                    category: record.category.clone(),
                    total: record.amount_cents,
                    count: 1,
                    percentage: 0.0,
                });
            }
        }
    }

    let grand_total: Cents = groups.iter().map(|g| g.total).sum();
    if grand_total != 0 {
        for group in &mut groups {
            group.percentage = group.total as f64 / grand_total as f64 * 100.0;
        }
    }

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}
