//! Pure validators for raw user input. They never prompt or retry; callers
//! decide whether to ask again or give up.

use chrono::NaiveDate;
use thiserror::Error;

use super::{
    CategorySet, Cents, DATE_FORMAT, ParseCentsError, YearMonth, parse_cents, title_case,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid amount. Use '50.00' or '50'")]
    InvalidAmount(String),

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Category cannot be empty")]
    EmptyCategory,

    #[error("Please enter a number between 1 and {max}")]
    CategoryOutOfRange { choice: usize, max: usize },

    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month '{0}'. Use YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid number of days '{0}'. Use a whole number of at least 1")]
    InvalidDays(String),

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Parse an amount and require it to be strictly positive.
pub fn validate_amount(raw: &str) -> Result<Cents, ValidationError> {
    let cents = parse_cents(raw).map_err(|e| match e {
        ParseCentsError::InvalidFormat | ParseCentsError::Overflow => {
            ValidationError::InvalidAmount(raw.trim().to_string())
        }
    })?;

    if cents <= 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(cents)
}

/// Trim a category name and require it to be non-empty.
pub fn validate_category(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(name.to_string())
}

/// Resolve category input against the known set: a number selects by menu
/// position, anything else is a (possibly new) title-cased name.
pub fn resolve_category(raw: &str, known: &CategorySet) -> Result<String, ValidationError> {
    let input = raw.trim();

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        let choice = input.parse::<usize>().unwrap_or(0);
        return known
            .by_position(choice)
            .map(str::to_string)
            .ok_or(ValidationError::CategoryOutOfRange {
                choice,
                max: known.len(),
            });
    }

    validate_category(&title_case(input))
}

pub fn validate_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.trim().to_string()))
}

/// Parse an optional date, defaulting to `today` when absent or blank.
pub fn validate_date_or(
    raw: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => validate_date(s),
        _ => Ok(today),
    }
}

pub fn validate_month(raw: &str) -> Result<YearMonth, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidMonth(raw.trim().to_string()))
}

/// Parse a look-back window length: a whole number of days, at least 1.
pub fn validate_days(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(ValidationError::InvalidDays(raw.trim().to_string())),
    }
}

/// Validate an inclusive date range given as two raw strings.
pub fn validate_date_range(
    start: &str,
    end: &str,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let start = validate_date(start)?;
    let end = validate_date(end)?;
    if start > end {
        return Err(ValidationError::InvertedRange { start, end });
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount("12.50"), Ok(1250));
        assert_eq!(validate_amount(" 40 "), Ok(4000));
        assert_eq!(validate_amount("0"), Err(ValidationError::NonPositiveAmount));
        assert_eq!(validate_amount("-3"), Err(ValidationError::NonPositiveAmount));
        assert_eq!(
            validate_amount("ten"),
            Err(ValidationError::InvalidAmount("ten".into()))
        );
    }

    #[test]
    fn test_resolve_category_by_position() {
        let known = CategorySet::default();
        assert_eq!(resolve_category("4", &known), Ok("Bills".into()));
        assert_eq!(
            resolve_category("9", &known),
            Err(ValidationError::CategoryOutOfRange { choice: 9, max: 7 })
        );
        assert_eq!(
            resolve_category("0", &known),
            Err(ValidationError::CategoryOutOfRange { choice: 0, max: 7 })
        );
    }

    #[test]
    fn test_resolve_category_by_name() {
        let known = CategorySet::default();
        assert_eq!(resolve_category("  coffee ", &known), Ok("Coffee".into()));
        assert_eq!(resolve_category("food", &known), Ok("Food".into()));
        assert_eq!(resolve_category("", &known), Err(ValidationError::EmptyCategory));
    }

    #[test]
    fn test_validate_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(validate_date("2024-02-29"), Ok(expected));
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("29/02/2024").is_err());
    }

    #[test]
    fn test_validate_date_or_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(validate_date_or(None, today), Ok(today));
        assert_eq!(validate_date_or(Some("  "), today), Ok(today));
        assert!(validate_date_or(Some("nope"), today).is_err());
    }

    #[test]
    fn test_validate_month() {
        let month = validate_month("2024-01").unwrap();
        assert_eq!(month.to_string(), "2024-01");
        assert_eq!(
            validate_month("2024-13"),
            Err(ValidationError::InvalidMonth("2024-13".into()))
        );
        assert!(validate_month("January").is_err());
    }

    #[test]
    fn test_validate_days() {
        assert_eq!(validate_days("7"), Ok(7));
        assert_eq!(validate_days(" 30 "), Ok(30));
        assert_eq!(validate_days("0"), Err(ValidationError::InvalidDays("0".into())));
        assert_eq!(validate_days("-3"), Err(ValidationError::InvalidDays("-3".into())));
        assert!(validate_days("1.5").is_err());
        assert!(validate_days("week").is_err());
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range("2024-01-01", "2024-01-31").is_ok());
        assert!(validate_date_range("2024-01-05", "2024-01-05").is_ok());
        assert!(matches!(
            validate_date_range("2024-02-01", "2024-01-01"),
            Err(ValidationError::InvertedRange { .. })
        ));
    }
}
