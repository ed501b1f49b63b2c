//! Field checks applied to a submitted expense before it reaches the store.
//!
//! Checks run in a fixed order (amount, category, date) and every failing
//! field is reported, never only the first one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Category, MoneyCents, expense::NewExpense};

/// Largest amount (in major units) accepted from the wire.
const MAX_MAJOR_AMOUNT: f64 = 1e13;

/// Raw submission, as received. Fields keep their JSON shape so that type
/// mismatches become validation issues instead of decode errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
}

/// A single failed field check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationIssue {
    AmountMissing,
    AmountNotNumeric,
    AmountNotPositive,
    AmountTooPrecise,
    CategoryMissing,
    CategoryNotAllowed,
    DateInvalid,
}

impl ValidationIssue {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::AmountMissing
            | Self::AmountNotNumeric
            | Self::AmountNotPositive
            | Self::AmountTooPrecise => "amount",
            Self::CategoryMissing | Self::CategoryNotAllowed => "category",
            Self::DateInvalid => "date",
        }
    }

    /// `true` when the field was absent rather than malformed.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::AmountMissing | Self::CategoryMissing)
    }
}

impl core::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AmountMissing => f.write_str("Amount is required"),
            Self::AmountNotNumeric => f.write_str("Amount must be a valid number"),
            Self::AmountNotPositive => f.write_str("Amount must be greater than zero"),
            Self::AmountTooPrecise => f.write_str("Amount must have at most two decimal places"),
            Self::CategoryMissing => f.write_str("Category is required"),
            Self::CategoryNotAllowed => write!(
                f,
                "Category must be one of: {}",
                Category::names().join(", ")
            ),
            Self::DateInvalid => f.write_str("Date must be a valid calendar date"),
        }
    }
}

/// Returns the human readable list of failures; empty means valid.
pub fn validate(input: &ExpenseInput) -> Vec<String> {
    input.check().iter().map(ToString::to_string).collect()
}

impl ExpenseInput {
    /// Runs every check and returns the failures in check order.
    pub fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Err(issue) = parse_amount(self.amount.as_ref()) {
            issues.push(issue);
        }
        if let Err(issue) = parse_category(self.category.as_ref()) {
            issues.push(issue);
        }
        if let Err(issue) = parse_date(self.date.as_ref()) {
            issues.push(issue);
        }
        issues
    }

    /// Builds a typed expense. An absent date becomes the calendar date of
    /// `submitted_at`.
    pub fn to_new_expense(
        &self,
        submitted_at: DateTime<Utc>,
    ) -> Result<NewExpense, Vec<ValidationIssue>> {
        let amount = parse_amount(self.amount.as_ref());
        let category = parse_category(self.category.as_ref());
        let date = parse_date(self.date.as_ref());

        match (amount, category, date) {
            (Ok(amount), Ok(category), Ok(date)) => Ok(NewExpense {
                amount,
                category,
                date: date.unwrap_or_else(|| submitted_at.date_naive()),
            }),
            _ => Err(self.check()),
        }
    }
}

fn parse_amount(raw: Option<&Value>) -> Result<MoneyCents, ValidationIssue> {
    let major = match raw {
        None | Some(Value::Null) => return Err(ValidationIssue::AmountMissing),
        Some(Value::Number(n)) => n.as_f64().ok_or(ValidationIssue::AmountNotNumeric)?,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ValidationIssue::AmountMissing);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| ValidationIssue::AmountNotNumeric)?
        }
        Some(_) => return Err(ValidationIssue::AmountNotNumeric),
    };

    if !major.is_finite() || major.abs() > MAX_MAJOR_AMOUNT {
        return Err(ValidationIssue::AmountNotNumeric);
    }

    let scaled = major * 100.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-6 {
        return Err(ValidationIssue::AmountTooPrecise);
    }

    let amount = MoneyCents::new(rounded as i64);
    if !amount.is_positive() {
        return Err(ValidationIssue::AmountNotPositive);
    }
    Ok(amount)
}

fn parse_category(raw: Option<&Value>) -> Result<Category, ValidationIssue> {
    match raw {
        None | Some(Value::Null) => Err(ValidationIssue::CategoryMissing),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationIssue::CategoryMissing),
        Some(Value::String(s)) => {
            Category::try_from(s.as_str()).map_err(|_| ValidationIssue::CategoryNotAllowed)
        }
        Some(_) => Err(ValidationIssue::CategoryNotAllowed),
    }
}

fn parse_date(raw: Option<&Value>) -> Result<Option<NaiveDate>, ValidationIssue> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Ok(Some(date));
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.date_naive()))
                .map_err(|_| ValidationIssue::DateInvalid)
        }
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| Some(dt.date_naive()))
            .ok_or(ValidationIssue::DateInvalid),
        Some(_) => Err(ValidationIssue::DateInvalid),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn input(value: Value) -> ExpenseInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_payload_has_no_errors() {
        assert!(validate(&input(json!({"amount": 12.5, "category": "Food"}))).is_empty());
        assert!(validate(&input(json!({"amount": "12.50", "category": "Bills"}))).is_empty());
    }

    #[test]
    fn non_numeric_amount_reports_exactly_one_amount_error() {
        let errors = validate(&input(json!({"amount": "abc", "category": "Food"})));
        assert_eq!(errors, vec!["Amount must be a valid number".to_string()]);
    }

    #[test]
    fn unknown_category_lists_allowed_values() {
        let errors = validate(&input(json!({"amount": 10, "category": "Bogus"})));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Food, Transport, Entertainment, Bills, Other"));
    }

    #[test]
    fn all_failures_are_reported_in_order() {
        let issues = input(json!({"date": "yesterday"})).check();
        assert_eq!(
            issues,
            vec![
                ValidationIssue::AmountMissing,
                ValidationIssue::CategoryMissing,
                ValidationIssue::DateInvalid,
            ]
        );
    }

    #[test]
    fn amount_edge_cases() {
        let check = |amount: Value| input(json!({"amount": amount, "category": "Food"})).check();
        assert_eq!(check(json!(0)), vec![ValidationIssue::AmountNotPositive]);
        assert_eq!(check(json!(-3)), vec![ValidationIssue::AmountNotPositive]);
        assert_eq!(check(json!(1.005)), vec![ValidationIssue::AmountTooPrecise]);
        assert_eq!(check(json!("")), vec![ValidationIssue::AmountMissing]);
        assert_eq!(check(json!("NaN")), vec![ValidationIssue::AmountNotNumeric]);
        assert_eq!(check(json!(true)), vec![ValidationIssue::AmountNotNumeric]);
        assert!(check(json!(0.1)).is_empty());
    }

    #[test]
    fn missing_date_defaults_to_submission_day() {
        let submitted_at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
        let expense = input(json!({"amount": 0.1, "category": "Transport"}))
            .to_new_expense(submitted_at)
            .unwrap();
        assert_eq!(expense.amount, MoneyCents::new(10));
        assert_eq!(expense.category, Category::Transport);
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn dates_accept_iso_and_rfc3339() {
        let submitted_at = Utc::now();
        let parse = |date: Value| {
            input(json!({"amount": 1, "category": "Other", "date": date}))
                .to_new_expense(submitted_at)
                .unwrap()
                .date
        };
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse(json!("2024-01-05")), expected);
        assert_eq!(parse(json!("2024-01-05T10:00:00.000Z")), expected);
        assert!(
            input(json!({"amount": 1, "category": "Other", "date": "2024-02-30"}))
                .to_new_expense(submitted_at)
                .is_err()
        );
    }
}
