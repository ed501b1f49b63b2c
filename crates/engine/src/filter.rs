use core::str::FromStr;

use chrono::Datelike;

use crate::{Category, EngineError, Expense, ResultEngine};

/// A single filter constraint: either unconstrained or a specific value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl<T: FromStr> Selection<T> {
    /// Parses a query value; absence, an empty string and `"all"` mean no
    /// constraint.
    pub fn parse(raw: Option<&str>) -> Result<Self, T::Err> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(Self::All),
            Some(value) => value.parse().map(Self::Only),
        }
    }
}

/// Category/month/year constraints narrowing a record set.
///
/// `month` is zero based (`0` = January).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    pub category: Selection<Category>,
    pub month: Selection<u32>,
    pub year: Selection<i32>,
}

impl Filter {
    /// Filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter from raw query values, rejecting unknown categories,
    /// months outside `0..=11` and non-numeric years.
    pub fn parse(
        category: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
    ) -> ResultEngine<Self> {
        let invalid = |what: &str, raw: Option<&str>| {
            EngineError::InvalidFilter(format!("{what} {}", raw.unwrap_or_default()))
        };

        let category =
            Selection::<Category>::parse(category).map_err(|_| invalid("category", category))?;
        let month_sel = Selection::<u32>::parse(month).map_err(|_| invalid("month", month))?;
        if let Selection::Only(12..) = month_sel {
            return Err(invalid("month", month));
        }
        let year = Selection::<i32>::parse(year).map_err(|_| invalid("year", year))?;
        Ok(Self {
            category,
            month: month_sel,
            year,
        })
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.category.matches(&expense.category)
            && self.month.matches(&expense.date.month0())
            && self.year.matches(&expense.date.year())
    }
}
