//! Pure reductions from a list of expenses to the figures shown by charts and
//! reports.
//!
//! None of these functions read a clock or depend on hash-map ordering, so
//! the same input always produces identical output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, Expense, Filter, MoneyCents, ResultEngine};

/// Category → total mapping, in order of first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals(Vec<(Category, MoneyCents)>);

impl CategoryTotals {
    pub fn get(&self, category: Category) -> Option<MoneyCents> {
        self.0
            .iter()
            .find_map(|(c, amount)| (*c == category).then_some(*amount))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, MoneyCents)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every category total.
    pub fn total(&self) -> ResultEngine<MoneyCents> {
        MoneyCents::checked_sum(self.0.iter().map(|(_, amount)| *amount)).ok_or_else(overflow)
    }

    /// Labelled rows, as consumed by the report builder.
    pub fn rows(&self) -> Vec<(String, MoneyCents)> {
        self.0
            .iter()
            .map(|(c, amount)| (c.as_str().to_string(), *amount))
            .collect()
    }
}

/// One point of the amount-over-time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: MoneyCents,
}

/// Everything a dashboard or report needs for one filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub expenses: Vec<Expense>,
    pub totals: CategoryTotals,
    pub series: Vec<SeriesPoint>,
    pub total: MoneyCents,
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("total overflows".to_string())
}

/// Keeps the records matching `filter`, in their original relative order.
pub fn filter_expenses(expenses: &[Expense], filter: &Filter) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| filter.matches(expense))
        .cloned()
        .collect()
}

/// Sums amounts per category. Categories with no record are omitted.
///
/// A non-positive amount or an overflowing sum means unvalidated data reached
/// the engine and is reported as [`EngineError::InvalidAmount`].
pub fn category_totals(expenses: &[Expense]) -> ResultEngine<CategoryTotals> {
    let mut totals: Vec<(Category, MoneyCents)> = Vec::new();

    for expense in expenses {
        if !expense.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "expense {} has amount {}",
                expense.id, expense.amount
            )));
        }

        match totals.iter_mut().find(|(c, _)| *c == expense.category) {
            Some((_, sum)) => {
                *sum = sum.checked_add(expense.amount).ok_or_else(overflow)?;
            }
            None => totals.push((expense.category, expense.amount)),
        }
    }

    Ok(CategoryTotals(totals))
}

/// `(date, amount)` points sorted by date; records sharing a date keep their
/// input order.
pub fn time_series(expenses: &[Expense]) -> Vec<SeriesPoint> {
    let mut series: Vec<SeriesPoint> = expenses
        .iter()
        .map(|expense| SeriesPoint {
            date: expense.date,
            amount: expense.amount,
        })
        .collect();
    series.sort_by_key(|point| point.date);
    series
}

/// Filters once and derives totals, series and grand total from the result.
pub fn summarize(expenses: &[Expense], filter: &Filter) -> ResultEngine<Summary> {
    let expenses = filter_expenses(expenses, filter);
    let totals = category_totals(&expenses)?;
    let series = time_series(&expenses);
    let total = totals.total()?;

    Ok(Summary {
        expenses,
        totals,
        series,
        total,
    })
}
