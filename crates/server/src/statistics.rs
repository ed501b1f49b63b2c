//! Statistics API endpoints

use api_types::{
    stats::{CategoryStat, Stats},
    summary::{CategorySlice, SeriesPoint, Summary, SummaryQuery},
};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::{Filter, MoneyCents};

use crate::{ServerError, expenses::expense_view, server::ServerState};

/// Handle requests for store-wide statistics
pub async fn get_stats(State(state): State<ServerState>) -> Result<Json<Stats>, ServerError> {
    let stats = state.engine.stats().await?;

    Ok(Json(Stats {
        total: stats.total,
        by_category: stats
            .by_category
            .into_iter()
            .map(|row| CategoryStat {
                category: row.category,
                count: row.count,
                total_amount: MoneyCents::new(row.total_minor).as_major(),
            })
            .collect(),
        latest: stats.latest.iter().map(expense_view).collect(),
    }))
}

/// Handle requests for chart data under a category/month/year filter
pub async fn get_summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Summary>, ServerError> {
    let filter = Filter::parse(
        query.category.as_deref(),
        query.month.as_deref(),
        query.year.as_deref(),
    )?;
    let summary = state.engine.summary(&filter).await?;

    Ok(Json(Summary {
        total: summary.total.as_major(),
        by_category: summary
            .totals
            .iter()
            .map(|(category, amount)| CategorySlice {
                category: category.to_string(),
                amount: amount.as_major(),
                color: category.color().to_string(),
            })
            .collect(),
        series: summary
            .series
            .iter()
            .map(|point| SeriesPoint {
                date: point.date,
                amount: point.amount.as_major(),
            })
            .collect(),
        count: summary.expenses.len(),
    }))
}
