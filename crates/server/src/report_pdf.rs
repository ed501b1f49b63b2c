//! PDF report endpoint

use api_types::report::{FilterValue, ReportRequest, WARNING_HEADER};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use base64::Engine as _;
use chrono::Utc;
use engine::Filter;
use report::{ReportInput, ReportWarning};

use crate::{ServerError, server::ServerState};

/// Decodes a base64 chart, accepting an optional `data:` URL prefix.
fn decode_chart(raw: &str) -> Result<Vec<u8>, String> {
    let payload = match raw.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| format!("invalid base64 chart: {err}"))
}

/// Handle report generation for the filtered expenses
pub async fn create_report(
    State(state): State<ServerState>,
    Json(payload): Json<ReportRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let month = payload.month.as_ref().map(FilterValue::to_query);
    let year = payload.year.as_ref().map(FilterValue::to_query);
    let filter = Filter::parse(
        payload.category.as_deref(),
        month.as_deref(),
        year.as_deref(),
    )?;
    let summary = state.engine.summary(&filter).await?;

    let mut warnings = Vec::new();
    let chart = match payload.chart_png_base64.as_deref().map(decode_chart) {
        Some(Ok(bytes)) => Some(bytes),
        Some(Err(reason)) => {
            tracing::warn!("{reason}");
            warnings.push(ReportWarning::ChartSkipped(reason));
            None
        }
        None => None,
    };

    let input = ReportInput::from_summary(&summary, chart, Utc::now());
    let output = tokio::task::spawn_blocking(move || report::render_pdf(&input))
        .await
        .map_err(|err| ServerError::Internal(format!("report task failed: {err}")))??;
    warnings.extend(output.warnings);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"expense-report.pdf\""),
    );
    for warning in &warnings {
        match HeaderValue::from_str(&warning.to_string()) {
            Ok(value) => {
                headers.append(WARNING_HEADER, value);
            }
            Err(_) => tracing::warn!("report warning not representable as header: {warning}"),
        }
    }

    tracing::info!(
        "report generated: {} page(s), {} expense(s)",
        output.pages,
        summary.expenses.len()
    );
    Ok((headers, output.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_accepts_plain_and_data_url() {
        assert_eq!(decode_chart("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_chart("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(decode_chart("***").is_err());
    }
}
