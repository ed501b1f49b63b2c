//! PDF expense reports.
//!
//! [`build_report`] lays a [`ReportInput`] out on any [`Surface`];
//! [`render_pdf`] does the same on a [`PdfSurface`]. A chart that cannot be
//! decoded is skipped with a [`ReportWarning`] and never aborts the report.

use chrono::{DateTime, Utc};
use engine::{MoneyCents, Summary};
use thiserror::Error;

pub use chart::ChartImage;
pub use pdf::PdfSurface;
pub use surface::{DrawOp, RecordingSurface, Rgb, Surface, TextStyle};

mod chart;
pub mod layout;
mod pdf;
mod surface;

/// Everything the report shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportInput {
    pub total: MoneyCents,
    /// Category label → amount, in display order.
    pub breakdown: Vec<(String, MoneyCents)>,
    /// Encoded PNG or JPEG snapshot of the charts.
    pub chart: Option<Vec<u8>>,
    pub generated_at: DateTime<Utc>,
}

impl ReportInput {
    pub fn from_summary(
        summary: &Summary,
        chart: Option<Vec<u8>>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total: summary.total,
            breakdown: summary.totals.rows(),
            chart,
            generated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportWarning {
    ChartSkipped(String),
}

impl core::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChartSkipped(reason) => write!(f, "chart skipped: {reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub warnings: Vec<ReportWarning>,
}

/// Fatal failures of the drawing surface.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("font registration failed: {0}")]
    Font(String),
    #[error("document serialization failed: {0}")]
    Serialize(String),
}

pub fn build_report<S: Surface>(input: &ReportInput, surface: S) -> Result<ReportOutput, ReportError> {
    let (bytes, pages, warnings) = layout::lay_out(input, surface)?;
    tracing::debug!(
        "report built: {pages} page(s), {} bytes, {} warning(s)",
        bytes.len(),
        warnings.len()
    );
    Ok(ReportOutput {
        bytes,
        pages,
        warnings,
    })
}

/// Renders `input` as an A4 PDF document.
pub fn render_pdf(input: &ReportInput) -> Result<ReportOutput, ReportError> {
    build_report(input, PdfSurface::new(layout::TITLE)?)
}
