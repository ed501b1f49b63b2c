//! Page geometry and the top-down layout of the report.

use crate::{
    ChartImage, ReportInput, ReportWarning,
    surface::{Rgb, Surface, TextStyle},
    ReportError,
};

/// A4 portrait, millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest y the cursor may reach before a page break.
pub const BOTTOM: f32 = PAGE_HEIGHT - MARGIN;

pub const TITLE: &str = "Expense Report";
pub const BREAKDOWN_HEADING: &str = "Category Breakdown";
pub const CHART_LABEL: &str = "Expense Charts";

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph advance, as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const TITLE_STYLE: TextStyle = TextStyle {
    size: 20.0,
    bold: true,
};
const HEADING_STYLE: TextStyle = TextStyle {
    size: 14.0,
    bold: true,
};
const BODY_STYLE: TextStyle = TextStyle {
    size: 12.0,
    bold: false,
};

const LINE: f32 = 8.0;
const SECTION_GAP: f32 = 6.0;
const SWATCH: f32 = 5.0;
const SWATCH_GAP: f32 = 3.0;
const ROW: f32 = 8.0;

fn text_width(text: &str, style: TextStyle) -> f32 {
    text.chars().count() as f32 * style.size * AVG_GLYPH_WIDTH * PT_TO_MM
}

fn ascent(style: TextStyle) -> f32 {
    style.size * PT_TO_MM
}

/// Formats an amount as `$<major>.<cents>`.
pub fn dollars(amount: engine::MoneyCents) -> String {
    format!("${amount}")
}

/// Top-down cursor over a [`Surface`], breaking pages at the bottom margin.
struct Cursor<S> {
    surface: S,
    y: f32,
    pages: usize,
}

impl<S: Surface> Cursor<S> {
    fn new(surface: S) -> Self {
        Self {
            surface,
            y: MARGIN,
            pages: 1,
        }
    }

    fn remaining(&self) -> f32 {
        BOTTOM - self.y
    }

    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.y > MARGIN {
            self.surface.new_page();
            self.pages += 1;
            self.y = MARGIN;
        }
    }

    fn line(&mut self, text: &str, style: TextStyle, x: f32, height: f32) -> Result<(), ReportError> {
        self.ensure(height);
        self.surface.text(text, style, x, self.y + ascent(style))?;
        self.y += height;
        Ok(())
    }
}

/// Lays the report out on `surface` and returns the finished bytes, the
/// page count and any non-fatal warnings.
pub(crate) fn lay_out<S: Surface>(
    input: &ReportInput,
    surface: S,
) -> Result<(Vec<u8>, usize, Vec<ReportWarning>), ReportError> {
    let mut warnings = Vec::new();
    let mut cursor = Cursor::new(surface);

    let title_x = (PAGE_WIDTH - text_width(TITLE, TITLE_STYLE)) / 2.0;
    cursor.line(TITLE, TITLE_STYLE, title_x, ascent(TITLE_STYLE) + SECTION_GAP)?;

    let generated = format!(
        "Generated on: {}",
        input.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    cursor.line(&generated, BODY_STYLE, MARGIN, LINE)?;

    let total = format!("Total Expenses: {}", dollars(input.total));
    cursor.line(&total, BODY_STYLE, MARGIN, LINE + SECTION_GAP)?;

    cursor.line(BREAKDOWN_HEADING, HEADING_STYLE, MARGIN, LINE + 2.0)?;
    for (label, amount) in &input.breakdown {
        cursor.ensure(ROW);
        let color = Rgb::from_hex(engine::color_for(label)).unwrap_or(Rgb::BLACK);
        cursor
            .surface
            .fill_rect(MARGIN, cursor.y, SWATCH, SWATCH, color);
        let text = format!("{label}: {}", dollars(*amount));
        cursor.surface.text(
            &text,
            BODY_STYLE,
            MARGIN + SWATCH + SWATCH_GAP,
            cursor.y + SWATCH - 0.5,
        )?;
        cursor.y += ROW;
    }

    if let Some(bytes) = &input.chart {
        match ChartImage::decode(bytes) {
            Ok(chart) => place_chart(&mut cursor, &chart)?,
            Err(reason) => {
                tracing::warn!("chart skipped: {reason}");
                warnings.push(ReportWarning::ChartSkipped(reason));
            }
        }
    }

    let pages = cursor.pages;
    let bytes = cursor.surface.finish()?;
    Ok((bytes, pages, warnings))
}

fn place_chart<S: Surface>(cursor: &mut Cursor<S>, chart: &ChartImage) -> Result<(), ReportError> {
    let label_height = LINE;
    let max_height = BOTTOM - MARGIN - label_height;

    let aspect = chart.aspect_ratio();
    let mut width = CONTENT_WIDTH;
    let mut height = width * aspect;
    if height > max_height {
        height = max_height;
        width = height / aspect;
    }

    cursor.y += SECTION_GAP;
    cursor.ensure(label_height + height);
    cursor.line(CHART_LABEL, HEADING_STYLE, MARGIN, label_height)?;
    cursor
        .surface
        .image(chart, MARGIN, cursor.y, width, height);
    cursor.y += height;
    Ok(())
}
