//! Drawing primitives used by the report layout.
//!
//! Coordinates are millimetres measured from the **top-left** corner of the
//! current page; implementations convert to their own origin.

use crate::{ChartImage, ReportError};

/// sRGB colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
}

pub trait Surface {
    /// Draws `text` with its baseline at `y`.
    fn text(&mut self, text: &str, style: TextStyle, x: f32, y: f32) -> Result<(), ReportError>;

    /// Fills the rectangle whose top-left corner is `(x, y)`.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb);

    /// Places `image` with its top-left corner at `(x, y)`, scaled to
    /// `width` × `height`.
    fn image(&mut self, image: &ChartImage, x: f32, y: f32, width: f32, height: f32);

    fn new_page(&mut self);

    /// Serializes the document.
    fn finish(self) -> Result<Vec<u8>, ReportError>;
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        text: String,
        style: TextStyle,
        x: f32,
        y: f32,
    },
    Rect {
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Image {
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            Self::Text { page, .. } | Self::Rect { page, .. } | Self::Image { page, .. } => *page,
        }
    }
}

/// Surface that keeps every draw call in memory.
///
/// `finish` renders a plain-text transcript, one line per operation.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    page: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Every drawn text, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn text(&mut self, text: &str, style: TextStyle, x: f32, y: f32) -> Result<(), ReportError> {
        self.ops.push(DrawOp::Text {
            page: self.page,
            text: text.to_string(),
            style,
            x,
            y,
        });
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops.push(DrawOp::Rect {
            page: self.page,
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn image(&mut self, _image: &ChartImage, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(DrawOp::Image {
            page: self.page,
            x,
            y,
            width,
            height,
        });
    }

    fn new_page(&mut self) {
        self.page += 1;
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut out = String::new();
        for op in &self.ops {
            let line = match op {
                DrawOp::Text {
                    page, text, x, y, ..
                } => format!("{page} text {x:.1} {y:.1} {text}"),
                DrawOp::Rect {
                    page,
                    x,
                    y,
                    width,
                    height,
                    color,
                } => format!(
                    "{page} rect {x:.1} {y:.1} {width:.1} {height:.1} {}",
                    color.to_hex()
                ),
                DrawOp::Image {
                    page,
                    x,
                    y,
                    width,
                    height,
                } => format!("{page} image {x:.1} {y:.1} {width:.1} {height:.1}"),
            };
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_palette() {
        for hex in ["#06b6d4", "#818cf8", "#34d399", "#f472b6", "#94a3b8"] {
            assert_eq!(Rgb::from_hex(hex).unwrap().to_hex(), hex);
        }
        assert_eq!(Rgb::from_hex("000000"), Some(Rgb::BLACK));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }
}
