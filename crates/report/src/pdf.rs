use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect,
};

use crate::{
    ChartImage, ReportError,
    layout::{PAGE_HEIGHT, PAGE_WIDTH},
    surface::{Rgb, Surface, TextStyle},
};

const MM_PER_INCH: f32 = 25.4;

/// [`Surface`] writing an A4 PDF with the built-in Helvetica faces.
///
/// The document is reference counted internally and must stay on the thread
/// that created it.
pub struct PdfSurface {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl PdfSurface {
    pub fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| ReportError::Font(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| ReportError::Font(err.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            pages: 1,
        })
    }

    fn fill(&self, color: Rgb) {
        self.layer
            .set_fill_color(Color::Rgb(printpdf::Rgb::new(color.r, color.g, color.b, None)));
    }
}

/// Converts a top-down coordinate to the PDF bottom-up one.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

impl Surface for PdfSurface {
    fn text(&mut self, text: &str, style: TextStyle, x: f32, y: f32) -> Result<(), ReportError> {
        let font = if style.bold { &self.bold } else { &self.regular };
        self.fill(Rgb::BLACK);
        self.layer.use_text(text, style.size, Mm(x), flip(y), font);
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.fill(color);
        self.layer
            .add_rect(Rect::new(Mm(x), flip(y + height), Mm(x + width), flip(y)));
    }

    fn image(&mut self, image: &ChartImage, x: f32, y: f32, width: f32, _height: f32) {
        let (px_width, _) = image.dimensions();
        // Height follows from the dpi since the aspect ratio is preserved.
        let dpi = px_width as f32 * MM_PER_INCH / width;
        let xobject = Image::from_dynamic_image(image.as_dynamic());
        let height = xobject.image.height.0 as f32 * MM_PER_INCH / dpi;

        xobject.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(flip(y + height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}, Layer 1", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        self.doc
            .save_to_bytes()
            .map_err(|err| ReportError::Serialize(err.to_string()))
    }
}
