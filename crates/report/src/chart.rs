use printpdf::image_crate::{self, DynamicImage, GenericImageView};

/// A decoded chart snapshot, ready to be placed on a page.
#[derive(Clone, Debug)]
pub struct ChartImage {
    image: DynamicImage,
}

impl ChartImage {
    /// Decodes PNG or JPEG bytes. Empty or zero-sized images are rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        if bytes.is_empty() {
            return Err("chart image is empty".to_string());
        }
        let image = image_crate::load_from_memory(bytes).map_err(|err| err.to_string())?;
        if image.width() == 0 || image.height() == 0 {
            return Err("chart image has no pixels".to_string());
        }
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.dimensions();
        h as f32 / w as f32
    }

    pub(crate) fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let image = DynamicImage::ImageRgba8(image_crate::RgbaImage::from_pixel(
        width,
        height,
        image_crate::Rgba([6, 182, 212, 255]),
    ));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image_crate::ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}
