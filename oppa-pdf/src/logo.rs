//! Letterhead logo as raw RGB samples

use crate::error::{PdfError, PdfResult};

/// Decoded image ready to be embedded as a DeviceRGB XObject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl LogoImage {
    /// Wrap raw 8-bit RGB samples, row-major
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> PdfResult<Self> {
        if width == 0 || height == 0 {
            return Err(PdfError::InvalidImage("empty dimensions".into()));
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgb.len()
            )));
        }
        Ok(Self { width, height, rgb })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn samples(&self) -> &[u8] {
        &self.rgb
    }

    /// Height in points when drawn `width` points wide
    pub fn scaled_height(&self, width: f32) -> f32 {
        width * self.height as f32 / self.width as f32
    }
}

/// Load an image file and flatten it onto white
///
/// The image will be:
/// 1. Resized to at most `max_width` pixels wide (aspect preserved)
/// 2. Composited over a white background (transparency removed)
///
/// Returns `None` if the file cannot be opened; callers render without a logo.
#[cfg(feature = "image")]
pub fn process_logo(path: &str, max_width: u32) -> Option<LogoImage> {
    use image::GenericImageView;
    use tracing::{error, info};

    info!(path = path, "processing logo");

    let img = match image::open(path) {
        Ok(i) => {
            info!(dimensions = ?i.dimensions(), "logo image opened");
            i
        }
        Err(e) => {
            error!(error = %e, "open logo failed");
            return None;
        }
    };

    let (w, h) = img.dimensions();
    let img = if w > max_width {
        let ratio = max_width as f64 / w as f64;
        let new_h = ((h as f64 * ratio) as u32).max(1);
        img.resize(max_width, new_h, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (out_w, out_h) = rgba.dimensions();

    let mut rgb = Vec::with_capacity(out_w as usize * out_h as usize * 3);
    for pixel in rgba.pixels() {
        let alpha = u16::from(pixel[3]);
        for channel in &pixel.0[..3] {
            let blended = (u16::from(*channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }

    match LogoImage::new(out_w, out_h, rgb) {
        Ok(logo) => Some(logo),
        Err(e) => {
            error!(error = %e, "logo conversion failed");
            None
        }
    }
}
