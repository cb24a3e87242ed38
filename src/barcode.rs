//! Barcode rasterization boundary.
//!
//! The report never generates barcodes itself. A [`BarcodeRenderer`] turns a
//! value into a grayscale raster; the table renderer calls it once per
//! barcode cell and blocks until it answers. Any error is recovered right
//! there by printing the raw value instead, so nothing in this module can
//! fail a report.

use thiserror::Error;

/// Requested raster geometry, in points at 72 dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeOptions {
    pub width: f64,
    pub height: f64,
    /// Size of the human-readable digits printed under the bars.
    pub font_size: f64,
    pub margin: f64,
}

/// An 8-bit grayscale raster, row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// True when the pixel buffer matches the declared dimensions.
    pub fn is_consistent(&self) -> bool {
        self.width_px > 0
            && self.height_px > 0
            && self.pixels.len() as u64 == self.width_px as u64 * self.height_px as u64
    }
}

#[derive(Debug, Error)]
pub enum BarcodeError {
    /// The value cannot be encoded in the renderer's symbology.
    #[error("cannot encode '{value}': {reason}")]
    Unencodable { value: String, reason: String },

    /// The renderer gave up (timeout, resource limit, crashed worker).
    #[error("barcode renderer failed: {0}")]
    Failed(String),
}

/// Rasterizes barcode values.
pub trait BarcodeRenderer {
    fn render(&self, value: &str, options: &BarcodeOptions) -> Result<RasterImage, BarcodeError>;
}

impl<F> BarcodeRenderer for F
where
    F: Fn(&str, &BarcodeOptions) -> Result<RasterImage, BarcodeError>,
{
    fn render(&self, value: &str, options: &BarcodeOptions) -> Result<RasterImage, BarcodeError> {
        self(value, options)
    }
}
