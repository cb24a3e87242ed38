//! # Fonts and Text Measurement
//!
//! Reports are set in the standard PDF Helvetica family, which needs no
//! embedding. All width-dependent decisions (truncation, header fitting,
//! paragraph wrapping) go through the [`TextMeasure`] trait so the layout
//! code never depends on where the numbers come from.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts a report can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }

    pub fn regular_or_bold(bold: bool) -> Self {
        if bold {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }
}

/// Measures the rendered width of a string.
pub trait TextMeasure {
    /// Width in points of `text` set in `font` at `font_size`.
    fn measure(&self, text: &str, font: StandardFont, font_size: f64) -> f64;
}

/// Text measurement backed by the standard font width tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }
}

impl TextMeasure for FontContext {
    fn measure(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size)
    }
}
