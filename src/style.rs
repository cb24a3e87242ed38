//! # Report Styling
//!
//! Colors and the fixed typographic settings of a report. There is no
//! cascade here: a report has one theme, resolved once, and every drawing
//! step reads its numbers from it.

use serde::{Deserialize, Serialize};

/// An RGB color with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        let (r, g, b) = match hex.len() {
            3 => (
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Every size, color, and spacing a report uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTheme {
    /// Body cell font size.
    pub font_size: f64,
    /// Header label size, tried first.
    pub header_font_size: f64,
    /// Header label size when the large one doesn't fit.
    pub header_small_font_size: f64,
    /// Fixed height of the repeating header band.
    pub header_height: f64,
    pub title_font_size: f64,
    pub heading_font_size: f64,
    /// Reserved at the bottom of every page for the page-number footer.
    pub footer_reserve: f64,
    pub footer_font_size: f64,
    /// Horizontal padding on each side of a cell.
    pub cell_padding: f64,
    /// Indent of leaf rows under a bold parent rollup row.
    pub group_indent: f64,
    pub text_color: Color,
    pub muted_color: Color,
    pub header_fill: Color,
    pub header_text: Color,
    pub alternate_fill: Color,
    pub group_fill: Color,
    pub total_fill: Color,
    pub border_color: Color,
    pub border_width: f64,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            header_font_size: 9.0,
            header_small_font_size: 7.0,
            header_height: 24.0,
            title_font_size: 18.0,
            heading_font_size: 12.0,
            footer_reserve: 24.0,
            footer_font_size: 8.0,
            cell_padding: 5.0,
            group_indent: 12.0,
            text_color: Color::hex("#1f2328"),
            muted_color: Color::hex("#59636e"),
            header_fill: Color::hex("#2f3e4e"),
            header_text: Color::WHITE,
            alternate_fill: Color::hex("#f3f5f7"),
            group_fill: Color::hex("#e3e8ee"),
            total_fill: Color::hex("#cfd8e2"),
            border_color: Color::hex("#b4bcc6"),
            border_width: 0.5,
        }
    }
}
