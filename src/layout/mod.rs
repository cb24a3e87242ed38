//! # Page-Native Report Layout
//!
//! Reports are laid out INTO pages, never onto an infinite canvas that is
//! sliced afterwards. The algorithm is a single forward pass:
//!
//! 1. Open a page with a known usable area.
//! 2. Before placing a block, ask: "does this fit above the footer reserve?"
//! 3. If it fits, place it and move the cursor down.
//! 4. If it doesn't, close the page (footer included), open the next one,
//!    repaint the table header band if a table is open, and place it there.
//!
//! A page is never revisited once closed. The only thing not known while a
//! page is open is the total page count; footers carry `{{pageNumber}}` /
//! `{{totalPages}}` placeholders that the PDF writer fills in.
//!
//! All coordinates here are in points from the top-left corner of the page.
//! The PDF writer flips them.

pub mod columns;
pub mod page_break;
pub mod row_height;
pub mod table;

use serde::Serialize;
use tracing::{debug, warn};

use crate::barcode::RasterImage;
use crate::error::{ReportError, Result};
use crate::font::{StandardFont, TextMeasure};
use crate::model::PageConfig;
use crate::style::{Color, ReportTheme};

use self::page_break::{decide_break, BreakDecision};
use self::table::{draw_header_band, HeaderBand};

/// Placeholder replaced by the current page number at serialization time.
pub const PAGE_NUMBER_PLACEHOLDER: &str = "{{pageNumber}}";
/// Placeholder replaced by the total page count at serialization time.
pub const TOTAL_PAGES_PLACEHOLDER: &str = "{{totalPages}}";

/// The page rectangle left after margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsableArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl UsableArea {
    pub fn from_page(config: &PageConfig) -> Result<Self> {
        let (page_w, page_h) = config.dimensions();
        let m = &config.margin;
        let width = page_w - m.horizontal();
        let height = page_h - m.vertical();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ReportError::InvalidSpec(format!(
                "page {:.1}x{:.1} leaves no room inside its margins",
                page_w, page_h
            )));
        }
        Ok(Self {
            left: m.left,
            right: page_w - m.right,
            top: m.top,
            bottom: page_h - m.bottom,
            width,
            height,
        })
    }
}

/// Vertical position and page number of the layout in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub y: f64,
    pub page_number: usize,
}

/// Where the flow is in its per-page cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// The cursor is inside the usable area.
    Drawing,
    /// The next block would cross into the footer reserve.
    Overflow,
    /// Closing the current page and opening the next.
    PageBreak,
}

/// How a text element is anchored at its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// `x` is the left edge.
    #[default]
    Start,
    /// `x` is the right edge. Resolved by the PDF writer after placeholder
    /// substitution, so page numbers right-align correctly.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// What to draw for one element.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// A straight line from the element's (x, y) to (`to_x`, `to_y`).
    Line {
        to_x: f64,
        to_y: f64,
        stroke: Stroke,
    },
    /// One line of text. The element's `y` is the baseline.
    Text {
        text: String,
        font: StandardFont,
        font_size: f64,
        color: Color,
        anchor: TextAnchor,
    },
    Image {
        raster: RasterImage,
    },
}

/// A positioned draw command.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

impl LayoutElement {
    /// The text of a `Text` element.
    pub fn text(&self) -> Option<&str> {
        match &self.draw {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Kind of a table row, recorded for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Header,
    Data,
    GroupHeading,
    GroupTotal,
    ParentTotal,
    LeafRollup,
    GrandTotal,
}

/// One placed table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowInfo {
    pub kind: RowKind,
    pub label: String,
    pub y: f64,
    pub height: f64,
}

/// A single laid-out page, ready for serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    /// 1-based.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    pub rows: Vec<RowInfo>,
}

impl LayoutPage {
    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &RowInfo> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    /// Every text run on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(LayoutElement::text)
    }
}

/// Owns the pages of one report while they are being laid out.
///
/// One flow per report build; nothing here is shared between builds.
pub struct PageFlow<'a> {
    config: PageConfig,
    area: UsableArea,
    theme: &'a ReportTheme,
    measure: &'a dyn TextMeasure,
    footer_label: String,
    cursor: PageCursor,
    state: FlowState,
    elements: Vec<LayoutElement>,
    rows: Vec<RowInfo>,
    pages: Vec<LayoutPage>,
    /// Header band repainted on every new page while a table is open.
    repeat_header: Option<HeaderBand>,
    /// Cursor position right after the page furniture, used to tell whether
    /// anything has been placed on the current page yet.
    page_start_y: f64,
}

impl<'a> PageFlow<'a> {
    pub fn new(
        config: PageConfig,
        theme: &'a ReportTheme,
        measure: &'a dyn TextMeasure,
        footer_label: &str,
    ) -> Result<Self> {
        let area = UsableArea::from_page(&config)?;
        if theme.footer_reserve >= area.height {
            return Err(ReportError::InvalidSpec(format!(
                "footer reserve {:.1} does not fit a usable height of {:.1}",
                theme.footer_reserve, area.height
            )));
        }
        Ok(Self {
            config,
            area,
            theme,
            measure,
            footer_label: footer_label.to_string(),
            cursor: PageCursor {
                y: area.top,
                page_number: 1,
            },
            state: FlowState::Drawing,
            elements: Vec::new(),
            rows: Vec::new(),
            pages: Vec::new(),
            repeat_header: None,
            page_start_y: area.top,
        })
    }

    pub fn area(&self) -> &UsableArea {
        &self.area
    }

    pub fn theme(&self) -> &'a ReportTheme {
        self.theme
    }

    pub fn measure(&self) -> &'a dyn TextMeasure {
        self.measure
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Lowest y content may reach on this page.
    pub fn content_bottom(&self) -> f64 {
        self.area.bottom - self.theme.footer_reserve
    }

    pub fn remaining(&self) -> f64 {
        (self.content_bottom() - self.cursor.y).max(0.0)
    }

    /// True when nothing but page furniture has been placed on this page.
    pub fn at_page_top(&self) -> bool {
        self.cursor.y <= self.page_start_y + 1e-9
    }

    /// Treat the current cursor position as the start of the page body, so
    /// furniture drawn so far (a header band) doesn't count as content.
    pub fn mark_page_start(&mut self) {
        self.page_start_y = self.cursor.y;
    }

    /// Make room for a block of `height`, breaking the page first if needed.
    /// Returns true when a break happened.
    pub fn ensure_space(&mut self, height: f64) -> bool {
        self.ensure_space_for(&[height], 1)
    }

    /// Like [`ensure_space`](Self::ensure_space) for a block whose first
    /// `keep_together` rows must share a page.
    pub fn ensure_space_for(&mut self, heights: &[f64], keep_together: usize) -> bool {
        match decide_break(self.remaining(), heights, keep_together, self.at_page_top()) {
            BreakDecision::Place => false,
            BreakDecision::NewPage => {
                self.state = FlowState::Overflow;
                self.page_break();
                true
            }
        }
    }

    /// Claim `height` at the cursor and return the top y of the claimed
    /// band. A block taller than a whole page is clipped to what is left, so
    /// the cursor never passes the footer reserve.
    pub fn place(&mut self, height: f64) -> (f64, f64) {
        let top = self.cursor.y;
        let available = self.content_bottom() - top;
        let height = if height > available {
            warn!(
                page = self.cursor.page_number,
                height, available, "block taller than the page, clipping"
            );
            available.max(0.0)
        } else {
            height
        };
        self.cursor.y += height;
        (top, height)
    }

    /// Move the cursor down without drawing, never past the footer reserve.
    pub fn advance(&mut self, gap: f64) {
        self.cursor.y = (self.cursor.y + gap).min(self.content_bottom());
    }

    pub fn push(&mut self, element: LayoutElement) {
        self.elements.push(element);
    }

    pub fn record_row(&mut self, kind: RowKind, label: &str, y: f64, height: f64) {
        self.rows.push(RowInfo {
            kind,
            label: label.to_string(),
            y,
            height,
        });
    }

    /// Start repeating `band` at the top of every new page. The caller has
    /// already drawn it on the current page.
    pub fn repeat_header(&mut self, band: Option<HeaderBand>) {
        self.repeat_header = band;
    }

    /// Draw one line of text with its baseline at `baseline`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: f64,
        baseline: f64,
        text: &str,
        font: StandardFont,
        font_size: f64,
        color: Color,
        anchor: TextAnchor,
    ) {
        if text.is_empty() {
            return;
        }
        let width = self.measure.measure(text, font, font_size);
        self.elements.push(LayoutElement {
            x,
            y: baseline,
            width,
            height: font_size,
            draw: DrawCommand::Text {
                text: text.to_string(),
                font,
                font_size,
                color,
                anchor,
            },
        });
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Option<Color>, stroke: Option<Stroke>) {
        if fill.is_none() && stroke.is_none() {
            return;
        }
        self.elements.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect { fill, stroke },
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) {
        self.elements.push(LayoutElement {
            x: x1,
            y: y1,
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
            draw: DrawCommand::Line {
                to_x: x2,
                to_y: y2,
                stroke,
            },
        });
    }

    /// Close the current page and open the next one.
    pub fn page_break(&mut self) {
        self.state = FlowState::PageBreak;
        self.close_page();

        self.cursor.page_number += 1;
        self.cursor.y = self.area.top;
        self.page_start_y = self.area.top;
        debug!(page = self.cursor.page_number, "page break");

        if let Some(band) = self.repeat_header.take() {
            draw_header_band(self, &band);
            self.mark_page_start();
            self.repeat_header = Some(band);
        }
        self.state = FlowState::Drawing;
    }

    /// Close the last page and hand back every page.
    pub fn finish(mut self) -> Vec<LayoutPage> {
        self.close_page();
        self.pages
    }

    fn close_page(&mut self) {
        self.draw_footer();
        let (width, height) = self.config.dimensions();
        self.pages.push(LayoutPage {
            number: self.cursor.page_number,
            width,
            height,
            elements: std::mem::take(&mut self.elements),
            rows: std::mem::take(&mut self.rows),
        });
    }

    fn draw_footer(&mut self) {
        let theme = self.theme;
        let rule_y = self.area.bottom - theme.footer_reserve + 6.0;
        self.line(
            self.area.left,
            rule_y,
            self.area.right,
            rule_y,
            Stroke {
                color: theme.border_color,
                width: theme.border_width,
            },
        );
        let baseline = self.area.bottom - 4.0;
        let label = self.footer_label.clone();
        self.text(
            self.area.left,
            baseline,
            &label,
            StandardFont::Helvetica,
            theme.footer_font_size,
            theme.muted_color,
            TextAnchor::Start,
        );
        let page_label = format!("Page {} of {}", PAGE_NUMBER_PLACEHOLDER, TOTAL_PAGES_PLACEHOLDER);
        self.text(
            self.area.right,
            baseline,
            &page_label,
            StandardFont::Helvetica,
            theme.footer_font_size,
            theme.muted_color,
            TextAnchor::End,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{Edges, Orientation, PageSize};

    fn small_page() -> PageConfig {
        PageConfig {
            size: PageSize::Custom {
                width: 300.0,
                height: 200.0,
            },
            orientation: Orientation::Landscape,
            margin: Edges::uniform(20.0),
        }
    }

    #[test]
    fn usable_area_subtracts_margins() {
        let area = UsableArea::from_page(&PageConfig::default()).unwrap();
        assert!((area.width - (595.28 - 72.0)).abs() < 1e-9);
        assert!((area.bottom - (841.89 - 36.0)).abs() < 1e-9);
    }

    #[test]
    fn margins_wider_than_page_are_invalid() {
        let cfg = PageConfig {
            margin: Edges::uniform(400.0),
            ..Default::default()
        };
        assert!(matches!(UsableArea::from_page(&cfg), Err(ReportError::InvalidSpec(_))));
    }

    #[test]
    fn breaks_when_block_does_not_fit() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let mut flow = PageFlow::new(small_page(), &theme, &ctx, "Test").unwrap();
        // usable 20..180, footer reserve 24 -> content bottom 156
        assert!(!flow.ensure_space(100.0));
        flow.place(100.0);
        assert!(flow.ensure_space(40.0));
        assert_eq!(flow.cursor().page_number, 2);
        assert_eq!(flow.cursor().y, 20.0);
        assert_eq!(flow.state(), FlowState::Drawing);

        let pages = flow.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].number, 2);
        for page in &pages {
            assert!(page.texts().any(|t| t == "Page {{pageNumber}} of {{totalPages}}"));
        }
    }

    #[test]
    fn oversized_block_is_clipped_not_looped() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let mut flow = PageFlow::new(small_page(), &theme, &ctx, "Test").unwrap();
        assert!(!flow.ensure_space(1000.0));
        let (top, height) = flow.place(1000.0);
        assert_eq!(top, 20.0);
        assert!((height - 136.0).abs() < 1e-9);
        assert!(flow.cursor().y <= flow.content_bottom());
    }

    #[test]
    fn advance_never_passes_footer() {
        let theme = ReportTheme::default();
        let ctx = FontContext::new();
        let mut flow = PageFlow::new(small_page(), &theme, &ctx, "Test").unwrap();
        flow.advance(5000.0);
        assert_eq!(flow.cursor().y, flow.content_bottom());
    }
}
