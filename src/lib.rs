//! # Shelf
//!
//! A single-pass inventory report engine.
//!
//! Tabular reports are laid out INTO pages: every row's height is decided
//! before it is drawn, page breaks only ever fall between rows, and the
//! column header band repeats on every page so each page reads on its own.
//! The same records and options can also be exported as Windows-1252
//! delimited text for label printers.
//!
//! ## Architecture
//!
//! ```text
//! records (JSON / RecordSource)      ReportOptions (JSON)
//!       ↓                                  ↓
//!   [model]     RecordView projection   [options]  validated, closed enums
//!       ↓
//!   [grouping]  sort, leaf groups, parent rollups, aggregates
//!       ↓
//!   [layout]    column widths → row heights → page flow → table rows
//!       ↓
//!   [report]    title, company, summary | detailed, totals
//!       ↓
//!   [pdf]  or  [report::text_export]
//! ```

pub mod barcode;
pub mod encoding;
pub mod error;
pub mod font;
pub mod format;
pub mod grouping;
pub mod layout;
pub mod model;
pub mod options;
pub mod pdf;
pub mod report;
pub mod source;
pub mod style;
pub mod text;

pub use error::{ReportError, Result};
pub use model::{InventoryItem, RecordView};
pub use options::ReportOptions;
pub use report::{build_report, build_text_report, ReportEngine, ReportOutput, TextExport};
