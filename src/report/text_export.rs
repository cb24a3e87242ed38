//! Delimited-text export for label-printer software.
//!
//! One header line plus one line per record. Every field is quoted, quotes
//! inside a field are doubled, and lines end with CRLF. The result is
//! encoded to Windows-1252 because that is what the printer tools import.

use std::path::Path;

use crate::encoding::to_windows_1252;
use crate::error::Result;
use crate::layout::columns::{CellValue, ColumnSpec};
use crate::model::RecordView;

pub const DELIMITER: char = ';';
pub const MEDIA_TYPE: &str = "text/csv; charset=windows-1252";
pub const EXTENSION: &str = "csv";

/// Joins the lines of multi-line values.
pub const LINE_JOINER: &str = " - ";

const LINE_END: &str = "\r\n";

/// A finished text export.
#[derive(Debug, Clone)]
pub struct TextExport {
    /// Windows-1252 bytes.
    pub text: Vec<u8>,
    pub suggested_file_name: String,
    pub media_type: &'static str,
}

impl TextExport {
    /// Write the export to `path` atomically.
    pub fn persist(&self, path: &Path) -> Result<()> {
        super::persist_atomically(path, &self.text)
    }
}

/// Quote one field. Line breaks inside it become [`LINE_JOINER`].
pub fn quote_field(value: &str) -> String {
    let single_line = value
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_JOINER);
    format!("\"{}\"", single_line.replace('"', "\"\""))
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Blank => String::new(),
        other => other.flatten(LINE_JOINER),
    }
}

fn write_line<I: IntoIterator<Item = String>>(out: &mut String, fields: I) {
    let line = fields
        .into_iter()
        .map(|f| quote_field(&f))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    out.push_str(&line);
    out.push_str(LINE_END);
}

/// The export as a Rust string, before encoding.
pub fn render(records: &[RecordView], columns: &[ColumnSpec], currency: &str) -> String {
    let mut out = String::new();
    write_line(&mut out, columns.iter().map(ColumnSpec::display_label));
    for record in records {
        write_line(
            &mut out,
            columns.iter().map(|c| cell_text(&c.format(record, currency))),
        );
    }
    out
}

/// The export as Windows-1252 bytes.
pub fn encode(records: &[RecordView], columns: &[ColumnSpec], currency: &str) -> Vec<u8> {
    to_windows_1252(&render(records, columns, currency))
}
