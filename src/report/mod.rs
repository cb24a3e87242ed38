//! # Report Assembly
//!
//! Turns a set of records and a [`ReportOptions`] into a finished file.
//!
//! ```text
//! records + options
//!       ↓  validate (columns, page geometry), sort
//!   [sections]  title → company → summary | detailed → totals
//!       ↓
//!   [pdf]       or   [text_export]
//!       ↓
//! ReportOutput { bytes, suggested_file_name, media_type }
//! ```
//!
//! Everything that can fail the whole report is checked before the first
//! element is drawn. After that, only the encoder can fail.

mod sections;
pub mod text_export;

use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::barcode::BarcodeRenderer;
use crate::error::{ReportError, Result};
use crate::font::FontContext;
use crate::format::suggested_file_name;
use crate::grouping::sort_records;
use crate::layout::row_height::RowHeightEstimator;
use crate::layout::{LayoutPage, PageFlow};
use crate::model::{Metadata, RecordView};
use crate::options::{ReportOptions, ReportType};
use crate::pdf::PdfWriter;
use crate::style::ReportTheme;

use self::sections::SectionContext;
pub use self::text_export::TextExport;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A finished binary report.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub suggested_file_name: String,
    pub media_type: &'static str,
}

impl ReportOutput {
    /// Write the report to `path` atomically.
    pub fn persist(&self, path: &Path) -> Result<()> {
        persist_atomically(path, &self.bytes)
    }
}

/// Write `bytes` to a temporary file next to `path`, then rename it into
/// place. On failure the temporary file is removed and `path` is untouched.
pub(crate) fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ReportError::Io(e.error))?;
    Ok(())
}

/// Builds reports. Holds no per-report state, so one engine can serve any
/// number of builds, one after another or from separate threads with their
/// own engines.
pub struct ReportEngine {
    theme: ReportTheme,
    fonts: FontContext,
    estimator: RowHeightEstimator,
    barcodes: Option<Box<dyn BarcodeRenderer>>,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        Self {
            theme: ReportTheme::default(),
            fonts: FontContext::new(),
            estimator: RowHeightEstimator::default(),
            barcodes: None,
        }
    }

    pub fn with_theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_estimator(mut self, estimator: RowHeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Rasterize barcode cells with `renderer`. Without one, barcode cells
    /// print their value as text.
    pub fn with_barcodes<R: BarcodeRenderer + 'static>(mut self, renderer: R) -> Self {
        self.barcodes = Some(Box::new(renderer));
        self
    }

    /// Lay the report out into pages without serializing it.
    #[instrument(skip_all, fields(records = records.len(), report_type = ?options.report_type))]
    pub fn layout(
        &self,
        records: &[RecordView],
        options: &ReportOptions,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<LayoutPage>> {
        let records = prepare(records, options)?;
        let columns = options.columns()?;
        let title = options.resolved_title();

        let mut flow = PageFlow::new(options.page_config(), &self.theme, &self.fonts, &title)?;
        let ctx = SectionContext {
            options,
            currency: &options.currency_symbol,
            barcodes: self.barcodes.as_deref(),
            estimator: self.estimator,
        };

        sections::title_block(&mut flow, &title, &generated_at, records.len());
        if let Some(company) = options.company() {
            sections::company_block(&mut flow, company);
        }
        match options.report_type {
            ReportType::Summary => sections::summary(&mut flow, &records, &ctx)?,
            ReportType::Detailed => sections::detailed(&mut flow, &records, &columns, &ctx)?,
        }

        let pages = flow.finish();
        let rows: usize = pages.iter().map(|p| p.rows.len()).sum();
        info!(pages = pages.len(), rows, "report laid out");
        Ok(pages)
    }

    /// Build the PDF form of the report.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build_pdf(
        &self,
        records: &[RecordView],
        options: &ReportOptions,
        generated_at: NaiveDateTime,
    ) -> Result<ReportOutput> {
        let pages = self.layout(records, options, generated_at)?;
        let title = options.resolved_title();
        let metadata = Metadata {
            title: Some(title.clone()),
            author: options.company().map(|c| c.name.clone()),
            subject: Some(match options.report_type {
                ReportType::Summary => "Inventory summary".to_string(),
                ReportType::Detailed => "Inventory report".to_string(),
            }),
            created_at: Some(generated_at),
        };
        let bytes = PdfWriter::new().write(&pages, &metadata, &self.fonts)?;
        info!(pages = pages.len(), bytes = bytes.len(), "pdf report built");
        Ok(ReportOutput {
            bytes,
            suggested_file_name: suggested_file_name(&title, &generated_at, "pdf"),
            media_type: PDF_MEDIA_TYPE,
        })
    }

    /// Build the delimited-text form of the report: one line per record in
    /// the sorted order, columns as selected.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build_text(
        &self,
        records: &[RecordView],
        options: &ReportOptions,
        generated_at: NaiveDateTime,
    ) -> Result<TextExport> {
        let records = prepare(records, options)?;
        let columns = options.columns()?;
        let text = text_export::encode(&records, &columns, &options.currency_symbol);
        info!(rows = records.len(), bytes = text.len(), "text export built");
        Ok(TextExport {
            text,
            suggested_file_name: suggested_file_name(
                &options.resolved_title(),
                &generated_at,
                text_export::EXTENSION,
            ),
            media_type: text_export::MEDIA_TYPE,
        })
    }
}

/// Reject empty selections and bad options, then sort a private copy.
fn prepare(records: &[RecordView], options: &ReportOptions) -> Result<Vec<RecordView>> {
    if records.is_empty() {
        return Err(ReportError::EmptySelection);
    }
    options.validate()?;
    let mut records = records.to_vec();
    sort_records(&mut records, options.sort_by, options.sort_order);
    Ok(records)
}

/// Build a PDF report with the default engine, stamped with the local time.
pub fn build_report(records: &[RecordView], options: &ReportOptions) -> Result<ReportOutput> {
    ReportEngine::new().build_pdf(records, options, Local::now().naive_local())
}

/// Build a text export with the default engine, stamped with the local time.
pub fn build_text_report(records: &[RecordView], options: &ReportOptions) -> Result<TextExport> {
    ReportEngine::new().build_text(records, options, Local::now().naive_local())
}
