//! Report options as the caller sends them.
//!
//! Deserialized strictly: unknown keys are rejected instead of ignored, and
//! every choice is a closed enum.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::layout::columns::{resolve_columns, ColumnSpec};
use crate::model::{Orientation, PageConfig, PageSize};

pub use crate::grouping::{SortBy, SortOrder};

pub const DEFAULT_CURRENCY: &str = "$";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportType {
    /// Metrics, tax breakdown and category overview.
    Summary,
    /// One row per record.
    #[default]
    Detailed,
}

/// Company block printed under the title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl CompanyInfo {
    /// Everything below the name, one entry per printed line.
    pub fn detail_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .address_lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let mut contact = Vec::new();
        if let Some(phone) = self.phone.as_deref().filter(|s| !s.trim().is_empty()) {
            contact.push(format!("Tel. {}", phone.trim()));
        }
        if let Some(email) = self.email.as_deref().filter(|s| !s.trim().is_empty()) {
            contact.push(email.trim().to_string());
        }
        if !contact.is_empty() {
            lines.push(contact.join("  |  "));
        }
        if let Some(tax_id) = self.tax_id.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(format!("Tax ID {}", tax_id.trim()));
        }
        lines
    }
}

/// Everything that shapes one report. Immutable for the duration of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ReportOptions {
    pub report_type: ReportType,
    pub title: Option<String>,
    pub orientation: Orientation,
    pub page_size: PageSize,
    /// Catalog keys in display order. Empty selects the default set.
    pub selected_columns: Vec<String>,
    /// Appends a blank column with this heading.
    pub custom_column_title: Option<String>,
    pub group_by_category: bool,
    /// Collapse records into one row per category.
    pub simplified: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub include_company_info: bool,
    pub company_info: Option<CompanyInfo>,
    pub currency_symbol: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            report_type: ReportType::default(),
            title: None,
            orientation: Orientation::default(),
            page_size: PageSize::default(),
            selected_columns: Vec::new(),
            custom_column_title: None,
            group_by_category: false,
            simplified: false,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            include_company_info: false,
            company_info: None,
            currency_symbol: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl ReportOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: ReportOptions = serde_json::from_str(json)?;
        Ok(options)
    }

    /// The title printed on the report and used for the file name.
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => match self.report_type {
                ReportType::Summary => "Inventory summary".to_string(),
                ReportType::Detailed => "Inventory report".to_string(),
            },
        }
    }

    pub fn page_config(&self) -> PageConfig {
        PageConfig {
            size: self.page_size,
            orientation: self.orientation,
            ..Default::default()
        }
    }

    /// Resolve the detailed-table columns. Fails on unknown or duplicate
    /// keys before anything is drawn.
    pub fn columns(&self) -> Result<Vec<ColumnSpec>> {
        resolve_columns(&self.selected_columns, self.custom_column_title.as_deref())
    }

    /// The company block to print, if one was asked for and supplied.
    pub fn company(&self) -> Option<&CompanyInfo> {
        if self.include_company_info {
            self.company_info.as_ref().filter(|c| !c.name.trim().is_empty())
        } else {
            None
        }
    }

    /// Checks serde can't express.
    pub fn validate(&self) -> Result<()> {
        if let PageSize::Custom { width, height } = self.page_size {
            if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
                return Err(ReportError::InvalidSpec(format!(
                    "custom page size {}x{} must be positive",
                    width, height
                )));
            }
        }
        self.columns()?;
        Ok(())
    }
}
