//! Structured error types for the report engine.
//!
//! Fatal errors abort a report before any bytes are handed back. Per-row
//! problems (a barcode that cannot be rasterized, a cell that must be
//! truncated) are recovered where they happen and never show up here.

use thiserror::Error;

/// The unified error type returned by all public report entry points.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Column or weight misconfiguration. Raised before any drawing starts.
    #[error("Invalid column specification: {0}")]
    InvalidSpec(String),

    /// A selected column key is not part of the column catalog.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// There were no records to report on.
    #[error("No records selected for export")]
    EmptySelection,

    /// The document or text encoder could not produce its output.
    #[error("Failed to encode report output: {0}")]
    StreamEncoding(String),

    /// Options or records JSON failed to parse.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl ReportError {
    /// True for the "bad request" outcomes a transport layer should answer
    /// with a client error rather than a server failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReportError::EmptySelection
                | ReportError::UnknownColumn(_)
                | ReportError::InvalidSpec(_)
                | ReportError::Parse { .. }
        )
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names; unknown option keys are rejected.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let err: ReportError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint: Check for trailing commas"), "{msg}");
        assert!(err.is_client_error());
    }

    #[test]
    fn stream_failure_is_not_a_client_error() {
        let err = ReportError::StreamEncoding("disk full".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Failed to encode report output: disk full");
    }
}
