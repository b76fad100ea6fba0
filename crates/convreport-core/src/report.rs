//! Per-table report records
//!
//! Built fresh on every report run and never mutated afterwards.

use serde::Serialize;

/// One titled block of explanations ("Warning(s)" or "Note(s)")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReportBody {
    /// Block heading; singular iff there is exactly one line
    pub heading: String,

    /// Explanations, without numbering or trailing period
    pub lines: Vec<String>,
}

impl TableReportBody {
    /// Build a body, pluralizing `heading` when there is more than one line
    pub fn new(heading: &str, lines: Vec<String>) -> Self {
        let heading = if lines.len() > 1 {
            format!("{}s", heading)
        } else {
            heading.to_string()
        };
        Self { heading, lines }
    }
}

/// Conversion report for a single source table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub source_table: String,

    pub target_table: String,

    /// Rows encountered
    pub rows: i64,

    /// Rows that failed conversion or failed to be written
    pub bad_rows: i64,

    /// Source columns
    pub columns: i64,

    /// Warnings, counted per column for plain issues and per table for batched ones
    pub warnings: i64,

    /// Synthetic primary key column, if one was added
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic_primary_key: Option<String>,

    pub body: Vec<TableReportBody>,
}

impl TableReport {
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            ..Self::default()
        }
    }

    pub fn missing_primary_key(&self) -> bool {
        self.synthetic_primary_key.is_some()
    }
}

/// Machine-readable form of a generated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Whole-database rating sentences
    pub summary: String,

    /// Per-table reports, ordered by source table name
    pub tables: Vec<TableReport>,
}

impl ConversionReport {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
