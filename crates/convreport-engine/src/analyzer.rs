//! Column analysis: how many columns a table has and how many warnings count
//! against its schema rating.

use convreport_core::{ConversionState, IssueCatalog, SchemaIssue};
use std::collections::{HashMap, HashSet};

/// Result of analyzing one table's columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAnalysis {
    /// Source column -> issues, as recorded
    pub issues: HashMap<String, Vec<SchemaIssue>>,

    /// Number of source columns
    pub columns: i64,

    /// Warnings counted against the table
    pub warnings: i64,
}

/// Analyze the columns of `source_table`.
///
/// A column contributes at most one warning however many plain warning issues
/// it has. A batched warning issue counts once for the whole table. Notes never
/// count.
pub fn analyze_columns(
    catalog: &IssueCatalog,
    conv: &ConversionState,
    source_table: &str,
) -> ColumnAnalysis {
    let columns = conv
        .source_schema
        .get(source_table)
        .map_or(0, |t| t.columns.len() as i64);

    let issues = conv.issues.get(source_table).cloned().unwrap_or_default();

    let mut warnings = 0;
    let mut batched_warnings = HashSet::new();
    for column_issues in issues.values() {
        let mut column_warning = false;
        for &issue in column_issues {
            let entry = catalog.entry(issue);
            if !entry.is_warning() {
                continue;
            }
            if entry.batched {
                batched_warnings.insert(issue);
            } else {
                column_warning = true;
            }
        }
        if column_warning {
            warnings += 1;
        }
    }
    warnings += batched_warnings.len() as i64;

    ColumnAnalysis {
        issues,
        columns,
        warnings,
    }
}
