//! Per-table report builder
//!
//! Turns the issues, synthetic key and row counts recorded for one source
//! table into a [`TableReport`] with numbered-ready explanation lines.

use convreport_core::{
    ConversionState, IssueCatalog, IssueSeverity, LookupError, SchemaIssue, SourceTable,
    TableReport, TableReportBody, TargetTable,
};
use std::collections::{HashMap, HashSet};

use crate::analyzer::analyze_columns;

const BAD_MAPPING: &str = "bad source-DB-to-Spanner table mapping or Spanner schema";

/// Build the report for `source_table`.
///
/// Inconsistencies in the conversion state are recorded as unexpected
/// conditions on `conv`; they never abort the report.
pub fn build_table_report(
    catalog: &IssueCatalog,
    conv: &mut ConversionState,
    source_table: &str,
    bad_writes: &HashMap<String, i64>,
) -> TableReport {
    let mapped = conv.target_table(source_table).ok().map(str::to_string);
    let schemas = mapped.as_deref().and_then(|t| {
        Some((conv.source_schema.get(source_table)?, conv.target_schema.get(t)?))
    });
    let (Some(target_table), Some((source_schema, target_schema))) =
        (mapped.as_deref(), schemas)
    else {
        let target = mapped.clone().unwrap_or_else(|| source_table.to_string());
        conv.unexpected(format!("report: {}", BAD_MAPPING));
        let mut report = TableReport::new(source_table, target);
        report.body = vec![TableReportBody {
            heading: format!("Internal error: {}", BAD_MAPPING),
            lines: Vec::new(),
        }];
        return report;
    };

    let analysis = analyze_columns(catalog, conv, source_table);
    let synthetic_primary_key = conv
        .synthetic_primary_keys
        .get(target_table)
        .map(|pk| pk.column.clone());

    let (body, lookup_errors) = build_body(
        catalog,
        conv,
        source_table,
        &analysis.issues,
        source_schema,
        target_schema,
        synthetic_primary_key.as_deref(),
    );

    let mut report = TableReport::new(source_table, target_table);
    report.columns = analysis.columns;
    report.warnings = analysis.warnings;
    report.synthetic_primary_key = synthetic_primary_key;
    report.body = body;

    for err in lookup_errors {
        conv.unexpected(err.to_string());
    }
    fill_row_stats(conv, source_table, bad_writes, &mut report);

    tracing::debug!(
        table = %report.source_table,
        columns = report.columns,
        warnings = report.warnings,
        rows = report.rows,
        bad_rows = report.bad_rows,
        "built table report"
    );

    report
}

/// Explanation blocks for one table: warnings first, then notes.
///
/// Columns are visited alphabetically and each column's issues in recorded
/// order. A batched issue is explained only at its first occurrence.
fn build_body(
    catalog: &IssueCatalog,
    conv: &ConversionState,
    source_table: &str,
    issues: &HashMap<String, Vec<SchemaIssue>>,
    source_schema: &SourceTable,
    target_schema: &TargetTable,
    synthetic_primary_key: Option<&str>,
) -> (Vec<TableReportBody>, Vec<LookupError>) {
    let mut columns: Vec<&String> = issues.keys().collect();
    columns.sort();

    let mut body = Vec::new();
    let mut lookup_errors = Vec::new();

    let passes = [("Warning", IssueSeverity::Warning), ("Note", IssueSeverity::Note)];
    for (heading, severity) in passes {
        let mut lines = Vec::new();

        // The synthetic key has no source column, so it is explained up front
        if let (Some(column), IssueSeverity::Warning) = (synthetic_primary_key, severity) {
            lines.push(format!(
                "Column '{}' was added because this table didn't have a primary key. \
                 Spanner requires a primary key for every table",
                column
            ));
        }

        let mut reported = HashSet::new();
        for &source_column in &columns {
            for &issue in &issues[source_column] {
                let entry = catalog.entry(issue);
                if entry.severity != severity {
                    continue;
                }
                if entry.batched && !reported.insert(issue) {
                    continue;
                }

                let target_column = match conv.target_column(source_table, source_column) {
                    Ok(c) => c,
                    Err(err) => {
                        lookup_errors.push(err);
                        source_column.as_str()
                    }
                };
                let source_type = source_schema
                    .find_column(source_column)
                    .map(|c| c.source_type.to_string())
                    .unwrap_or_default();
                // Spanner types are case insensitive and print upper case;
                // lower case reads better next to source DB types.
                let target_type = target_schema
                    .find_column(target_column)
                    .map(|c| c.target_type.to_string().to_lowercase())
                    .unwrap_or_default();

                lines.push(explain(
                    issue,
                    entry.description,
                    source_column,
                    &source_type,
                    &target_type,
                ));
            }
        }

        if !lines.is_empty() {
            body.push(TableReportBody::new(heading, lines));
        }
    }

    (body, lookup_errors)
}

/// Explanation line for one issue instance
fn explain(
    issue: SchemaIssue,
    description: &str,
    column: &str,
    source_type: &str,
    target_type: &str,
) -> String {
    match issue {
        SchemaIssue::DefaultValue => format!("{} e.g. column '{}'", description, column),
        SchemaIssue::ForeignKey => {
            format!("Column '{}' uses foreign keys which Spanner does not support", column)
        }
        // Avoid the confusing "timestamp is mapped to timestamp"
        SchemaIssue::Timestamp => format!(
            "Some columns have source DB type 'timestamp without timezone' which is mapped \
             to Spanner type timestamp e.g. column '{}'. {}",
            column, description
        ),
        SchemaIssue::Widened => format!(
            "{} e.g. for column '{}', source DB type {} is mapped to Spanner type {}",
            description, column, source_type, target_type
        ),
        _ => format!(
            "Column '{}': type {} is mapped to {}. {}",
            column, source_type, target_type, description
        ),
    }
}

/// Fill row counts and check them for consistency.
///
/// `rows` should equal good plus bad conversions, and no more rows can fail to
/// be written than were converted. Violations are recorded but the counts are
/// reported as found.
fn fill_row_stats(
    conv: &mut ConversionState,
    source_table: &str,
    bad_writes: &HashMap<String, i64>,
    report: &mut TableReport,
) {
    let rows = conv.stats.rows.get(source_table).copied().unwrap_or(0);
    let good_conv_rows = conv.stats.good_rows.get(source_table).copied().unwrap_or(0);
    let bad_conv_rows = conv.stats.bad_rows.get(source_table).copied().unwrap_or(0);
    let bad_row_writes = bad_writes.get(source_table).copied().unwrap_or(0);

    if rows != good_conv_rows + bad_conv_rows || bad_row_writes > good_conv_rows {
        conv.unexpected(format!(
            "Inconsistent row counts for table {}: {} {} {} {}",
            source_table, rows, good_conv_rows, bad_conv_rows, bad_row_writes
        ));
    }

    report.rows = rows;
    report.bad_rows = bad_conv_rows + bad_row_writes;
}
