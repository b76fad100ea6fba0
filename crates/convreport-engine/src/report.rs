//! Report assembler
//!
//! Writes the full conversion report: an overall summary, the source
//! statements that were ignored, optional per-statement stats, one section per
//! table and finally any unexpected conditions hit along the way.

use convreport_core::{ConversionReport, ConversionState, IssueCatalog, ReportConfig, TableReport};
use std::collections::HashMap;
use std::io::{self, Write};

use crate::format::{justify_lines, write_heading};
use crate::rating::{rate_conversion, RatingScope};
use crate::table_report::build_table_report;

const TABLE_RULE: &str = "  --------------------------------------";

/// Generates conversion reports
#[derive(Debug, Clone)]
pub struct ReportGenerator<'a> {
    catalog: &'a IssueCatalog,
    config: ReportConfig,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(catalog: &'a IssueCatalog, config: ReportConfig) -> Self {
        Self { catalog, config }
    }

    /// Generator with the standard catalog and default layout
    pub fn with_defaults() -> ReportGenerator<'static> {
        ReportGenerator::new(IssueCatalog::standard(), ReportConfig::default())
    }

    /// Write the report to `w` and return the summary statement.
    ///
    /// `bad_writes` maps source tables to rows that were converted but could
    /// not be written. The only error is a failure to write to `w`.
    pub fn generate<W: Write>(
        &self,
        conv: &mut ConversionState,
        bad_writes: &HashMap<String, i64>,
        w: &mut W,
    ) -> io::Result<String> {
        let reports = self.analyze_tables(conv, bad_writes);
        let summary = summarize(conv, &reports, bad_writes);
        let width = self.config.line_width;

        write_heading(w, "Summary of Conversion")?;
        w.write_all(summary.as_bytes())?;
        writeln!(w)?;

        let ignored = ignored_statements(conv);
        if !ignored.is_empty() {
            justify_lines(
                w,
                &format!(
                    "Note that the following source DB statements were detected but ignored: {}.",
                    ignored.join(", ")
                ),
                width,
                0,
            )?;
            write!(w, "\n\n")?;
        }

        let statements_msg = if self.config.from_pg_dump {
            "stats on the pg_dump statements processed, followed by "
        } else {
            ""
        };
        justify_lines(
            w,
            &format!(
                "The remainder of this report provides {}a table-by-table listing of schema \
                 and data conversion details. For background on the schema and data conversion \
                 process used, and explanations of the terms and notes used in this report, \
                 see HarbourBridge's README.",
                statements_msg
            ),
            width,
            0,
        )?;
        write!(w, "\n\n")?;

        if self.config.from_pg_dump {
            write_statement_stats(conv, w)?;
        }

        for report in &reports {
            self.write_table(report, w)?;
        }

        write_unexpected_conditions(conv, w)?;

        tracing::info!(tables = reports.len(), "generated conversion report");
        Ok(summary)
    }

    /// Build a report for every source table, ordered by name
    pub fn analyze_tables(
        &self,
        conv: &mut ConversionState,
        bad_writes: &HashMap<String, i64>,
    ) -> Vec<TableReport> {
        let mut tables: Vec<String> = conv.source_schema.keys().cloned().collect();
        tables.sort();

        tables
            .iter()
            .map(|t| build_table_report(self.catalog, conv, t, bad_writes))
            .collect()
    }

    /// Summary plus per-table reports, without rendering any text
    pub fn conversion_report(
        &self,
        conv: &mut ConversionState,
        bad_writes: &HashMap<String, i64>,
    ) -> ConversionReport {
        let tables = self.analyze_tables(conv, bad_writes);
        let summary = summarize(conv, &tables, bad_writes);
        ConversionReport { summary, tables }
    }

    fn write_table<W: Write>(&self, report: &TableReport, w: &mut W) -> io::Result<()> {
        let mut heading = format!("Table {}", report.source_table);
        if report.source_table != report.target_table {
            heading.push_str(&format!(" (mapped to Spanner table {})", report.target_table));
        }
        write_heading(w, &heading)?;

        w.write_all(
            rate_conversion(
                report.rows,
                report.bad_rows,
                report.columns,
                report.warnings,
                report.missing_primary_key(),
                RatingScope::Table,
            )
            .as_bytes(),
        )?;
        writeln!(w)?;

        for body in &report.body {
            writeln!(w, "{}", body.heading)?;
            for (i, line) in body.lines.iter().enumerate() {
                justify_lines(
                    w,
                    &format!("{}) {}.\n", i + 1, line),
                    self.config.line_width,
                    self.config.item_indent,
                )?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

/// Write a report with the standard catalog and layout.
///
/// `from_pg_dump` adds the per-statement breakdown for textual dumps.
pub fn generate_report<W: Write>(
    from_pg_dump: bool,
    conv: &mut ConversionState,
    w: &mut W,
    bad_writes: &HashMap<String, i64>,
) -> io::Result<String> {
    let config = ReportConfig {
        from_pg_dump,
        ..ReportConfig::default()
    };
    ReportGenerator::new(IssueCatalog::standard(), config).generate(conv, bad_writes, w)
}

/// Overall rating for the database.
///
/// Column and warning counts are weighted by each table's rows, with empty
/// tables weighing as one row so they still affect the schema rating. Row
/// totals come from the conversion stats rather than the table reports, since
/// tables dropped from the schema may still have had rows.
pub fn summarize(
    conv: &ConversionState,
    reports: &[TableReport],
    bad_writes: &HashMap<String, i64>,
) -> String {
    let mut columns = 0;
    let mut warnings = 0;
    let mut missing_primary_key = false;
    for report in reports {
        let weight = if report.rows == 0 { 1 } else { report.rows };
        columns += report.columns * weight;
        warnings += report.warnings * weight;
        missing_primary_key |= report.missing_primary_key();
    }

    let rows = conv.rows();
    let bad_rows = conv.bad_rows() + bad_writes.values().sum::<i64>();

    rate_conversion(rows, bad_rows, columns, warnings, missing_primary_key, RatingScope::Summary)
}

/// Source statement kinds that were seen but have no Spanner counterpart
pub fn ignored_statements(conv: &ConversionState) -> Vec<&'static str> {
    let mut ignored: Vec<&'static str> = conv
        .stats
        .statement
        .keys()
        .filter_map(|kind| match kind.as_str() {
            "CreateFunctionStmt" => Some("functions"),
            "CreateSeqStmt" => Some("sequences"),
            "CreatePLangStmt" => Some("procedures"),
            "CreateTrigStmt" => Some("triggers"),
            "IndexStmt" => Some("(non-primary) indexes"),
            "ViewStmt" => Some("views"),
            _ => None,
        })
        .collect();
    ignored.sort();
    ignored
}

fn write_statement_stats<W: Write>(conv: &ConversionState, w: &mut W) -> io::Result<()> {
    let mut statements: Vec<_> = conv.stats.statement.iter().collect();
    statements.sort_by(|a, b| a.0.cmp(b.0));

    write_heading(w, "Statements Processed")?;
    writeln!(w, "Analysis of statements in pg_dump output, broken down by statement type.")?;
    writeln!(w, "  schema: statements successfully processed for Spanner schema information.")?;
    writeln!(w, "    data: statements successfully processed for data.")?;
    writeln!(w, "    skip: statements not relevant for Spanner schema or data.")?;
    writeln!(w, "   error: statements that could not be processed.")?;
    writeln!(w, "{}", TABLE_RULE)?;
    writeln!(w, "  {:>6} {:>6} {:>6} {:>6}  {}", "schema", "data", "skip", "error", "statement")?;
    writeln!(w, "{}", TABLE_RULE)?;
    for (kind, stat) in statements {
        writeln!(
            w,
            "  {:>6} {:>6} {:>6} {:>6}  {}",
            stat.schema, stat.data, stat.skip, stat.error, kind
        )?;
    }
    writeln!(w, "See github.com/lfittl/pg_query_go/nodes for definitions of statement types")?;
    writeln!(w, "(lfittl/pg_query_go is the library we use for parsing pg_dump output).")?;
    writeln!(w)
}

fn write_unexpected_conditions<W: Write>(conv: &ConversionState, w: &mut W) -> io::Result<()> {
    write_heading(w, "Unexpected Conditions")?;

    if conv.stats.unexpected.is_empty() {
        writeln!(w, "There were no unexpected conditions encountered during processing.")?;
        writeln!(w)?;
    } else {
        let mut conditions: Vec<_> = conv.stats.unexpected.iter().collect();
        conditions.sort_by(|a, b| a.0.cmp(b.0));

        writeln!(w, "For debugging only. This section provides details of unexpected conditions")?;
        writeln!(w, "encountered as we processed the pg_dump data. In particular, the AST node")?;
        writeln!(w, "representation used by the lfittl/pg_query_go library used for parsing")?;
        writeln!(w, "pg_dump output is highly permissive: almost any construct can appear at")?;
        writeln!(w, "any node in the AST tree. The list details all unexpected nodes and")?;
        writeln!(w, "conditions.")?;
        writeln!(w, "{}", TABLE_RULE)?;
        writeln!(w, "  {:>6}  {}", "count", "condition")?;
        writeln!(w, "{}", TABLE_RULE)?;
        for (condition, count) in conditions {
            writeln!(w, "  {:>6}  {}", count, condition)?;
        }
        writeln!(w)?;
    }

    if conv.stats.reparsed > 0 {
        writeln!(
            w,
            "Note: there were {} pg_dump reparse events while looking for statement boundaries.",
            conv.stats.reparsed
        )?;
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use convreport_core::{
        SchemaIssue, SourceColumn, SourceTable, SourceType, StatementOutcome, TargetBaseType,
        TargetColumn, TargetTable, TargetType,
    };

    fn add_table(conv: &mut ConversionState, name: &str, columns: &[&str], rows: i64) {
        conv.add_source_table(SourceTable::new(
            name,
            columns
                .iter()
                .map(|c| SourceColumn::new(*c, SourceType::new("text")))
                .collect(),
        ));
        conv.add_target_table(TargetTable::new(
            name,
            columns
                .iter()
                .map(|c| TargetColumn::new(*c, TargetType::new(TargetBaseType::String)))
                .collect(),
        ));
        conv.map_table(name, name, columns.iter().map(|c| (*c, *c)));
        if rows > 0 {
            conv.stats.rows.insert(name.to_string(), rows);
            conv.stats.good_rows.insert(name.to_string(), rows);
        }
    }

    #[test]
    fn ignored_statements_sorted_by_label() {
        let mut conv = ConversionState::new();
        conv.stats_statement("ViewStmt", StatementOutcome::Skip);
        conv.stats_statement("IndexStmt", StatementOutcome::Skip);
        conv.stats_statement("InsertStmt", StatementOutcome::Data);

        assert_eq!(ignored_statements(&conv), vec!["(non-primary) indexes", "views"]);
    }

    #[test]
    fn summary_weights_by_rows() {
        let mut conv = ConversionState::new();
        // 1 warning in 2 columns, but almost no rows
        add_table(&mut conv, "small", &["a", "b"], 1);
        conv.add_issue("small", "a", SchemaIssue::NoGoodType);
        // Clean table carrying nearly all the data
        add_table(&mut conv, "big", &["a", "b"], 1000);

        let generator = ReportGenerator::with_defaults();
        let reports = generator.analyze_tables(&mut conv, &HashMap::new());
        let summary = summarize(&conv, &reports, &HashMap::new());

        // 1 / 2002 weighted columns is well under 5%
        assert_eq!(
            summary,
            "Schema conversion: GOOD (most columns mapped cleanly).\n\
             Data conversion: EXCELLENT (all 1001 rows written to Spanner).\n"
        );
    }

    #[test]
    fn empty_tables_weigh_one_row() {
        let mut conv = ConversionState::new();
        add_table(&mut conv, "empty", &["a"], 0);
        conv.add_issue("empty", "a", SchemaIssue::NoGoodType);

        let generator = ReportGenerator::with_defaults();
        let reports = generator.analyze_tables(&mut conv, &HashMap::new());
        let summary = summarize(&conv, &reports, &HashMap::new());

        assert!(summary.starts_with("Schema conversion: POOR (many columns did not map cleanly)."));
        assert!(summary.ends_with("Data conversion: NONE (no data rows found).\n"));
    }

    #[test]
    fn summary_counts_rows_outside_schema() {
        let mut conv = ConversionState::new();
        add_table(&mut conv, "kept", &["a"], 10);
        // Rows for a table that never made it into the schema
        conv.stats.rows.insert("dropped".into(), 10);
        conv.stats.bad_rows.insert("dropped".into(), 10);
        let bad_writes = HashMap::from([("kept".to_string(), 1)]);

        let generator = ReportGenerator::with_defaults();
        let reports = generator.analyze_tables(&mut conv, &bad_writes);
        let summary = summarize(&conv, &reports, &bad_writes);

        assert!(summary.ends_with("Data conversion: POOR (45% of 20 rows written to Spanner).\n"));
    }

    #[test]
    fn summary_notes_missing_keys() {
        let mut conv = ConversionState::new();
        add_table(&mut conv, "t", &["a"], 3);
        conv.add_synthetic_primary_key("t", "synth_id");

        let generator = ReportGenerator::with_defaults();
        let reports = generator.analyze_tables(&mut conv, &HashMap::new());

        assert!(summarize(&conv, &reports, &HashMap::new()).starts_with(
            "Schema conversion: GOOD (all columns mapped cleanly, but some missing primary keys)."
        ));
    }

    #[test]
    fn tables_in_alphabetical_order() {
        let mut conv = ConversionState::new();
        for name in ["zebra", "apple", "mango"] {
            add_table(&mut conv, name, &["a"], 1);
        }

        let generator = ReportGenerator::with_defaults();
        let names: Vec<String> = generator
            .analyze_tables(&mut conv, &HashMap::new())
            .into_iter()
            .map(|r| r.source_table)
            .collect();

        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn mapped_table_heading() {
        let mut conv = ConversionState::new();
        add_table(&mut conv, "Orders", &["a"], 0);
        conv.map_table("Orders", "orders", [("a", "a")]);
        let target = conv.target_schema.remove("Orders").unwrap();
        conv.add_target_table(TargetTable::new("orders", target.columns));

        let mut out = Vec::new();
        generate_report(false, &mut conv, &mut out, &HashMap::new()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\nTable Orders (mapped to Spanner table orders)\n"));
    }

    #[test]
    fn statement_stats_only_for_dumps() {
        let mut conv = ConversionState::new();
        conv.stats_statement("InsertStmt", StatementOutcome::Data);

        let mut out = Vec::new();
        generate_report(false, &mut conv, &mut out, &HashMap::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Statements Processed"));
        assert!(!text.contains("pg_dump statements processed"));

        let mut out = Vec::new();
        generate_report(true, &mut conv, &mut out, &HashMap::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Statements Processed"));
        assert!(text.contains("       0      1      0      0  InsertStmt\n"));
    }

    #[test]
    fn reparse_events_reported() {
        let mut conv = ConversionState::new();
        conv.collect_reparse();
        conv.collect_reparse();

        let mut out = Vec::new();
        generate_report(true, &mut conv, &mut out, &HashMap::new()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with(
            "There were no unexpected conditions encountered during processing.\n\n\
             Note: there were 2 pg_dump reparse events while looking for statement boundaries.\n\n"
        ));
    }

    #[test]
    fn returns_summary() {
        let mut conv = ConversionState::new();
        let mut out = Vec::new();
        let summary = generate_report(false, &mut conv, &mut out, &HashMap::new()).unwrap();

        assert_eq!(
            summary,
            "Schema conversion: NONE (no schema found).\nData conversion: NONE (no data rows found).\n"
        );
    }
}
