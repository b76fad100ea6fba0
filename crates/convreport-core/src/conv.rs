//! Conversion state
//!
//! `ConversionState` is the snapshot the schema-mapping and data-conversion
//! stages leave behind. The report engine reads it and only ever appends to
//! the unexpected-condition log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::issue::SchemaIssue;
use crate::schema::{SourceTable, TargetTable};

/// Mapping from a source table to its target table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMapping {
    /// Target table name
    pub name: String,

    /// Source column name -> target column name
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

/// Primary key column added to a table that had none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticPrimaryKey {
    /// Name of the added column
    pub column: String,

    /// Next value handed out for the column
    #[serde(default)]
    pub sequence: i64,
}

/// Outcome counts for one statement type in the dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementStat {
    #[serde(default)]
    pub schema: i64,
    #[serde(default)]
    pub data: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub error: i64,
}

/// How a statement was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOutcome {
    Schema,
    Data,
    Skip,
    Error,
}

/// Row and statement statistics gathered during conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Rows encountered, per source table
    #[serde(default)]
    pub rows: HashMap<String, i64>,

    /// Rows successfully converted, per source table
    #[serde(default)]
    pub good_rows: HashMap<String, i64>,

    /// Rows that failed conversion, per source table
    #[serde(default)]
    pub bad_rows: HashMap<String, i64>,

    /// Statement type -> outcome counts
    #[serde(default)]
    pub statement: HashMap<String, StatementStat>,

    /// Unexpected condition -> occurrence count
    #[serde(default)]
    pub unexpected: HashMap<String, i64>,

    /// Reparse events while looking for statement boundaries
    #[serde(default)]
    pub reparsed: i64,
}

/// Lookup failures while resolving source names to target names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("bad table mapping: no Spanner table for source table {0}")]
    MissingTable(String),

    #[error("bad column mapping: no Spanner column for source column {table}.{column}")]
    MissingColumn { table: String, column: String },
}

/// Failures loading or saving a state snapshot
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Snapshot of schema and data conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionState {
    /// Source tables by name
    #[serde(default)]
    pub source_schema: HashMap<String, SourceTable>,

    /// Target tables by name
    #[serde(default)]
    pub target_schema: HashMap<String, TargetTable>,

    /// Source table name -> target mapping
    #[serde(default)]
    pub to_target: HashMap<String, TableMapping>,

    /// Source table -> source column -> issues, in the order recorded
    #[serde(default)]
    pub issues: HashMap<String, HashMap<String, Vec<SchemaIssue>>>,

    /// Target table name -> synthetic primary key
    #[serde(default)]
    pub synthetic_primary_keys: HashMap<String, SyntheticPrimaryKey>,

    #[serde(default)]
    pub stats: ConversionStats,
}

impl ConversionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, StateError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StateError::IoError(e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Load a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json)
            .map_err(|e| StateError::ParseError(e.to_string()))
    }

    /// Save the snapshot as JSON
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StateError::SerializeError(e.to_string()))?;

        std::fs::write(path, json)
            .map_err(|e| StateError::IoError(e.to_string()))
    }

    pub fn add_source_table(&mut self, table: SourceTable) {
        self.source_schema.insert(table.name.clone(), table);
    }

    pub fn add_target_table(&mut self, table: TargetTable) {
        self.target_schema.insert(table.name.clone(), table);
    }

    /// Record the target table and column names for a source table
    pub fn map_table<I, S, T>(&mut self, source_table: &str, target_table: &str, columns: I)
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(s, t)| (s.into(), t.into()))
            .collect();

        self.to_target.insert(
            source_table.to_string(),
            TableMapping {
                name: target_table.to_string(),
                columns,
            },
        );
    }

    /// Append an issue to a source column
    pub fn add_issue(&mut self, source_table: &str, source_column: &str, issue: SchemaIssue) {
        self.issues
            .entry(source_table.to_string())
            .or_default()
            .entry(source_column.to_string())
            .or_default()
            .push(issue);
    }

    pub fn add_synthetic_primary_key(&mut self, target_table: &str, column: &str) {
        self.synthetic_primary_keys.insert(
            target_table.to_string(),
            SyntheticPrimaryKey {
                column: column.to_string(),
                sequence: 0,
            },
        );
    }

    pub fn stats_add_row(&mut self, source_table: &str) {
        *self.stats.rows.entry(source_table.to_string()).or_insert(0) += 1;
    }

    pub fn stats_add_good_row(&mut self, source_table: &str) {
        *self.stats.good_rows.entry(source_table.to_string()).or_insert(0) += 1;
    }

    pub fn stats_add_bad_row(&mut self, source_table: &str) {
        *self.stats.bad_rows.entry(source_table.to_string()).or_insert(0) += 1;
    }

    /// Count one statement of type `kind`
    pub fn stats_statement(&mut self, kind: &str, outcome: StatementOutcome) {
        let stat = self.stats.statement.entry(kind.to_string()).or_default();
        match outcome {
            StatementOutcome::Schema => stat.schema += 1,
            StatementOutcome::Data => stat.data += 1,
            StatementOutcome::Skip => stat.skip += 1,
            StatementOutcome::Error => stat.error += 1,
        }
    }

    pub fn collect_reparse(&mut self) {
        self.stats.reparsed += 1;
    }

    /// Record an unexpected condition
    pub fn unexpected(&mut self, condition: impl Into<String>) {
        let condition = condition.into();
        tracing::warn!(condition = %condition, "unexpected condition");
        *self.stats.unexpected.entry(condition).or_insert(0) += 1;
    }

    /// Target table for a source table
    pub fn target_table(&self, source_table: &str) -> Result<&str, LookupError> {
        self.to_target
            .get(source_table)
            .map(|m| m.name.as_str())
            .ok_or_else(|| LookupError::MissingTable(source_table.to_string()))
    }

    /// Target column for a source column
    pub fn target_column(
        &self,
        source_table: &str,
        source_column: &str,
    ) -> Result<&str, LookupError> {
        let mapping = self
            .to_target
            .get(source_table)
            .ok_or_else(|| LookupError::MissingTable(source_table.to_string()))?;

        mapping
            .columns
            .get(source_column)
            .map(|c| c.as_str())
            .ok_or_else(|| LookupError::MissingColumn {
                table: source_table.to_string(),
                column: source_column.to_string(),
            })
    }

    /// Total rows encountered across all tables
    pub fn rows(&self) -> i64 {
        self.stats.rows.values().sum()
    }

    /// Total rows that failed conversion across all tables
    pub fn bad_rows(&self) -> i64 {
        self.stats.bad_rows.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SourceColumn, SourceType};

    #[test]
    fn name_lookups() {
        let mut conv = ConversionState::new();
        conv.map_table("Users", "users", [("Id", "id")]);

        assert_eq!(conv.target_table("Users"), Ok("users"));
        assert_eq!(conv.target_column("Users", "Id"), Ok("id"));
        assert_eq!(
            conv.target_table("orders"),
            Err(LookupError::MissingTable("orders".to_string()))
        );
        assert!(matches!(
            conv.target_column("Users", "Name"),
            Err(LookupError::MissingColumn { .. })
        ));
    }

    #[test]
    fn row_totals() {
        let mut conv = ConversionState::new();
        for _ in 0..3 {
            conv.stats_add_row("a");
            conv.stats_add_good_row("a");
        }
        conv.stats_add_row("b");
        conv.stats_add_bad_row("b");

        assert_eq!(conv.rows(), 4);
        assert_eq!(conv.bad_rows(), 1);
    }

    #[test]
    fn unexpected_conditions_accumulate() {
        let mut conv = ConversionState::new();
        conv.unexpected("odd node");
        conv.unexpected("odd node");
        conv.unexpected("other");

        assert_eq!(conv.stats.unexpected["odd node"], 2);
        assert_eq!(conv.stats.unexpected["other"], 1);
    }

    #[test]
    fn issues_keep_recorded_order() {
        let mut conv = ConversionState::new();
        conv.add_issue("t", "c", SchemaIssue::Widened);
        conv.add_issue("t", "c", SchemaIssue::DefaultValue);

        assert_eq!(
            conv.issues["t"]["c"],
            vec![SchemaIssue::Widened, SchemaIssue::DefaultValue]
        );
    }

    #[test]
    fn statement_stats() {
        let mut conv = ConversionState::new();
        conv.stats_statement("InsertStmt", StatementOutcome::Data);
        conv.stats_statement("InsertStmt", StatementOutcome::Error);

        let stat = conv.stats.statement["InsertStmt"];
        assert_eq!(stat.data, 1);
        assert_eq!(stat.error, 1);
        assert_eq!(stat.schema + stat.skip, 0);
    }

    #[test]
    fn json_roundtrip() {
        let mut conv = ConversionState::new();
        conv.add_source_table(SourceTable::new(
            "t",
            vec![SourceColumn::new("c", SourceType::new("text"))],
        ));
        conv.add_issue("t", "c", SchemaIssue::NoGoodType);

        let json = serde_json::to_string(&conv).unwrap();
        let parsed = ConversionState::from_json(&json).unwrap();
        assert_eq!(parsed, conv);
    }

    #[test]
    fn missing_sections_default() {
        let conv = ConversionState::from_json("{}").unwrap();
        assert_eq!(conv.rows(), 0);
        assert!(conv.source_schema.is_empty());
    }
}
