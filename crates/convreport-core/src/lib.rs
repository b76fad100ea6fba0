//! convreport core
//!
//! Domain model for conversion-quality reporting.
//! Issue codes are serialized into state snapshots - never rename them.

pub mod config;
pub mod conv;
pub mod issue;
pub mod report;
pub mod schema;

pub use config::{Config, ConfigError, ReportConfig};
pub use conv::{
    ConversionState, ConversionStats, LookupError, StateError, StatementOutcome, StatementStat,
    SyntheticPrimaryKey, TableMapping,
};
pub use issue::{IssueCatalog, IssueCatalogEntry, IssueSeverity, SchemaIssue};
pub use report::{ConversionReport, TableReport, TableReportBody};
pub use schema::{
    SourceColumn, SourceTable, SourceType, TargetBaseType, TargetColumn, TargetLength, TargetTable,
    TargetType,
};
