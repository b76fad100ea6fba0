//! convreport engine - conversion quality assessment
//!
//! This crate turns a conversion-state snapshot into the conversion report:
//! - Column analysis and warning counts
//! - Per-table report bodies
//! - Schema and data quality ratings
//! - Report text generation

pub mod analyzer;
pub mod format;
pub mod rating;
pub mod report;
pub mod table_report;

pub use analyzer::{analyze_columns, ColumnAnalysis};
pub use rating::{rate_conversion, rate_data, rate_schema, Rating, RatingScope};
pub use report::{generate_report, ignored_statements, summarize, ReportGenerator};
pub use table_report::build_table_report;
