//! Schema issue tags and the issue catalog
//!
//! IMPORTANT: Issue codes are serialized into conversion-state snapshots.
//! NEVER rename or remove codes - add new ones with new names only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Schema issue registry
///
/// Each tag is recorded by the schema-mapping engine against a source column.
/// Every tag has exactly one entry in [`IssueCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaIssue {
    /// Column has a default value, which the target does not support
    DefaultValue,

    /// Column participates in a foreign key
    ForeignKey,

    /// Column is an array with more than one dimension
    MultiDimensionalArray,

    /// No target type is a reasonable match for the source type
    NoGoodType,

    /// Numeric mapped to a type that may lose precision
    Numeric,

    /// Numeric mapped to a type that preserves the declared precision
    NumericThatFits,

    /// Auto-incrementing column
    Serial,

    /// `timestamp without time zone` mapped to the target timestamp
    Timestamp,

    /// Type widened to a larger target type
    Widened,
}

impl SchemaIssue {
    /// All issue tags, in declaration order
    pub const ALL: [SchemaIssue; 9] = [
        Self::DefaultValue,
        Self::ForeignKey,
        Self::MultiDimensionalArray,
        Self::NoGoodType,
        Self::Numeric,
        Self::NumericThatFits,
        Self::Serial,
        Self::Timestamp,
        Self::Widened,
    ];

    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultValue => "DEFAULT_VALUE",
            Self::ForeignKey => "FOREIGN_KEY",
            Self::MultiDimensionalArray => "MULTI_DIMENSIONAL_ARRAY",
            Self::NoGoodType => "NO_GOOD_TYPE",
            Self::Numeric => "NUMERIC",
            Self::NumericThatFits => "NUMERIC_THAT_FITS",
            Self::Serial => "SERIAL",
            Self::Timestamp => "TIMESTAMP",
            Self::Widened => "WIDENED",
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue severity
///
/// Warnings lower the schema rating; notes are informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Note,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// Description and classification of one issue kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCatalogEntry {
    /// Short human-readable description
    pub description: &'static str,

    /// Severity level
    pub severity: IssueSeverity,

    /// Whether all instances in a table collapse into one.
    ///
    /// A batched issue is counted once per table when assessing warnings and
    /// explained only for its first instance in the report.
    pub batched: bool,
}

impl IssueCatalogEntry {
    const fn new(description: &'static str, severity: IssueSeverity, batched: bool) -> Self {
        Self { description, severity, batched }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == IssueSeverity::Warning
    }
}

/// Immutable registry of issue descriptions.
///
/// Built once per process; hand out `&IssueCatalog` to whatever needs it.
#[derive(Debug, Clone)]
pub struct IssueCatalog {
    entries: HashMap<SchemaIssue, IssueCatalogEntry>,
}

impl IssueCatalog {
    /// The standard catalog
    pub fn standard() -> &'static IssueCatalog {
        static CATALOG: OnceLock<IssueCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::build)
    }

    fn build() -> Self {
        use IssueSeverity::{Note, Warning};

        let entries = SchemaIssue::ALL
            .iter()
            .map(|&issue| {
                let entry = match issue {
                    SchemaIssue::DefaultValue => IssueCatalogEntry::new(
                        "Some columns have default values which Spanner does not support",
                        Warning,
                        true,
                    ),
                    SchemaIssue::ForeignKey => IssueCatalogEntry::new(
                        "Spanner does not support foreign keys",
                        Warning,
                        false,
                    ),
                    SchemaIssue::MultiDimensionalArray => IssueCatalogEntry::new(
                        "Spanner doesn't support multi-dimensional arrays",
                        Warning,
                        false,
                    ),
                    SchemaIssue::NoGoodType => IssueCatalogEntry::new(
                        "No appropriate Spanner type",
                        Warning,
                        false,
                    ),
                    SchemaIssue::Numeric => IssueCatalogEntry::new(
                        "Spanner does not support numeric. This type mapping could lose precision and is not recommended for production use",
                        Warning,
                        false,
                    ),
                    SchemaIssue::NumericThatFits => IssueCatalogEntry::new(
                        "Spanner does not support numeric, but this type mapping preserves the numeric's specified precision",
                        Note,
                        false,
                    ),
                    SchemaIssue::Serial => IssueCatalogEntry::new(
                        "Spanner does not support autoincrementing types",
                        Warning,
                        false,
                    ),
                    SchemaIssue::Timestamp => IssueCatalogEntry::new(
                        "Spanner timestamp is closer to PostgreSQL timestamptz",
                        Note,
                        true,
                    ),
                    SchemaIssue::Widened => IssueCatalogEntry::new(
                        "Some columns will consume more storage in Spanner",
                        Note,
                        true,
                    ),
                };
                (issue, entry)
            })
            .collect();

        Self { entries }
    }

    /// Look up the entry for an issue.
    ///
    /// Every [`SchemaIssue`] has an entry, so this never fails.
    pub fn entry(&self, issue: SchemaIssue) -> &IssueCatalogEntry {
        &self.entries[&issue]
    }

    /// All entries sorted by issue code
    pub fn entries(&self) -> Vec<(SchemaIssue, &IssueCatalogEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        entries.sort_by_key(|(issue, _)| issue.as_str());
        entries
    }
}
