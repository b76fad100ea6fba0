//! Source and target table schemas
//!
//! Only the parts of each schema that show up in the report are modeled:
//! column names and their rendered types.

use serde::{Deserialize, Serialize};

/// Array bound recorded for a dimension with no declared size
pub const UNBOUNDED: i64 = -1;

/// Source database column type as parsed from the dump
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceType {
    /// Base type name, e.g. `varchar`
    pub name: String,

    /// Type modifiers, e.g. `[10, 2]` for `numeric(10,2)`
    #[serde(default)]
    pub mods: Vec<i64>,

    /// One entry per array dimension; [`UNBOUNDED`] for `[]`
    #[serde(default)]
    pub array_bounds: Vec<i64>,
}

impl SourceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mods: Vec::new(),
            array_bounds: Vec::new(),
        }
    }

    /// Set type modifiers
    pub fn with_mods(mut self, mods: Vec<i64>) -> Self {
        self.mods = mods;
        self
    }

    /// Set array bounds
    pub fn with_array_bounds(mut self, array_bounds: Vec<i64>) -> Self {
        self.array_bounds = array_bounds;
        self
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.mods.is_empty() {
            let mods: Vec<String> = self.mods.iter().map(|m| m.to_string()).collect();
            write!(f, "({})", mods.join(","))?;
        }
        for bound in &self.array_bounds {
            if *bound == UNBOUNDED {
                write!(f, "[]")?;
            } else {
                write!(f, "[{}]", bound)?;
            }
        }
        Ok(())
    }
}

/// A column in a source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,

    #[serde(rename = "type")]
    pub source_type: SourceType,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
        }
    }
}

/// A source database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub name: String,

    /// Column definitions in declaration order
    pub columns: Vec<SourceColumn>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, columns: Vec<SourceColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Spanner base types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetBaseType {
    Bool,
    Int64,
    Float64,
    String,
    Bytes,
    Date,
    Timestamp,
}

impl std::fmt::Display for TargetBaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int64 => write!(f, "INT64"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::String => write!(f, "STRING"),
            Self::Bytes => write!(f, "BYTES"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Length of a STRING or BYTES column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLength {
    Max,
    Fixed(u64),
}

/// Target (Spanner) column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetType {
    pub base: TargetBaseType,

    /// Only meaningful for STRING and BYTES
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len: Option<TargetLength>,

    #[serde(default)]
    pub is_array: bool,
}

impl TargetType {
    pub fn new(base: TargetBaseType) -> Self {
        let len = match base {
            TargetBaseType::String | TargetBaseType::Bytes => Some(TargetLength::Max),
            _ => None,
        };
        Self {
            base,
            len,
            is_array: false,
        }
    }

    /// Set a fixed length (STRING/BYTES)
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(TargetLength::Fixed(len));
        self
    }

    /// Make this an array of the current type
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let element = match (self.base, self.len) {
            (TargetBaseType::String | TargetBaseType::Bytes, Some(TargetLength::Fixed(n))) => {
                format!("{}({})", self.base, n)
            }
            (TargetBaseType::String | TargetBaseType::Bytes, _) => format!("{}(MAX)", self.base),
            _ => self.base.to_string(),
        };
        if self.is_array {
            write!(f, "ARRAY<{}>", element)
        } else {
            write!(f, "{}", element)
        }
    }
}

/// A column in a target table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColumn {
    pub name: String,

    #[serde(rename = "type")]
    pub target_type: TargetType,
}

impl TargetColumn {
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target_type,
        }
    }
}

/// A target (Spanner) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTable {
    pub name: String,

    /// Column definitions in declaration order
    pub columns: Vec<TargetColumn>,
}

impl TargetTable {
    pub fn new(name: impl Into<String>, columns: Vec<TargetColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&TargetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}
