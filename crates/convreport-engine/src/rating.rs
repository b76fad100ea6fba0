//! Quality ratings for schema and data conversion
//!
//! Ratings are derived on demand from counts and never stored.

use crate::format::{pct, quality_statement};

/// Quality tier
///
/// Ordered from worst to best; `None` means there was nothing to rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    None,
    Poor,
    Ok,
    Good,
    Excellent,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Poor => write!(f, "POOR"),
            Self::Ok => write!(f, "OK"),
            Self::Good => write!(f, "GOOD"),
            Self::Excellent => write!(f, "EXCELLENT"),
        }
    }
}

/// Whether a rating describes one table or the whole database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingScope {
    Table,
    Summary,
}

impl RatingScope {
    fn missing_primary_key(&self) -> &'static str {
        match self {
            Self::Table => "missing primary key",
            Self::Summary => "some missing primary keys",
        }
    }
}

/// Fewer than 5% bad
pub fn good(total: i64, bad: i64) -> bool {
    bad < total / 20
}

/// Fewer than 33% bad
pub fn ok(total: i64, bad: i64) -> bool {
    bad < total / 3
}

/// Tier for a schema conversion
pub fn schema_rating(columns: i64, warnings: i64, missing_primary_key: bool) -> Rating {
    if columns == 0 {
        Rating::None
    } else if warnings == 0 && !missing_primary_key {
        Rating::Excellent
    } else if warnings == 0 || good(columns, warnings) {
        Rating::Good
    } else if ok(columns, warnings) {
        Rating::Ok
    } else {
        Rating::Poor
    }
}

/// Tier for a data conversion
pub fn data_rating(rows: i64, bad_rows: i64) -> Rating {
    if rows == 0 {
        Rating::None
    } else if bad_rows == 0 {
        Rating::Excellent
    } else if good(rows, bad_rows) {
        Rating::Good
    } else if ok(rows, bad_rows) {
        Rating::Ok
    } else {
        Rating::Poor
    }
}

/// Describe the quality of a schema conversion.
///
/// `columns` and `warnings` may be weighted by row counts for a summary.
pub fn rate_schema(
    columns: i64,
    warnings: i64,
    missing_primary_key: bool,
    scope: RatingScope,
) -> String {
    let pk = scope.missing_primary_key();
    let rating = schema_rating(columns, warnings, missing_primary_key);
    let detail = match rating {
        Rating::None => "no schema found".to_string(),
        Rating::Excellent => "all columns mapped cleanly".to_string(),
        Rating::Good if warnings == 0 => format!("all columns mapped cleanly, but {}", pk),
        Rating::Good if missing_primary_key => format!("most columns mapped cleanly, but {}", pk),
        Rating::Good => "most columns mapped cleanly".to_string(),
        Rating::Ok if missing_primary_key => format!("some columns did not map cleanly + {}", pk),
        Rating::Ok => "some columns did not map cleanly".to_string(),
        Rating::Poor if missing_primary_key => format!("many columns did not map cleanly + {}", pk),
        Rating::Poor => "many columns did not map cleanly".to_string(),
    };
    format!("{} ({})", rating, detail)
}

/// Describe the quality of a data conversion
pub fn rate_data(rows: i64, bad_rows: i64) -> String {
    let rating = data_rating(rows, bad_rows);
    match rating {
        Rating::None => "NONE (no data rows found)".to_string(),
        Rating::Excellent => format!("EXCELLENT (all {} rows written to Spanner)", rows),
        _ => format!(
            "{} ({}% of {} rows written to Spanner)",
            rating,
            pct(rows, bad_rows),
            rows
        ),
    }
}

/// Schema and data ratings as a two-line statement
pub fn rate_conversion(
    rows: i64,
    bad_rows: i64,
    columns: i64,
    warnings: i64,
    missing_primary_key: bool,
    scope: RatingScope,
) -> String {
    quality_statement(
        &rate_schema(columns, warnings, missing_primary_key, scope),
        &rate_data(rows, bad_rows),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert!(good(100, 4));
        assert!(!good(100, 5));
        assert!(ok(100, 5));
        assert!(ok(100, 32));
        assert!(!ok(100, 33));
        // Integer division: small totals leave no room for "good"
        assert!(!good(19, 0));
        assert!(!ok(2, 0));
    }

    #[test]
    fn schema_none_without_columns() {
        assert_eq!(rate_schema(0, 0, false, RatingScope::Table), "NONE (no schema found)");
        assert_eq!(rate_schema(0, 3, true, RatingScope::Summary), "NONE (no schema found)");
    }

    #[test]
    fn schema_excellent() {
        assert_eq!(
            rate_schema(10, 0, false, RatingScope::Table),
            "EXCELLENT (all columns mapped cleanly)"
        );
    }

    #[test]
    fn schema_clean_but_missing_key() {
        assert_eq!(
            rate_schema(10, 0, true, RatingScope::Table),
            "GOOD (all columns mapped cleanly, but missing primary key)"
        );
        assert_eq!(
            rate_schema(10, 0, true, RatingScope::Summary),
            "GOOD (all columns mapped cleanly, but some missing primary keys)"
        );
    }

    #[test]
    fn schema_tiers() {
        assert_eq!(
            rate_schema(100, 1, false, RatingScope::Table),
            "GOOD (most columns mapped cleanly)"
        );
        assert_eq!(
            rate_schema(100, 1, true, RatingScope::Table),
            "GOOD (most columns mapped cleanly, but missing primary key)"
        );
        assert_eq!(
            rate_schema(10, 1, false, RatingScope::Table),
            "OK (some columns did not map cleanly)"
        );
        assert_eq!(
            rate_schema(10, 1, true, RatingScope::Summary),
            "OK (some columns did not map cleanly + some missing primary keys)"
        );
        assert_eq!(
            rate_schema(2, 1, false, RatingScope::Table),
            "POOR (many columns did not map cleanly)"
        );
        assert_eq!(
            rate_schema(2, 1, true, RatingScope::Table),
            "POOR (many columns did not map cleanly + missing primary key)"
        );
    }

    #[test]
    fn data_ratings() {
        assert_eq!(rate_data(0, 0), "NONE (no data rows found)");
        assert_eq!(rate_data(0, 4), "NONE (no data rows found)");
        assert_eq!(rate_data(42, 0), "EXCELLENT (all 42 rows written to Spanner)");
        assert_eq!(rate_data(1000, 10), "GOOD (99.000% of 1000 rows written to Spanner)");
        assert_eq!(rate_data(100, 50), "POOR (50% of 100 rows written to Spanner)");
    }

    #[test]
    fn five_percent_bad_is_only_ok() {
        assert_eq!(rate_data(100, 5), "OK (95% of 100 rows written to Spanner)");
    }

    #[test]
    fn data_rating_is_monotonic() {
        for total in [1_i64, 7, 20, 100, 1001] {
            let mut previous = data_rating(total, 0);
            for bad in 1..=total {
                let current = data_rating(total, bad);
                assert!(current <= previous, "total={} bad={}", total, bad);
                assert_ne!(current, Rating::None);
                previous = current;
            }
        }
    }

    #[test]
    fn schema_rating_is_monotonic() {
        for columns in [1_i64, 3, 40, 250] {
            for missing in [false, true] {
                let mut previous = schema_rating(columns, 0, missing);
                for warnings in 1..=columns {
                    let current = schema_rating(columns, warnings, missing);
                    assert!(current <= previous);
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn combined_statement() {
        assert_eq!(
            rate_conversion(100, 5, 10, 0, false, RatingScope::Table),
            "Schema conversion: EXCELLENT (all columns mapped cleanly).\n\
             Data conversion: OK (95% of 100 rows written to Spanner).\n"
        );
    }
}
