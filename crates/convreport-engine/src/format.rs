//! Text formatting helpers for the conversion report

use std::io::{self, Write};

const HEADING_RULE: &str = "----------------------------";

/// Write `s` to `w`, breaking between words to keep lines within `limit`.
///
/// Only spaces separate words; embedded newlines and tabs are treated as part
/// of a word. Continuation lines are indented by `indent` spaces. A single
/// word longer than `limit` is never split.
pub fn justify_lines<W: Write>(w: &mut W, s: &str, limit: usize, indent: usize) -> io::Result<()> {
    let mut n = 0;
    let mut start_of_line = true;
    for word in s.split(' ') {
        if n + word.len() > limit && !start_of_line {
            write!(w, "\n{}", " ".repeat(indent))?;
            n = indent;
            start_of_line = true;
        }
        if start_of_line {
            w.write_all(word.as_bytes())?;
            n += word.len();
        } else {
            write!(w, " {}", word)?;
            n += word.len() + 1;
        }
        start_of_line = false;
    }
    Ok(())
}

/// Write a section heading boxed between two dashed rules
pub fn write_heading<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    write!(w, "{rule}\n{title}\n{rule}\n", rule = HEADING_RULE, title = title)
}

/// Percentage of `total` that is not `bad`.
///
/// Precision grows as the value approaches 100 so near-perfect results
/// don't round up to a misleading "100".
pub fn pct(total: i64, bad: i64) -> String {
    if bad == 0 || total == 0 {
        return "100".to_string();
    }
    let pct = 100.0 * (total - bad) as f64 / total as f64;
    if pct > 99.9 {
        format!("{:2.5}", pct)
    } else if pct > 95.0 {
        format!("{:2.3}", pct)
    } else {
        format!("{:2.0}", pct)
    }
}

/// Combine schema and data ratings into the two-line quality statement
pub fn quality_statement(schema_rating: &str, data_rating: &str) -> String {
    format!(
        "Schema conversion: {}.\nData conversion: {}.\n",
        schema_rating, data_rating
    )
}
