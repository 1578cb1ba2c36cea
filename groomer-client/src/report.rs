//! Plain-text rendering of store state
//!
//! Mirrors what the compare page shows: the list of uploaded files and, per
//! compared file, the rows that have no match in the other files.

use std::cmp::Ordering;
use std::fmt::Write;

use serde_json::Value;

use crate::models::{Comparison, DataFileId, DiscrepantRow};
use crate::stores::DataFileState;

/// One filename per line, ordered by data file id
pub fn render_file_list(files: &DataFileState) -> String {
    let mut out = String::new();
    for file in files.files.values() {
        let _ = writeln!(out, "{:>6}  {}", file.id, file.filename);
    }
    out
}

/// Discrepancy tables, one section per data file in the comparison
///
/// Returns an empty string for an empty comparison. Files missing from
/// `files` are labelled `file <id>`.
pub fn render_comparison(comparison: &Comparison, files: &DataFileState) -> String {
    let mut out = String::new();

    for (id, rows) in comparison {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "== {} ==", file_label(*id, files));

        if rows.is_empty() {
            let _ = writeln!(out, "(no discrepancies)");
            continue;
        }

        let mut sorted: Vec<(&String, &DiscrepantRow)> = rows.iter().collect();
        sorted.sort_by(|a, b| compare_row_keys(a.0, b.0));

        let key_width = sorted.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, values) in sorted {
            let cells: Vec<String> = values.iter().map(cell_text).collect();
            let _ = writeln!(out, "{:>width$} | {}", key, cells.join(" | "), width = key_width);
        }
    }

    out
}

fn file_label(id: DataFileId, files: &DataFileState) -> String {
    files
        .get(id)
        .map(|file| file.filename.clone())
        .unwrap_or_else(|| format!("file {}", id))
}

/// Strings print bare, null prints empty, anything else as JSON
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Numeric row keys sort numerically and before any non-numeric keys
fn compare_row_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
