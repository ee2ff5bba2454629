//! Output formatting: plain text (human-readable) and JSON.

use serde_json::Value;
use std::fmt::Write;

const MAX_CELL_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tables and key-value
    #[default]
    Plain,
    /// JSON (pretty-printed)
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "p" => Ok(OutputFormat::Plain),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Format a value as plain text: aligned tables for arrays of objects,
/// indented key-value otherwise.
pub fn format_plain(value: &Value) -> String {
    let mut out = String::new();
    write_plain(value, &mut out, 0);
    out
}

fn write_plain(v: &Value, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Array(arr) if arr.is_empty() => {
            let _ = writeln!(out, "{}<empty>", pad);
        }
        Value::Array(arr) => {
            if let Some(table) = render_table(arr, &pad) {
                out.push_str(&table);
                return;
            }
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    let _ = writeln!(out, "{}[{}]", pad, i + 1);
                    write_plain(item, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}", pad, scalar_text(item));
                }
            }
        }
        Value::Object(map) => {
            for (k, val) in map {
                if val.is_object() || val.is_array() {
                    let _ = writeln!(out, "{}{}:", pad, k);
                    write_plain(val, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}: {}", pad, k, scalar_text(val));
                }
            }
        }
        scalar => {
            let _ = writeln!(out, "{}{}", pad, scalar_text(scalar));
        }
    }
}

/// Render an array of flat objects as an aligned table. Returns `None` when
/// the rows are not uniform enough (non-objects, nested values).
fn render_table(rows: &[Value], pad: &str) -> Option<String> {
    let columns: Vec<String> = rows
        .first()?
        .as_object()
        .map(|m| m.keys().cloned().collect())?;
    if columns.is_empty() || rows.len() < 2 {
        return None;
    }
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        let obj = row.as_object()?;
        let mut line = Vec::with_capacity(columns.len());
        for col in &columns {
            let cell = match obj.get(col) {
                Some(v) if v.is_object() || v.is_array() => return None,
                Some(v) => scalar_text(v),
                None => "-".to_string(),
            };
            line.push(truncate(&cell, MAX_CELL_WIDTH));
        }
        cells.push(line);
    }

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("{:<width$}", col, width = *w))
        .collect();
    let header = header.join("  ");
    let _ = writeln!(out, "{}{}", pad, header.trim_end());
    let _ = writeln!(out, "{}{}", pad, "-".repeat(header.trim_end().len()));
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        let _ = writeln!(out, "{}{}", pad, line.join("  ").trim_end());
    }
    Some(out)
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max {
        s
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Format value as JSON (pretty).
pub fn format_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
