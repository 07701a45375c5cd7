use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::assemble::IssueTable;
use crate::errors::DashError;

/// Renders a table as CSV: header row, one line per issue.
pub fn to_csv(table: &IssueTable) -> String {
    let mut out = String::new();
    push_record(&mut out, table.columns.iter().map(String::as_str));
    for row in &table.rows {
        let values: Vec<String> = row.iter().map(|cell| cell.export()).collect();
        push_record(&mut out, values.iter().map(String::as_str));
    }
    out
}

fn push_record<'a>(out: &mut String, values: impl Iterator<Item = &'a str>) {
    let line = values.map(escape_field).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

/// RFC 4180 quoting for a single field.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_csv(table: &IssueTable, path: &Path) -> Result<()> {
    std::fs::write(path, to_csv(table))
        .map_err(|e| DashError::ExportFailed(format!("{}: {}", path.display(), e)))
        .context("Failed to write CSV export")?;
    Ok(())
}

/// `<view>_<yyyymmdd>.csv` in the working directory.
pub fn default_file_name(view: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y%m%d");
    PathBuf::from(format!("{}_{}.csv", view, date))
}
