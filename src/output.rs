//! Terminal rendering for dashboard tables, summaries and workloads.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt::Display;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::dashboard::assemble::IssueTable;
use crate::dashboard::export;
use crate::dashboard::metrics::{SummaryMetrics, Workload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Invalid format: {}. Use 'table', 'json' or 'csv'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

pub fn render_table(table: &IssueTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().map(|cell| cell.display()));
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_issues(table: &IssueTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if table.is_empty() {
                println!("{}", "  No issues found".dimmed());
            } else {
                println!("{}", render_table(table));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(table)?);
        }
        OutputFormat::Csv => {
            print!("{}", export::to_csv(table));
        }
    }
    Ok(())
}

pub fn print_summary(metrics: &SummaryMetrics, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(metrics)?);
        return Ok(());
    }

    println!("{}", "Summary".cyan().bold());
    println!("  {} {}", "Total issues:".bold(), metrics.total_issues.to_string().bright_white());
    println!("  {} {}", "Completed:".bold(), metrics.completed_issues.to_string().green());
    println!("  {} {}", "In progress:".bold(), metrics.in_progress_issues.to_string().yellow());
    println!("  {} {}", "Blocked:".bold(), metrics.blocked_issues.to_string().red());
    println!(
        "  {} {}",
        "Completion rate:".bold(),
        format!("{:.1}%", metrics.completion_rate).bright_white()
    );
    println!(
        "  {} {}",
        "Avg story points:".bold(),
        format!("{:.1}", metrics.avg_story_points).bright_white()
    );
    Ok(())
}

#[derive(Tabled, Serialize)]
struct WorkloadRow<'a> {
    #[tabled(rename = "Member")]
    member: &'a str,
    #[tabled(rename = "Issues")]
    issues: usize,
}

fn workload_csv(rows: &[WorkloadRow]) -> String {
    let mut out = String::from("Member,Issues\n");
    for row in rows {
        out.push_str(&format!("{},{}\n", export::escape_field(row.member), row.issues));
    }
    out
}

pub fn print_workload(workload: &[Workload], format: OutputFormat) -> Result<()> {
    let rows: Vec<WorkloadRow> = workload
        .iter()
        .map(|w| WorkloadRow {
            member: &w.member,
            issues: w.issues,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => print!("{}", workload_csv(&rows)),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "  No assigned issues".dimmed());
            } else {
                println!("{}", Table::new(&rows).with(Style::rounded()));
            }
        }
    }
    Ok(())
}
