//! Turns raw search hits into the table a view renders or exports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::fields::format_number;
use super::normalize::normalize;
use crate::models::issue::NormalizedIssueRow;

pub const RANK_COLUMN: &str = "rank";

/// Canonical column names, in schema order.
pub const CANONICAL_COLUMNS: &[&str] = &[
    "key",
    "summary",
    "status",
    "issue_type",
    "reporter",
    "assignee_identity",
    "priority",
    "created",
    "updated",
    "due_date",
    "resolution_date",
    "description",
    "labels",
    "components",
    "story_points_estimate",
    "story_points_actual",
    "sprint",
    "epic_link",
    "eta_custom",
    "impact_custom",
];

pub const DATE_COLUMNS: &[&str] = &["created", "updated", "due_date", "resolution_date"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Rank(usize),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    fn from_text(text: &str) -> Self {
        Cell::Text(text.to_string())
    }

    fn from_optional(text: Option<&str>) -> Self {
        text.map(Cell::from_text).unwrap_or(Cell::Empty)
    }

    /// Short form for terminal tables.
    pub fn display(&self) -> String {
        match self {
            Cell::Timestamp(ts) => ts.format("%Y-%m-%d").to_string(),
            other => other.export(),
        }
    }

    /// Full form for CSV files.
    pub fn export(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Rank(r) => r.to_string(),
            Cell::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Rank(r) => serializer.serialize_u64(*r as u64),
            Cell::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

/// Column-named rows. Always carries its columns, even with zero rows.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl IssueTable {
    fn canonical(issues: &[NormalizedIssueRow]) -> Self {
        Self {
            columns: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: issues.iter().map(canonical_cells).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn coerce_dates(&mut self, columns: &[&str]) {
        for name in columns {
            let Some(index) = self.column_index(name) else {
                continue;
            };
            for row in &mut self.rows {
                row[index] = match &row[index] {
                    Cell::Text(text) => parse_timestamp(text)
                        .map(Cell::Timestamp)
                        .unwrap_or(Cell::Empty),
                    other => other.clone(),
                };
            }
        }
    }

    fn add_rank(&mut self) {
        self.columns.insert(0, RANK_COLUMN.to_string());
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.insert(0, Cell::Rank(i + 1));
        }
    }

    fn project(&mut self, projection: &[ColumnSpec]) {
        let sources: Vec<Option<usize>> = projection
            .iter()
            .map(|spec| self.column_index(spec.source))
            .collect();

        self.rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|source| source.map(|i| row[i].clone()).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();
        self.columns = projection.iter().map(|spec| spec.header.to_string()).collect();
    }
}

/// One output column: read `source`, label it `header`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: &'static str,
    pub header: &'static str,
}

impl ColumnSpec {
    pub const fn new(source: &'static str, header: &'static str) -> Self {
        Self { source, header }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostProcessing {
    pub date_columns: Vec<&'static str>,
    pub rank: bool,
    pub projection: Option<Vec<ColumnSpec>>,
}

impl PostProcessing {
    pub fn with_dates() -> Self {
        Self {
            date_columns: DATE_COLUMNS.to_vec(),
            ..Self::default()
        }
    }

    pub fn ranked(mut self) -> Self {
        self.rank = true;
        self
    }

    pub fn projected(mut self, columns: &[ColumnSpec]) -> Self {
        self.projection = Some(columns.to_vec());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Assembled {
    pub issues: Vec<NormalizedIssueRow>,
    pub table: IssueTable,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResultSetAssembler;

impl ResultSetAssembler {
    pub fn assemble(&self, records: &[Value], cap: usize, post: &PostProcessing) -> Assembled {
        let issues: Vec<NormalizedIssueRow> = records.iter().take(cap).map(normalize).collect();
        self.from_issues(issues, post)
    }

    pub fn empty(&self, post: &PostProcessing) -> Assembled {
        self.from_issues(Vec::new(), post)
    }

    fn from_issues(&self, issues: Vec<NormalizedIssueRow>, post: &PostProcessing) -> Assembled {
        let mut table = IssueTable::canonical(&issues);

        table.coerce_dates(&post.date_columns);
        if post.rank {
            table.add_rank();
        }
        if let Some(projection) = &post.projection {
            table.project(projection);
        }

        Assembled { issues, table }
    }
}

fn canonical_cells(issue: &NormalizedIssueRow) -> Vec<Cell> {
    vec![
        Cell::from_text(&issue.key),
        Cell::from_text(&issue.summary),
        Cell::from_text(&issue.status),
        Cell::from_text(&issue.issue_type),
        Cell::from_text(&issue.reporter),
        Cell::from_text(&issue.assignee_identity),
        Cell::from_text(&issue.priority),
        Cell::from_optional(issue.created.as_deref()),
        Cell::from_optional(issue.updated.as_deref()),
        Cell::from_optional(issue.due_date.as_deref()),
        Cell::from_optional(issue.resolution_date.as_deref()),
        Cell::from_text(&issue.description),
        Cell::Text(issue.labels_display()),
        Cell::Text(issue.components_display()),
        Cell::Number(issue.story_points_estimate),
        issue.story_points_actual.map(Cell::Number).unwrap_or(Cell::Empty),
        Cell::from_text(&issue.sprint),
        Cell::from_text(&issue.epic_link),
        Cell::from_optional(issue.eta_custom.as_deref()),
        Cell::from_optional(issue.impact_custom.as_deref()),
    ]
}

/// Accepts Jira's `2024-03-01T09:15:00.000+0000`, RFC 3339 and bare dates.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serializes as `{"columns": [...], "rows": [{column: value}, ...]}` so an
/// empty result still carries its schema.
impl Serialize for IssueTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a> {
            columns: &'a [String],
            cells: &'a [Cell],
        }

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.columns.len()))?;
                for (column, cell) in self.columns.iter().zip(self.cells) {
                    map.serialize_entry(column, cell)?;
                }
                map.end()
            }
        }

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|cells| Row {
                columns: &self.columns,
                cells,
            })
            .collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("columns", &self.columns)?;
        map.serialize_entry("rows", &rows)?;
        map.end()
    }
}
