use serde::{Deserialize, Serialize};

pub const UNASSIGNED: &str = "Unassigned";
pub const NO_PRIORITY: &str = "None";
pub const NO_SPRINT: &str = "No Sprint";
pub const UNKNOWN: &str = "Unknown";
pub const LOAD_ERROR_SUMMARY: &str = "Error loading issue data";

/// One Jira issue flattened into the dashboard's canonical columns.
///
/// Dates hold the tracker's own text; they become timestamps when a result
/// set is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIssueRow {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
    pub reporter: String,
    pub assignee_identity: String,
    pub priority: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub due_date: Option<String>,
    pub resolution_date: Option<String>,
    pub description: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub story_points_estimate: f64,
    pub story_points_actual: Option<f64>,
    pub sprint: String,
    pub epic_link: String,
    pub eta_custom: Option<String>,
    pub impact_custom: Option<String>,
}

impl NormalizedIssueRow {
    /// Row used when a record can't be read. Every column still has a value.
    pub fn fallback(key: Option<&str>) -> Self {
        let key = key
            .filter(|k| !k.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        Self {
            key,
            summary: LOAD_ERROR_SUMMARY.to_string(),
            status: UNKNOWN.to_string(),
            issue_type: UNKNOWN.to_string(),
            reporter: UNKNOWN.to_string(),
            assignee_identity: UNKNOWN.to_string(),
            priority: NO_PRIORITY.to_string(),
            created: None,
            updated: None,
            due_date: None,
            resolution_date: None,
            description: String::new(),
            labels: Vec::new(),
            components: Vec::new(),
            story_points_estimate: 0.0,
            story_points_actual: None,
            sprint: UNKNOWN.to_string(),
            epic_link: String::new(),
            eta_custom: None,
            impact_custom: None,
        }
    }

    pub fn labels_display(&self) -> String {
        self.labels.join(", ")
    }

    pub fn components_display(&self) -> String {
        self.components.join(", ")
    }
}

pub fn issue_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_keeps_key() {
        let row = NormalizedIssueRow::fallback(Some("OPS-12"));
        assert_eq!(row.key, "OPS-12");
        assert_eq!(row.summary, LOAD_ERROR_SUMMARY);
        assert_eq!(row.priority, "None");
        assert_eq!(row.sprint, "Unknown");
        assert_eq!(row.story_points_estimate, 0.0);
        assert!(row.story_points_actual.is_none());
    }

    #[test]
    fn test_fallback_without_key() {
        assert_eq!(NormalizedIssueRow::fallback(None).key, "Unknown");
        assert_eq!(NormalizedIssueRow::fallback(Some("")).key, "Unknown");
    }

    #[test]
    fn test_display_joins() {
        let mut row = NormalizedIssueRow::fallback(Some("OPS-1"));
        row.labels = vec!["backend".to_string(), "urgent".to_string()];
        assert_eq!(row.labels_display(), "backend, urgent");
        assert_eq!(row.components_display(), "");
    }

    #[test]
    fn test_issue_url() {
        assert_eq!(
            issue_url("https://jira.example.com/", "WAB-1234"),
            "https://jira.example.com/browse/WAB-1234"
        );
    }
}
