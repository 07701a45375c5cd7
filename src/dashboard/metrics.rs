use serde::Serialize;
use std::collections::HashMap;

use crate::models::filter::StatusBucket;
use crate::models::issue::NormalizedIssueRow;
use crate::models::team::TeamDirectory;

// Development counts as in progress here, unlike the status bucket filter.
const PROGRESS_STATUSES: &[&str] = &["Development", "In Progress", "In Review", "Testing"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_issues: usize,
    pub completed_issues: usize,
    pub in_progress_issues: usize,
    pub blocked_issues: usize,
    pub completion_rate: f64,
    pub avg_story_points: f64,
}

impl SummaryMetrics {
    pub fn from_issues(issues: &[NormalizedIssueRow]) -> Self {
        let completed: Vec<&NormalizedIssueRow> = issues
            .iter()
            .filter(|i| StatusBucket::Completed.matches(&i.status))
            .collect();

        let in_progress_issues = issues
            .iter()
            .filter(|i| PROGRESS_STATUSES.contains(&i.status.as_str()))
            .count();
        let blocked_issues = issues
            .iter()
            .filter(|i| StatusBucket::Blocked.matches(&i.status))
            .count();

        let total_issues = issues.len();
        let completion_rate = if total_issues > 0 {
            completed.len() as f64 / total_issues as f64 * 100.0
        } else {
            0.0
        };

        let avg_story_points = if completed.is_empty() {
            0.0
        } else {
            completed.iter().map(|i| i.story_points_estimate).sum::<f64>() / completed.len() as f64
        };

        Self {
            total_issues,
            completed_issues: completed.len(),
            in_progress_issues,
            blocked_issues,
            completion_rate,
            avg_story_points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub member: String,
    pub issues: usize,
}

/// Issue counts per assignee, busiest first, named as the team knows them.
pub fn team_workload(issues: &[NormalizedIssueRow], team: &TeamDirectory) -> Vec<Workload> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for issue in issues {
        let member = team.display_name_of(&issue.assignee_identity);
        *counts.entry(member).or_insert(0) += 1;
    }

    let mut workload: Vec<Workload> = counts
        .into_iter()
        .map(|(member, issues)| Workload { member, issues })
        .collect();
    workload.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.member.cmp(&b.member)));
    workload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::TeamMember;

    fn issue(key: &str, status: &str, assignee: &str, points: f64) -> NormalizedIssueRow {
        let mut row = NormalizedIssueRow::fallback(Some(key));
        row.summary = key.to_string();
        row.status = status.to_string();
        row.assignee_identity = assignee.to_string();
        row.story_points_estimate = points;
        row
    }

    #[test]
    fn test_summary_metrics() {
        let issues = vec![
            issue("A-1", "Done", "alice@x.com", 3.0),
            issue("A-2", "Resolved", "bob@x.com", 5.0),
            issue("A-3", "Development", "alice@x.com", 8.0),
            issue("A-4", "Blocked", "Unassigned", 0.0),
        ];

        let metrics = SummaryMetrics::from_issues(&issues);
        assert_eq!(metrics.total_issues, 4);
        assert_eq!(metrics.completed_issues, 2);
        assert_eq!(metrics.in_progress_issues, 1);
        assert_eq!(metrics.blocked_issues, 1);
        assert_eq!(metrics.completion_rate, 50.0);
        assert_eq!(metrics.avg_story_points, 4.0);
    }

    #[test]
    fn test_summary_metrics_empty() {
        let metrics = SummaryMetrics::from_issues(&[]);
        assert_eq!(metrics.total_issues, 0);
        assert_eq!(metrics.completion_rate, 0.0);
        assert_eq!(metrics.avg_story_points, 0.0);
    }

    #[test]
    fn test_team_workload() {
        let team = TeamDirectory::new(vec![TeamMember {
            name: "Alice".to_string(),
            identity: "alice@x.com".to_string(),
        }]);
        let issues = vec![
            issue("A-1", "Done", "alice@x.com", 0.0),
            issue("A-2", "Done", "carol@x.com", 0.0),
            issue("A-3", "Done", "alice@x.com", 0.0),
        ];

        assert_eq!(
            team_workload(&issues, &team),
            vec![
                Workload {
                    member: "Alice".to_string(),
                    issues: 2
                },
                Workload {
                    member: "carol".to_string(),
                    issues: 1
                },
            ]
        );
    }
}
