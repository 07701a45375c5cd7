//! Dashboard views: build the query, search, assemble the table.
//!
//! Everything here is a pure function of the settings, the filter intent
//! and what the search capability returns, so a caching layer can wrap any
//! view without changing its results.

pub mod assemble;
pub mod export;
pub mod fields;
pub mod metrics;
pub mod normalize;
pub mod query;

use anyhow::Result;

use crate::api::IssueSearch;
use crate::config::settings::DashboardConfig;
use crate::errors::DashError;
use crate::models::filter::FilterIntent;
use crate::models::team::TeamDirectory;
use assemble::{Assembled, ColumnSpec, PostProcessing, ResultSetAssembler, RANK_COLUMN};
use query::{PriorityView, QueryBuilder, QueryPlan, UnmappedSelection};

const ACTIVITY_EXPAND: &[&str] = &["changelog"];
const PRIORITY_EXPAND: &[&str] = &["changelog", "worklog"];
const COMPLETED_EXPAND: &[&str] = &["changelog"];

pub const PRIORITY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new(RANK_COLUMN, "Priority"),
    ColumnSpec::new("key", "JIRA ID"),
    ColumnSpec::new("issue_type", "Issue Type"),
    ColumnSpec::new("status", "Status"),
    ColumnSpec::new("created", "Start Date"),
    ColumnSpec::new("due_date", "Due Date"),
    ColumnSpec::new("story_points_estimate", "Est. Story Points"),
    ColumnSpec::new("story_points_actual", "Act. Story Points"),
    ColumnSpec::new("assignee_identity", "Assigned To"),
    ColumnSpec::new("summary", "Description"),
];

pub const COMPLETED_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("key", "JIRA ID"),
    ColumnSpec::new("issue_type", "Issue Type"),
    ColumnSpec::new("summary", "Summary"),
    ColumnSpec::new("status", "Status"),
    ColumnSpec::new("assignee_identity", "Assigned To"),
    ColumnSpec::new("updated", "Completed Date"),
    ColumnSpec::new("created", "Created Date"),
    ColumnSpec::new("story_points_estimate", "Est. Story Points"),
    ColumnSpec::new("story_points_actual", "Act. Story Points"),
];

pub const ACTIVITY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("key", "Issue Key"),
    ColumnSpec::new("summary", "Summary"),
    ColumnSpec::new("status", "Status"),
    ColumnSpec::new("issue_type", "Type"),
    ColumnSpec::new("assignee_identity", "Assignee"),
    ColumnSpec::new("priority", "Priority"),
    ColumnSpec::new("updated", "Updated"),
    ColumnSpec::new("due_date", "Due Date"),
    ColumnSpec::new("story_points_estimate", "Story Points"),
    ColumnSpec::new("sprint", "Sprint"),
];

pub struct Dashboard<'a, S> {
    search: &'a S,
    queries: QueryBuilder<'a>,
    limits: &'a DashboardConfig,
    assembler: ResultSetAssembler,
}

impl<'a, S: IssueSearch + Sync> Dashboard<'a, S> {
    pub fn new(
        search: &'a S,
        limits: &'a DashboardConfig,
        team: &'a TeamDirectory,
        unmapped: UnmappedSelection,
    ) -> Self {
        Self {
            search,
            queries: QueryBuilder::new(&limits.query, team, unmapped),
            limits,
            assembler: ResultSetAssembler,
        }
    }

    pub async fn weekly_activity(&self, intent: &FilterIntent, full: bool) -> Result<Assembled> {
        let mut post = PostProcessing::with_dates();
        if !full {
            post = post.projected(ACTIVITY_COLUMNS);
        }
        let plan = self.queries.activity(intent);
        self.run("activity", plan, self.limits.activity_limit, ACTIVITY_EXPAND, &post)
            .await
    }

    pub async fn priorities(&self, view: PriorityView, intent: &FilterIntent) -> Result<Assembled> {
        let post = PostProcessing::with_dates().ranked().projected(PRIORITY_COLUMNS);
        tracing::debug!(%view, "Building priority view");
        let plan = self.queries.priorities(view, intent);
        self.run("priorities", plan, self.limits.priority_limit, PRIORITY_EXPAND, &post)
            .await
    }

    pub async fn last_week_completed(&self, intent: &FilterIntent) -> Result<Assembled> {
        let post = PostProcessing::with_dates().projected(COMPLETED_COLUMNS);
        let plan = self.queries.completed_last_week(intent);
        self.run("completed", plan, self.limits.completed_limit, COMPLETED_EXPAND, &post)
            .await
    }

    pub async fn my_issues(&self) -> Result<Assembled> {
        let post = PostProcessing::with_dates().projected(ACTIVITY_COLUMNS);
        let plan = QueryPlan::Search(self.queries.my_open_issues());
        self.run("mine", plan, self.limits.my_issues_limit, &[], &post).await
    }

    /// Arbitrary JQL, normalized like every other view.
    pub async fn custom(&self, jql: &str, limit: usize) -> Result<Assembled> {
        let post = PostProcessing::with_dates();
        tracing::info!(view = "custom", %jql, "Searching");
        let records = self.search.search(jql, limit, &[]).await?;
        Ok(self.assembler.assemble(&records, limit, &post))
    }

    async fn run(
        &self,
        view: &str,
        plan: QueryPlan,
        cap: usize,
        expand: &[&str],
        post: &PostProcessing,
    ) -> Result<Assembled> {
        let jql = match plan {
            QueryPlan::Search(jql) => jql,
            QueryPlan::NoMatches => {
                tracing::info!(view, "Member selection matches no one, skipping search");
                return Ok(self.assembler.empty(post));
            }
        };

        tracing::info!(view, jql = %jql, "Searching");
        let records = self
            .search
            .search(jql.as_str(), cap, expand)
            .await
            .inspect_err(|e| {
                if e.downcast_ref::<DashError>().is_some_and(DashError::is_transport) {
                    tracing::warn!(view, "Search failed, view aborted");
                }
            })?;
        let assembled = self.assembler.assemble(&records, cap, post);
        tracing::info!(view, issues = assembled.issues.len(), "Retrieved issues");

        Ok(assembled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::MemberSelection;
    use crate::models::team::TeamMember;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Records every call and answers with canned issues.
    struct StubSearch {
        issues: Vec<Value>,
        calls: Mutex<Vec<(String, usize, Vec<String>)>>,
        fail: bool,
    }

    impl StubSearch {
        fn returning(issues: Vec<Value>) -> Self {
            Self {
                issues,
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(Vec::new())
            }
        }

        fn calls(&self) -> Vec<(String, usize, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IssueSearch for StubSearch {
        async fn search(&self, jql: &str, max_results: usize, expand: &[&str]) -> Result<Vec<Value>> {
            self.calls.lock().unwrap().push((
                jql.to_string(),
                max_results,
                expand.iter().map(|e| e.to_string()).collect(),
            ));
            if self.fail {
                return Err(DashError::JiraAuthFailed(401).into());
            }
            Ok(self.issues.clone())
        }
    }

    fn team() -> TeamDirectory {
        TeamDirectory::new(vec![TeamMember {
            name: "Alice".to_string(),
            identity: "alice@x.com".to_string(),
        }])
    }

    fn issues() -> Vec<Value> {
        vec![
            json!({
                "key": "OPS-1",
                "fields": {
                    "summary": "Ship it",
                    "status": { "name": "Development" },
                    "issuetype": { "name": "Story" },
                    "assignee": { "emailAddress": "alice@x.com" },
                    "created": "2024-03-01T09:15:00.000+0000",
                    "customfield_10016": 5
                }
            }),
            json!({ "key": "OPS-2", "fields": { "status": {} } }),
        ]
    }

    #[tokio::test]
    async fn test_priorities_rank_and_columns() {
        let search = StubSearch::returning(issues());
        let limits = DashboardConfig::default();
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::Unfiltered);

        let result = dashboard
            .priorities(PriorityView::Current, &FilterIntent::for_members(vec!["Alice".to_string()]))
            .await
            .unwrap();

        let headers: Vec<&str> = PRIORITY_COLUMNS.iter().map(|c| c.header).collect();
        assert_eq!(result.table.columns, headers);
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.rows[1][0], assemble::Cell::Rank(2));
        assert_eq!(result.issues[1].summary, "Error loading issue data");

        let calls = search.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("(assignee = \"alice@x.com\")"));
        assert_eq!(calls[0].1, 50);
        assert_eq!(calls[0].2, vec!["changelog", "worklog"]);
    }

    #[tokio::test]
    async fn test_no_matches_skips_search() {
        let search = StubSearch::returning(issues());
        let limits = DashboardConfig::default();
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::NoMatches);

        let intent = FilterIntent {
            members: MemberSelection::Selected(vec!["Nobody".to_string()]),
            ..FilterIntent::default()
        };
        let result = dashboard.last_week_completed(&intent).await.unwrap();

        assert!(search.calls().is_empty());
        assert!(result.issues.is_empty());
        let headers: Vec<&str> = COMPLETED_COLUMNS.iter().map(|c| c.header).collect();
        assert_eq!(result.table.columns, headers);
    }

    #[tokio::test]
    async fn test_completed_for_unknown_member_is_empty() {
        let search = StubSearch::returning(issues());
        let limits = DashboardConfig::default();
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::Unfiltered);

        let intent = FilterIntent::for_members(vec!["Mallory".to_string()]);
        let result = dashboard.last_week_completed(&intent).await.unwrap();

        assert!(search.calls().is_empty());
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let search = StubSearch::failing();
        let limits = DashboardConfig::default();
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::Unfiltered);

        let err = dashboard
            .weekly_activity(&FilterIntent::default(), false)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DashError>(),
            Some(DashError::JiraAuthFailed(401))
        ));
    }

    #[tokio::test]
    async fn test_activity_uses_limits_and_expand() {
        let search = StubSearch::returning(issues());
        let limits = DashboardConfig {
            activity_limit: 1,
            ..DashboardConfig::default()
        };
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::Unfiltered);

        let result = dashboard.weekly_activity(&FilterIntent::default(), true).await.unwrap();

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.table.columns.len(), assemble::CANONICAL_COLUMNS.len());
        let calls = search.calls();
        assert_eq!(calls[0].0, "(updated >= -7d OR created >= -7d) ORDER BY updated DESC");
        assert_eq!(calls[0].1, 1);
        assert_eq!(calls[0].2, vec!["changelog"]);
    }

    #[tokio::test]
    async fn test_custom_query_passes_jql_through() {
        let search = StubSearch::returning(issues());
        let limits = DashboardConfig::default();
        let team = team();
        let dashboard = Dashboard::new(&search, &limits, &team, UnmappedSelection::Unfiltered);

        let result = dashboard.custom("project = OPS", 10).await.unwrap();

        assert_eq!(result.issues.len(), 2);
        assert_eq!(search.calls()[0].0, "project = OPS");
    }
}
