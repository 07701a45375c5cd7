//! JQL construction for the dashboard views.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::filter::{FilterIntent, MemberSelection, Ordering};
use crate::models::team::TeamDirectory;

const CURRENT_USER: &str = "assignee = currentUser()";
const LAST_WEEK: &str = "updated >= startOfWeek(-1w) AND updated < startOfWeek()";

/// A finished JQL query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jql(String);

impl Jql {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Search(Jql),
    /// The filter can't match anything; no request is needed.
    NoMatches,
}

/// What to do when a member selection maps to no tracker identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedSelection {
    /// Drop the assignee restriction entirely.
    #[default]
    Unfiltered,
    NoMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityView {
    Current,
    UpNext,
}

impl fmt::Display for PriorityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityView::Current => write!(f, "current"),
            PriorityView::UpNext => write!(f, "up next"),
        }
    }
}

/// Workflow labels of the Jira deployment being queried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryProfile {
    pub current_status: String,
    pub up_next_statuses: Vec<String>,
    pub done_status: String,
    pub closed_statuses: Vec<String>,
    pub completed_issue_types: Vec<String>,
}

impl Default for QueryProfile {
    fn default() -> Self {
        Self {
            current_status: "Development".to_string(),
            up_next_statuses: ["To Do", "Open", "Backlog", "Selected for Development"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            done_status: "Done".to_string(),
            closed_statuses: vec!["Done".to_string(), "Closed".to_string()],
            completed_issue_types: ["Task", "Bug", "Enhancement", "Support", "Epic", "Story"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

enum AssigneeClause {
    Any,
    Identities(String),
    Unmatchable,
}

pub struct QueryBuilder<'a> {
    profile: &'a QueryProfile,
    team: &'a TeamDirectory,
    unmapped: UnmappedSelection,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(profile: &'a QueryProfile, team: &'a TeamDirectory, unmapped: UnmappedSelection) -> Self {
        Self {
            profile,
            team,
            unmapped,
        }
    }

    /// Issues touched in the last `days_back` days.
    pub fn activity(&self, intent: &FilterIntent) -> QueryPlan {
        let days = intent.days_back;
        let mut clauses = vec![format!("updated >= -{}d OR created >= -{}d", days, days)];

        match self.assignee_clause(&intent.members) {
            AssigneeClause::Any => {}
            AssigneeClause::Identities(clause) => clauses.push(clause),
            AssigneeClause::Unmatchable => return QueryPlan::NoMatches,
        }

        let statuses = intent.status.statuses();
        if !statuses.is_empty() {
            clauses.push(status_clause(&statuses));
        }

        let ordering = intent.ordering.unwrap_or(Ordering::RecentlyUpdated);
        QueryPlan::Search(assemble(&clauses, ordering))
    }

    pub fn priorities(&self, view: PriorityView, intent: &FilterIntent) -> QueryPlan {
        let (base, default_order) = match view {
            PriorityView::Current => (
                status_clause(&[self.profile.current_status.as_str()]),
                Ordering::PriorityThenDue,
            ),
            PriorityView::UpNext => {
                let statuses: Vec<&str> = self.profile.up_next_statuses.iter().map(String::as_str).collect();
                (status_clause(&statuses), Ordering::PriorityThenAge)
            }
        };

        let mut clauses = vec![base];
        match self.assignee_clause(&intent.members) {
            AssigneeClause::Any => {}
            AssigneeClause::Identities(clause) => clauses.push(clause),
            AssigneeClause::Unmatchable => return QueryPlan::NoMatches,
        }

        QueryPlan::Search(assemble(&clauses, intent.ordering.unwrap_or(default_order)))
    }

    /// Work finished last calendar week, for the caller or for the selected
    /// members. Named members that all fail to resolve match nothing, never
    /// the caller's own work.
    pub fn completed_last_week(&self, intent: &FilterIntent) -> QueryPlan {
        let named =
            matches!(&intent.members, MemberSelection::Selected(names) if !names.is_empty());
        let assignee = match self.assignee_clause(&intent.members) {
            AssigneeClause::Any if named => return QueryPlan::NoMatches,
            AssigneeClause::Any => CURRENT_USER.to_string(),
            AssigneeClause::Identities(clause) => clause,
            AssigneeClause::Unmatchable => return QueryPlan::NoMatches,
        };

        let types: Vec<String> = self
            .profile
            .completed_issue_types
            .iter()
            .map(|t| quote(t))
            .collect();

        let clauses = vec![
            assignee,
            status_clause(&[self.profile.done_status.as_str()]),
            LAST_WEEK.to_string(),
            format!("issuetype in ({})", types.join(", ")),
        ];

        QueryPlan::Search(assemble(&clauses, intent.ordering.unwrap_or(Ordering::RecentlyUpdated)))
    }

    /// Open issues assigned to the authenticated user.
    pub fn my_open_issues(&self) -> Jql {
        let excluded: Vec<String> = self
            .profile
            .closed_statuses
            .iter()
            .map(|s| format!("status != {}", quote(s)))
            .collect();

        let mut clauses = vec![CURRENT_USER.to_string()];
        if !excluded.is_empty() {
            clauses.push(excluded.join(" AND "));
        }

        assemble(&clauses, Ordering::RecentlyUpdated)
    }

    fn assignee_clause(&self, members: &MemberSelection) -> AssigneeClause {
        let names = match members {
            MemberSelection::All => return AssigneeClause::Any,
            MemberSelection::Selected(names) => names,
        };

        let (identities, unmapped) = self.team.resolve(names);
        if !unmapped.is_empty() {
            tracing::warn!(names = ?unmapped, "Ignoring team members with no Jira identity");
        }

        if identities.is_empty() {
            return match self.unmapped {
                UnmappedSelection::Unfiltered => AssigneeClause::Any,
                UnmappedSelection::NoMatches => AssigneeClause::Unmatchable,
            };
        }

        let disjunction = identities
            .iter()
            .map(|identity| format!("assignee = {}", quote(identity)))
            .collect::<Vec<_>>()
            .join(" OR ");

        AssigneeClause::Identities(disjunction)
    }
}

fn status_clause(statuses: &[&str]) -> String {
    match statuses {
        [single] => format!("status = {}", quote(single)),
        many => {
            let quoted: Vec<String> = many.iter().map(|s| quote(s)).collect();
            format!("status in ({})", quoted.join(", "))
        }
    }
}

fn assemble(clauses: &[String], ordering: Ordering) -> Jql {
    let predicate = clauses
        .iter()
        .map(|clause| format!("({})", clause))
        .collect::<Vec<_>>()
        .join(" AND ");

    Jql(format!("{} {}", predicate, ordering.order_by()))
}

/// Double-quotes a JQL value.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
