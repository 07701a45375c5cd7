pub mod jira;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The tracker's search endpoint, as seen by the dashboard.
#[async_trait]
pub trait IssueSearch {
    /// Up to `max_results` raw issues matching `jql`, in the tracker's order.
    async fn search(&self, jql: &str, max_results: usize, expand: &[&str]) -> Result<Vec<Value>>;
}
