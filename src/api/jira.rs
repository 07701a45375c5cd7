use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::IssueSearch;
use crate::config::settings::AuthMethod;
use crate::errors::DashError;

/// Jira caps a single search page at 100 issues.
const PAGE_SIZE: usize = 100;

pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    auth_method: AuthMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    issues: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl JiraClient {
    pub fn new(base_url: String, email: String, auth_method: AuthMethod) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            auth_method,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_method {
            AuthMethod::ApiToken { token } => request.basic_auth(&self.email, Some(token)),
            AuthMethod::PersonalAccessToken { token } => request.bearer_auth(token),
        }
    }

    /// One page of `/rest/api/2/search`. API v2 keeps descriptions as
    /// plain text.
    async fn search_page(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
        expand: &[&str],
    ) -> Result<SearchPage> {
        let mut url = format!(
            "{}/rest/api/2/search?jql={}&startAt={}&maxResults={}",
            self.base_url,
            urlencoding::encode(jql),
            start_at,
            max_results
        );
        if !expand.is_empty() {
            url.push_str(&format!("&expand={}", urlencoding::encode(&expand.join(","))));
        }

        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(DashError::from)
            .context("Failed to send search request to Jira")?;

        let response = check_status(response).await?;

        let page = response
            .json::<SearchPage>()
            .await
            .context("Failed to parse Jira search response")?;

        Ok(page)
    }

    pub async fn current_user(&self) -> Result<CurrentUser> {
        let url = format!("{}/rest/api/2/myself", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(DashError::from)
            .context("Failed to send request to Jira")?;

        let response = check_status(response).await?;

        let user = response
            .json::<CurrentUser>()
            .await
            .context("Failed to parse Jira user response")?;

        Ok(user)
    }
}

#[async_trait]
impl IssueSearch for JiraClient {
    async fn search(&self, jql: &str, max_results: usize, expand: &[&str]) -> Result<Vec<Value>> {
        let mut issues: Vec<Value> = Vec::new();

        while issues.len() < max_results {
            let wanted = (max_results - issues.len()).min(PAGE_SIZE);
            let page = self.search_page(jql, issues.len(), wanted, expand).await?;

            let received = page.issues.len();
            issues.extend(page.issues);
            tracing::debug!(received, total = ?page.total, "Fetched search page");

            if received == 0 {
                break;
            }
            if let Some(total) = page.total {
                if issues.len() >= total {
                    break;
                }
            }
        }

        issues.truncate(max_results);
        Ok(issues)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if status == 401 || status == 403 {
        return Err(DashError::JiraAuthFailed(status.as_u16()).into());
    }
    Err(DashError::JiraApiError(status.as_u16(), api_error_message(&text)).into())
}

/// Jira reports problems as `{"errorMessages": [...], "errors": {...}}`.
fn api_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let mut messages: Vec<String> = value
        .get("errorMessages")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(errors) = value.get("errors").and_then(Value::as_object) {
        for (field, message) in errors {
            if let Some(message) = message.as_str() {
                messages.push(format!("{}: {}", field, message));
            }
        }
    }

    if messages.is_empty() {
        body.to_string()
    } else {
        messages.join("; ")
    }
}
