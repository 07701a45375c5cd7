use serde_json::{Map, Value};
use thiserror::Error;

use super::fields::{self, FieldValue};
use crate::models::issue::{NormalizedIssueRow, NO_PRIORITY, NO_SPRINT, UNASSIGNED, UNKNOWN};

const DESCRIPTION_LIMIT: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("issue record is not an object")]
    NotAnObject,
    #[error("issue record has no usable key")]
    MissingKey,
    #[error("issue record has no fields object")]
    MissingFields,
    #[error("field `{0}` has an unexpected shape")]
    Malformed(&'static str),
}

/// Flattens one raw search hit. Never fails: records that can't be read
/// come back as a fallback row carrying the key when there is one.
pub fn normalize(raw: &Value) -> NormalizedIssueRow {
    match try_normalize(raw) {
        Ok(row) => row,
        Err(err) => {
            let key = raw.get("key").and_then(Value::as_str);
            tracing::error!(key = key.unwrap_or(UNKNOWN), error = %err, "Failed to extract issue data");
            NormalizedIssueRow::fallback(key)
        }
    }
}

pub fn try_normalize(raw: &Value) -> Result<NormalizedIssueRow, NormalizeError> {
    let record = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let key = record
        .get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or(NormalizeError::MissingKey)?
        .to_string();

    let fields_value = record.get("fields").ok_or(NormalizeError::MissingFields)?;
    let fields = fields_value
        .as_object()
        .ok_or(NormalizeError::MissingFields)?;

    let assignee = fields::resolve(fields_value, &fields::ASSIGNEE)
        .map(FieldValue::into_text)
        .unwrap_or_else(|| UNASSIGNED.to_string());

    let priority = fields::resolve(fields_value, &fields::PRIORITY)
        .map(FieldValue::into_text)
        .unwrap_or_else(|| NO_PRIORITY.to_string());

    let story_points_estimate = fields::resolve(fields_value, &fields::STORY_POINTS_ESTIMATE)
        .and_then(FieldValue::into_number)
        .unwrap_or(0.0);

    let story_points_actual = fields::resolve(fields_value, &fields::STORY_POINTS_ACTUAL)
        .and_then(FieldValue::into_number);

    let sprint = fields::resolve(fields_value, &fields::SPRINT)
        .map(FieldValue::into_text)
        .unwrap_or_else(|| NO_SPRINT.to_string());

    let epic_link = fields::resolve(fields_value, &fields::EPIC_LINK)
        .map(FieldValue::into_text)
        .unwrap_or_default();

    Ok(NormalizedIssueRow {
        key,
        summary: optional_text(fields, "summary")?.unwrap_or_default(),
        status: owned_name(fields, "status", "name")?,
        issue_type: owned_name(fields, "issuetype", "name")?,
        reporter: owned_name(fields, "reporter", "displayName")?,
        assignee_identity: assignee,
        priority,
        created: optional_text(fields, "created")?,
        updated: optional_text(fields, "updated")?,
        due_date: optional_text(fields, "duedate")?,
        resolution_date: optional_text(fields, "resolutiondate")?,
        description: truncate_description(optional_text(fields, "description")?.as_deref()),
        labels: labels(fields)?,
        components: components(fields)?,
        story_points_estimate,
        story_points_actual,
        sprint,
        epic_link,
        eta_custom: fields::resolve(fields_value, &fields::ETA).map(FieldValue::into_text),
        impact_custom: fields::resolve(fields_value, &fields::IMPACT).map(FieldValue::into_text),
    })
}

fn optional_text(fields: &Map<String, Value>, name: &'static str) -> Result<Option<String>, NormalizeError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(NormalizeError::Malformed(name)),
    }
}

/// "Unknown" when the owning object is absent; a present object without
/// its name property is malformed.
fn owned_name(
    fields: &Map<String, Value>,
    owner: &'static str,
    property: &str,
) -> Result<String, NormalizeError> {
    match fields.get(owner) {
        None | Some(Value::Null) => Ok(UNKNOWN.to_string()),
        Some(object) => object
            .get(property)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(NormalizeError::Malformed(owner)),
    }
}

fn labels(fields: &Map<String, Value>) -> Result<Vec<String>, NormalizeError> {
    match fields.get("labels") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(NormalizeError::Malformed("labels"))
            })
            .collect(),
        Some(_) => Err(NormalizeError::Malformed("labels")),
    }
}

fn components(fields: &Map<String, Value>) -> Result<Vec<String>, NormalizeError> {
    match fields.get("components") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or(NormalizeError::Malformed("components"))
            })
            .collect(),
        Some(_) => Err(NormalizeError::Malformed("components")),
    }
}

fn truncate_description(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(text) if text.chars().count() > DESCRIPTION_LIMIT => {
            let head: String = text.chars().take(DESCRIPTION_LIMIT).collect();
            format!("{}...", head)
        }
        Some(text) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::LOAD_ERROR_SUMMARY;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "key": "OPS-101",
            "fields": {
                "summary": "Rotate ingest credentials",
                "status": { "name": "In Progress" },
                "issuetype": { "name": "Task" },
                "reporter": { "displayName": "Donn Mailing" },
                "assignee": { "emailAddress": "edu.cielo@x.com", "displayName": "Edu Cielo" },
                "priority": { "name": "High" },
                "created": "2024-03-01T09:15:00.000+0000",
                "updated": "2024-03-04T16:40:12.000+0000",
                "duedate": "2024-03-08",
                "resolutiondate": null,
                "description": "Keys expire on Friday.",
                "labels": ["security", "ops"],
                "components": [{ "name": "Ingest" }, { "name": "Vault" }],
                "customfield_10016": 3,
                "customfield_11580": { "value": "5" },
                "customfield_10020": [{ "id": 4, "name": "Ops Sprint 9" }],
                "customfield_10014": "OPS-7",
                "customfield_10031": "2024-03-10",
                "customfield_10040": { "value": "High" }
            }
        })
    }

    #[test]
    fn test_full_record() {
        let row = normalize(&full_record());

        let expected = NormalizedIssueRow {
            key: "OPS-101".to_string(),
            summary: "Rotate ingest credentials".to_string(),
            status: "In Progress".to_string(),
            issue_type: "Task".to_string(),
            reporter: "Donn Mailing".to_string(),
            assignee_identity: "edu.cielo@x.com".to_string(),
            priority: "High".to_string(),
            created: Some("2024-03-01T09:15:00.000+0000".to_string()),
            updated: Some("2024-03-04T16:40:12.000+0000".to_string()),
            due_date: Some("2024-03-08".to_string()),
            resolution_date: None,
            description: "Keys expire on Friday.".to_string(),
            labels: vec!["security".to_string(), "ops".to_string()],
            components: vec!["Ingest".to_string(), "Vault".to_string()],
            story_points_estimate: 3.0,
            story_points_actual: Some(5.0),
            sprint: "Ops Sprint 9".to_string(),
            epic_link: "OPS-7".to_string(),
            eta_custom: Some("2024-03-10".to_string()),
            impact_custom: Some("High".to_string()),
        };

        assert_eq!(row, expected);
    }

    #[test]
    fn test_missing_optional_fields_use_sentinels() {
        let row = normalize(&json!({ "key": "OPS-2", "fields": {} }));

        assert_eq!(row.key, "OPS-2");
        assert_eq!(row.summary, "");
        assert_eq!(row.status, "Unknown");
        assert_eq!(row.issue_type, "Unknown");
        assert_eq!(row.reporter, "Unknown");
        assert_eq!(row.assignee_identity, "Unassigned");
        assert_eq!(row.priority, "None");
        assert_eq!(row.sprint, "No Sprint");
        assert_eq!(row.epic_link, "");
        assert_eq!(row.description, "");
        assert_eq!(row.story_points_estimate, 0.0);
        assert!(row.story_points_actual.is_none());
        assert!(row.eta_custom.is_none());
        assert!(row.impact_custom.is_none());
        assert!(row.labels.is_empty());
        assert!(row.components.is_empty());
        assert!(row.created.is_none());
    }

    #[test]
    fn test_email_assignee_without_story_points() {
        let row = normalize(&json!({
            "key": "OPS-3",
            "fields": { "assignee": { "emailAddress": "a.b@x.com" } }
        }));

        assert_eq!(row.assignee_identity, "a.b@x.com");
        assert_eq!(row.story_points_estimate, 0.0);
        assert_eq!(row.story_points_actual, None);
    }

    #[test]
    fn test_description_truncation() {
        let long = "x".repeat(250);
        let row = normalize(&json!({ "key": "OPS-4", "fields": { "description": long } }));
        assert_eq!(row.description.chars().count(), 203);
        assert!(row.description.ends_with("..."));

        let exact = "é".repeat(200);
        let row = normalize(&json!({ "key": "OPS-4", "fields": { "description": exact.clone() } }));
        assert_eq!(row.description, exact);
    }

    #[test]
    fn test_malformed_nested_object_yields_fallback() {
        let row = normalize(&json!({
            "key": "OPS-5",
            "fields": {
                "summary": "Looks fine",
                "status": { "id": "3" }
            }
        }));

        assert_eq!(row.key, "OPS-5");
        assert_eq!(row.summary, LOAD_ERROR_SUMMARY);
        assert_eq!(row.status, "Unknown");
        assert_eq!(row.priority, "None");
        assert_eq!(row.assignee_identity, "Unknown");
        assert_eq!(row.sprint, "Unknown");
    }

    #[test]
    fn test_fault_reasons() {
        assert_eq!(try_normalize(&json!([1, 2])), Err(NormalizeError::NotAnObject));
        assert_eq!(try_normalize(&json!({ "fields": {} })), Err(NormalizeError::MissingKey));
        assert_eq!(try_normalize(&json!({ "key": "A-1" })), Err(NormalizeError::MissingFields));
        assert_eq!(
            try_normalize(&json!({ "key": "A-1", "fields": { "labels": "one,two" } })),
            Err(NormalizeError::Malformed("labels"))
        );
        assert_eq!(
            try_normalize(&json!({ "key": "A-1", "fields": { "created": 1700000000 } })),
            Err(NormalizeError::Malformed("created"))
        );
    }

    #[test]
    fn test_unreadable_record_gets_unknown_key() {
        let row = normalize(&json!("not a record"));
        assert_eq!(row.key, "Unknown");
        assert_eq!(row.summary, LOAD_ERROR_SUMMARY);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let record = full_record();
        assert_eq!(normalize(&record), normalize(&record));

        let broken = json!({ "key": "OPS-9", "fields": { "reporter": {} } });
        assert_eq!(normalize(&broken), normalize(&broken));
    }
}
