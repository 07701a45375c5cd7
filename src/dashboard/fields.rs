//! Field resolution over Jira's per-deployment custom field ids.
//!
//! A logical attribute (story points, sprint, ...) may live under any of
//! several field ids. Each attribute is described by a [`FieldSpec`]: the
//! candidate ids in priority order, each tagged with how its value has to be
//! read. The first candidate that yields a usable value wins.

use serde_json::Value;

/// How a candidate's raw value is turned into a usable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Number,
    SprintName,
    Identity,
    /// Text, or the first of the listed properties of an object.
    Label(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub id: &'static str,
    pub coercion: Coercion,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub candidates: &'static [Candidate],
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn into_number(self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Number(n) => format_number(n),
        }
    }
}

/// Shapes a Jira user reference can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityShape {
    Email(String),
    ShortName(String),
    DisplayName(String),
    Fallback(String),
}

impl IdentityShape {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let text = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };

                if let Some(email) = text("emailAddress") {
                    Some(IdentityShape::Email(email))
                } else if let Some(name) = text("name") {
                    Some(IdentityShape::ShortName(name))
                } else if let Some(display) = text("displayName") {
                    Some(IdentityShape::DisplayName(display))
                } else {
                    map.get("accountId")
                        .and_then(Value::as_str)
                        .map(|id| IdentityShape::Fallback(id.to_string()))
                }
            }
            Value::String(s) if !s.is_empty() => Some(IdentityShape::Fallback(s.clone())),
            _ => None,
        }
    }

    pub fn into_identity(self) -> String {
        match self {
            IdentityShape::Email(s)
            | IdentityShape::ShortName(s)
            | IdentityShape::DisplayName(s)
            | IdentityShape::Fallback(s) => s,
        }
    }
}

const fn number(id: &'static str) -> Candidate {
    Candidate {
        id,
        coercion: Coercion::Number,
    }
}

const fn label(id: &'static str, keys: &'static [&'static str]) -> Candidate {
    Candidate {
        id,
        coercion: Coercion::Label(keys),
    }
}

const fn sprint(id: &'static str) -> Candidate {
    Candidate {
        id,
        coercion: Coercion::SprintName,
    }
}

const VALUE_THEN_NAME: &[&str] = &["value", "name"];
const EPIC_KEYS: &[&str] = &["key", "value", "name"];

pub const STORY_POINTS_ESTIMATE: FieldSpec = FieldSpec {
    name: "story_points_estimate",
    candidates: &[
        number("customfield_10015"),
        number("customfield_10016"),
        number("customfield_10002"),
        number("customfield_10004"),
    ],
};

// Never shares a candidate with the estimate family.
pub const STORY_POINTS_ACTUAL: FieldSpec = FieldSpec {
    name: "story_points_actual",
    candidates: &[number("customfield_11580"), number("customfield_11642")],
};

pub const SPRINT: FieldSpec = FieldSpec {
    name: "sprint",
    candidates: &[
        sprint("customfield_10020"),
        sprint("customfield_10001"),
        sprint("customfield_10005"),
    ],
};

pub const EPIC_LINK: FieldSpec = FieldSpec {
    name: "epic_link",
    candidates: &[
        label("customfield_10014", EPIC_KEYS),
        label("customfield_10003", EPIC_KEYS),
        label("customfield_10006", EPIC_KEYS),
    ],
};

pub const ETA: FieldSpec = FieldSpec {
    name: "eta_custom",
    candidates: &[
        label("customfield_10030", VALUE_THEN_NAME),
        label("customfield_10031", VALUE_THEN_NAME),
        label("customfield_10032", VALUE_THEN_NAME),
        label("customfield_10033", VALUE_THEN_NAME),
    ],
};

pub const IMPACT: FieldSpec = FieldSpec {
    name: "impact_custom",
    candidates: &[
        label("customfield_10040", VALUE_THEN_NAME),
        label("customfield_10041", VALUE_THEN_NAME),
        label("customfield_10042", VALUE_THEN_NAME),
        label("customfield_10043", VALUE_THEN_NAME),
    ],
};

pub const ASSIGNEE: FieldSpec = FieldSpec {
    name: "assignee",
    candidates: &[Candidate {
        id: "assignee",
        coercion: Coercion::Identity,
    }],
};

pub const PRIORITY: FieldSpec = FieldSpec {
    name: "priority",
    candidates: &[label("priority", &["name", "value"])],
};

/// Returns the first candidate of `spec` that coerces, or `None`.
pub fn resolve(fields: &Value, spec: &FieldSpec) -> Option<FieldValue> {
    spec.candidates.iter().find_map(|candidate| {
        let raw = fields.get(candidate.id)?;
        if raw.is_null() {
            return None;
        }
        let value = coerce(raw, candidate.coercion);
        if value.is_none() {
            tracing::debug!(
                field = spec.name,
                candidate = candidate.id,
                "Skipping unusable field value"
            );
        }
        value
    })
}

pub fn coerce(raw: &Value, coercion: Coercion) -> Option<FieldValue> {
    match coercion {
        Coercion::Number => coerce_number(raw).map(FieldValue::Number),
        Coercion::SprintName => sprint_name(raw).map(FieldValue::Text),
        Coercion::Identity => IdentityShape::from_value(raw)
            .map(|shape| FieldValue::Text(shape.into_identity())),
        Coercion::Label(keys) => coerce_label(raw, keys).map(FieldValue::Text),
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_plain_decimal(s),
        Value::Object(map) => match map.get("value")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        },
        _ => None,
    }
}

/// Digits with at most one decimal point, nothing else.
fn parse_plain_decimal(s: &str) -> Option<f64> {
    let has_digit = s.chars().any(|c| c.is_ascii_digit());
    let only_digits_and_dots = s.chars().all(|c| c.is_ascii_digit() || c == '.');
    let dots = s.chars().filter(|c| *c == '.').count();

    if has_digit && only_digits_and_dots && dots <= 1 {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn sprint_name(raw: &Value) -> Option<String> {
    let first = raw.as_array()?.first()?;

    if let Some(name) = first.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }

    // Legacy Jira Server encodes sprints as
    // "com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=1,state=ACTIVE,name=Sprint 4,...]"
    let text = match first {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let (_, rest) = text.split_once("name=")?;
    let name = rest.split(',').next().unwrap_or_default();
    Some(name.to_string())
}

fn coerce_label(raw: &Value, keys: &[&str]) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => keys.iter().find_map(|key| match map.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
        _ => None,
    }
}

/// Story points read best without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
