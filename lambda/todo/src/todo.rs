use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::Record;

pub(crate) const CREATED_AT: &str = "createdAt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl TodoItem {
    pub fn new(text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            completed: false,
            created_at: timestamp(Utc::now()),
        }
    }

    pub fn to_record(&self) -> Result<Record, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateTodo {
    pub text: String,
}

/// Body of `PUT /todos/{id}`. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateTodo {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// The fields to write, empty when the body names none of them.
    pub fn changes(self) -> Record {
        let mut changes = Record::new();
        if let Some(text) = self.text {
            changes.insert("text".to_string(), Value::String(text));
        }
        if let Some(completed) = self.completed {
            changes.insert("completed".to_string(), Value::Bool(completed));
        }
        changes
    }
}

/// `2024-05-01T09:30:00.123Z`
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Re-renders a stored timestamp in [`timestamp`] form.
///
/// Offsets are converted to UTC. Values without an offset, as written by
/// older deployments, are taken to be UTC already. Returns `None` when the
/// value is not a timestamp at all.
pub(crate) fn normalize_timestamp(raw: &str) -> Option<String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp(at.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|at| timestamp(at.and_utc()))
}
