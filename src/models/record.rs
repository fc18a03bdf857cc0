//! Opaque collection rows and their identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::PublicationStatus;

/// Backend-assigned identifier. Numeric and string ids are both accepted and
/// compared by their string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an id out of a JSON value (number or non-empty string).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RecordId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
    }
}

/// A row of any collection, passed through from the backend untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(RecordId::from_value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Plain-text rendering of a field for display and search.
    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(render_value).unwrap_or_default()
    }

    /// Ids listed in the comma-joined `id_user` field.
    pub fn contributor_ids(&self) -> Vec<RecordId> {
        match self.0.get("id_user") {
            Some(Value::String(joined)) => split_user_ids(joined),
            Some(Value::Array(items)) => items.iter().filter_map(RecordId::from_value).collect(),
            Some(other) => RecordId::from_value(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Moderation status, when the record carries a known one.
    pub fn status(&self) -> Option<PublicationStatus> {
        self.0
            .get("status")
            .and_then(|value| PublicationStatus::deserialize(value).ok())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Render a JSON value the way it is shown in a table cell.
///
/// Strings are verbatim, `null` is empty, arrays and objects are compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Split a comma-joined id list, skipping blanks.
pub fn split_user_ids(joined: &str) -> Vec<RecordId> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RecordId::new)
        .collect()
}

/// Join ids into the comma-separated form the backend stores.
pub fn join_user_ids(ids: &[RecordId]) -> String {
    ids.iter()
        .map(RecordId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        let a: Record = json!({ "id": 7, "title": "A" }).into();
        let b: Record = json!({ "id": "7", "title": "B" }).into();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id(), Some(RecordId::from(7)));
    }

    #[test]
    fn test_contributor_ids_from_joined_string() {
        let record: Record = json!({ "id": 1, "id_user": "3, 12,,5" }).into();
        assert_eq!(
            record.contributor_ids(),
            vec![RecordId::from(3), RecordId::from(12), RecordId::from(5)]
        );
    }

    #[test]
    fn test_contributor_ids_from_number() {
        let record: Record = json!({ "id": 1, "id_user": 4 }).into();
        assert_eq!(record.contributor_ids(), vec![RecordId::from(4)]);
    }

    #[test]
    fn test_status() {
        let pending: Record = json!({ "id": 1, "status": "en attente" }).into();
        let accepted: Record = json!({ "id": 2, "status": "accepté" }).into();
        let unknown: Record = json!({ "id": 3, "status": "draft" }).into();
        assert_eq!(pending.status(), Some(PublicationStatus::Pending));
        assert_eq!(accepted.status(), Some(PublicationStatus::Accepted));
        assert_eq!(unknown.status(), None);
        assert_eq!(Record::from(json!({ "id": 4 })).status(), None);
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&json!("x")), "x");
        assert_eq!(render_value(&json!(2.5)), "2.5");
        assert_eq!(render_value(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn test_join_user_ids() {
        let ids = vec![RecordId::from(1), RecordId::from("9")];
        assert_eq!(join_user_ids(&ids), "1,9");
        assert_eq!(split_user_ids(&join_user_ids(&ids)), ids);
    }
}
