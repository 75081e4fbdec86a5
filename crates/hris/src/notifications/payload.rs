use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::SubjectKind;
use crate::ids::{DepartmentId, RecordId};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// Flat key/value picture of a record at emission time.
///
/// Values are scalars only (strings, numbers, booleans, null); dates are
/// rendered as `YYYY-MM-DD` and timestamps as RFC 3339.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, Value>);

impl Snapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    fields: BTreeMap<String, Value>,
}

impl SnapshotBuilder {
    pub fn text(mut self, key: &str, value: impl Display) -> Self {
        self.fields
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn optional_text<T: Display>(mut self, key: &str, value: Option<T>) -> Self {
        let value = value
            .map(|inner| Value::String(inner.to_string()))
            .unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn date(mut self, key: &str, value: NaiveDate) -> Self {
        self.fields.insert(
            key.to_string(),
            Value::String(value.format(ISO_DATE).to_string()),
        );
        self
    }

    pub fn optional_date(self, key: &str, value: Option<NaiveDate>) -> Self {
        let rendered = value.map(|date| date.format(ISO_DATE).to_string());
        self.optional_text(key, rendered)
    }

    pub fn timestamp(mut self, key: &str, value: DateTime<Utc>) -> Self {
        self.fields.insert(
            key.to_string(),
            Value::String(value.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        self
    }

    pub fn optional_timestamp(self, key: &str, value: Option<DateTime<Utc>>) -> Self {
        let rendered = value.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true));
        self.optional_text(key, rendered)
    }

    pub fn number(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot(self.fields)
    }
}

/// A record the notifier knows how to describe.
pub trait Notifiable {
    const KIND: SubjectKind;

    fn subject_id(&self) -> &RecordId;

    /// Department owning the record; used to find the supervisor to address.
    fn department_id(&self) -> &DepartmentId;

    fn snapshot(&self) -> Snapshot;
}
