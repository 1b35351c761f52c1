//! The Extraction Record: flat, insertion-ordered field map sent to the form.

mod sanitize;

pub use sanitize::sanitize_field_name;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key that is always present and never overwritten by extracted data.
pub const REQUEST_TYPE_KEY: &str = "request_type";

/// Field name to value, in the order fields were first seen.
///
/// Keys are non-empty and limited to `[a-z0-9_]`. Re-inserting a key
/// replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRecord {
    fields: Vec<(String, String)>,
}

impl ExtractionRecord {
    /// A record holding only the `request_type` entry.
    pub fn new(request_type: &str) -> Self {
        Self {
            fields: vec![(REQUEST_TYPE_KEY.to_string(), request_type.to_string())],
        }
    }

    /// An empty record, used for the fields one extractor produces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field. Empty or non-conforming keys and the
    /// reserved `request_type` key are dropped; returns whether the field was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if !is_valid_key(&key) {
            tracing::debug!(key = %key, "dropping field with unusable name");
            return false;
        }
        if key == REQUEST_TYPE_KEY && self.get(REQUEST_TYPE_KEY).is_some() {
            tracing::debug!("ignoring extracted request_type field");
            return false;
        }
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Map union where `other` wins on collision (except for `request_type`).
    pub fn merge(mut self, other: ExtractionRecord) -> Self {
        for (key, value) in other.fields {
            if key == REQUEST_TYPE_KEY {
                tracing::debug!("ignoring request_type from merged record");
                continue;
            }
            self.insert(key, value);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl Serialize for ExtractionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
