//! The flat key/value record produced by the table parser.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Value of one parsed row: cleaned text or the checked options of a checkbox group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Cleaned cell text (or an image reference).
    Text(String),
    /// Checked options in document order, duplicates preserved.
    List(Vec<String>),
}

impl FieldValue {
    /// First value: the text itself, or the first list entry.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::List(items) => items.first().map(String::as_str),
        }
    }

    /// All values as a slice-like vector of borrowed strings.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the value carries no content at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for FieldValue {
    #[inline]
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    #[inline]
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Ordered mapping from canonical (or passthrough) key to [`FieldValue`].
///
/// Keys are unique. Inserting an existing key replaces its value in place, so
/// the last table row with a given label wins while the first row's position
/// in the ordering is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    entries: Vec<(String, FieldValue)>,
}

impl ParsedRecord {
    /// Create an empty record.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite the value stored under `key`.
    ///
    /// Returns the previous value when the key was already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Value stored under `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// First value under `key`, treating empty text as absent.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(FieldValue::first)
            .filter(|value| !value.is_empty())
    }

    /// All values under `key`; empty when the key is missing.
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.get(key).map(FieldValue::values).unwrap_or_default()
    }

    /// Whether `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was extracted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Re-key every entry through [`crate::labels::canonicalize`].
    ///
    /// Used for records that did not come out of the table parser (for example a
    /// hand-written JSON payload). Colliding keys keep last-write-wins semantics.
    #[must_use]
    pub fn canonicalized(&self) -> Self {
        let mut out = Self::new();
        for (key, value) in &self.entries {
            out.insert(crate::labels::canonicalize(key), value.clone());
        }
        out
    }

    /// Decode a hand-written JSON object of label/value pairs and canonicalize
    /// its labels.
    ///
    /// # Errors
    ///
    /// [`crate::IndicatorError::JsonError`] for malformed JSON,
    /// [`crate::IndicatorError::InvalidPayload`] when the JSON is not an object
    /// of strings or string arrays.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        crate::error::decode_json::<Self>(json).map(|record| record.canonicalized())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for ParsedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct ParsedRecordVisitor;

impl<'de> Visitor<'de> for ParsedRecordVisitor {
    type Value = ParsedRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of labels to strings or string arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = ParsedRecord::new();
        while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for ParsedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ParsedRecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut record = ParsedRecord::new();
        assert!(record.insert("A", "one").is_none());
        record.insert("B", vec!["x"]);
        let previous = record.insert("A", "two");

        assert_eq!(previous, Some(FieldValue::from("one")));
        assert_eq!(record.len(), 2);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(record.first("A"), Some("two"));
    }

    #[test]
    fn test_first_treats_empty_text_as_absent() {
        let record: ParsedRecord = [("Description", "")].into_iter().collect();
        assert!(record.contains_key("Description"));
        assert_eq!(record.first("Description"), None);
        assert_eq!(record.first("Missing"), None);
    }

    #[test]
    fn test_values_of_text_and_list() {
        let mut record = ParsedRecord::new();
        record.insert("T", "solo");
        record.insert("L", vec!["a", "b"]);
        assert_eq!(record.values("T"), vec!["solo"]);
        assert_eq!(record.values("L"), vec!["a", "b"]);
        assert!(record.values("none").is_empty());
    }

    #[test]
    fn test_from_json_canonicalizes_labels() {
        let record =
            ParsedRecord::from_json(r#"{"indicator short name:": "Soil carbon", "Extra": ["a"]}"#)
                .unwrap();
        assert_eq!(record.first(crate::keys::SHORT_NAME), Some("Soil carbon"));
        assert_eq!(record.values("Extra"), vec!["a"]);
    }

    #[test]
    fn test_from_json_rejects_non_object_and_bad_values() {
        for payload in [r#"["a", "b"]"#, r#"{"Description": 5}"#] {
            let err = ParsedRecord::from_json(payload).unwrap_err();
            assert!(
                matches!(err, crate::IndicatorError::InvalidPayload(_)),
                "{payload}: {err}"
            );
        }
        let err = ParsedRecord::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::IndicatorError::JsonError(_)));
    }

    #[test]
    fn test_json_preserves_row_order() {
        let json = r#"{"Zeta":"z","Alpha":["a","b"],"Mid":"m"}"#;
        let record: ParsedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_canonicalized_rekeys_variants() {
        let record: ParsedRecord = [
            ("organisation website", FieldValue::from("https://a.org")),
            ("Pre analysis", FieldValue::from(vec!["Data quality control"])),
            ("Funding", FieldValue::from("grant")),
        ]
        .into_iter()
        .collect();

        let canonical = record.canonicalized();
        assert_eq!(
            canonical.first(crate::keys::ORG_WEBSITE),
            Some("https://a.org")
        );
        assert_eq!(
            canonical.values(crate::keys::PRE_ANALYSIS),
            vec!["Data quality control"]
        );
        assert_eq!(canonical.first("Funding"), Some("grant"));
    }
}
