use std::collections::HashMap;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One sheet row keyed by the sheet's own headers, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Pairs `cells` with `headers`. Missing trailing cells become empty strings and cells past
    /// the last header are dropped. A repeated header keeps its first position and its last value.
    pub fn from_cells(headers: &[String], cells: &[String]) -> Self {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let value = cells.get(position).cloned().unwrap_or_default();
            match fields.iter_mut().find(|(name, _)| name == header) {
                Some(existing) => existing.1 = value,
                None => fields.push((header.clone(), value)),
            }
        }
        Record { fields }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Field values submitted for an update, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, Value>")]
pub struct RecordFields(HashMap<String, String>);

impl RecordFields {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, Value>> for RecordFields {
    fn from(values: HashMap<String, Value>) -> Self {
        RecordFields(
            values
                .into_iter()
                .map(|(name, value)| (name, cell_text(value)))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecordFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RecordFields(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Text form of a JSON cell: strings verbatim, `null` empty, anything else as JSON text.
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Sort key for item ordinals: the leading integer, so `"1.2"` sorts as 1 and `"3a"` as 3.
/// Anything without leading digits counts as zero. Values too large for `i64` saturate.
pub fn ordinal_value(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    if negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    }
}
