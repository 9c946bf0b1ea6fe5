//! Opaque document records
//!
//! The store never looks inside a record. It holds a JSON tree of strings,
//! string lists, row lists and row lists keyed by a user-chosen name, and
//! compares records structurally. Typed views live in `schema`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One table row: column name to cell text
pub type Row = BTreeMap<String, String>;

/// Build a row from column/value pairs
pub fn row<const N: usize>(cells: [(&str, &str); N]) -> Row {
    cells
        .into_iter()
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect()
}

/// Build a row with every listed column set to ""
pub fn blank_row(columns: &[&str]) -> Row {
    columns
        .iter()
        .map(|column| (column.to_string(), String::new()))
        .collect()
}

/// Form data for one template instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRecord(Value);

impl DocumentRecord {
    /// A record with no fields
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Wrap an arbitrary JSON value
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Serialize a typed template struct into a record
    pub fn from_typed<T: Serialize>(typed: &T) -> serde_json::Result<Self> {
        serde_json::to_value(typed).map(Self)
    }

    /// Read the record back as a typed template struct
    pub fn to_typed<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level fields, if the record is an object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub(crate) fn fields_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.as_object_mut()
    }
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for DocumentRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        system_name: String,
        rows: Vec<Row>,
        sections: BTreeMap<String, Vec<Row>>,
    }

    #[test]
    fn test_empty_record_is_object() {
        let record = DocumentRecord::empty();
        assert!(record.fields().unwrap().is_empty());
        assert_eq!(record, DocumentRecord::default());
    }

    #[test]
    fn test_typed_round_trip_keeps_nested_sections() {
        let mut sections = BTreeMap::new();
        sections.insert(
            "orders".to_string(),
            vec![row([("fieldName", "id"), ("type", "bigint")])],
        );
        let sample = Sample {
            system_name: "Orders".to_string(),
            rows: vec![blank_row(&["a", "b"])],
            sections,
        };

        let record = DocumentRecord::from_typed(&sample).unwrap();
        assert_eq!(record.as_value()["systemName"], json!("Orders"));
        assert_eq!(record.to_typed::<Sample>().unwrap(), sample);
    }

    #[test]
    fn test_structural_equality() {
        let a = DocumentRecord::from(json!({"x": ["1", "2"], "y": {"k": []}}));
        let b = DocumentRecord::from(json!({"y": {"k": []}, "x": ["1", "2"]}));
        let c = DocumentRecord::from(json!({"x": ["2", "1"], "y": {"k": []}}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_blank_row_has_all_columns() {
        let r = blank_row(&["role", "story"]);
        assert_eq!(r.len(), 2);
        assert!(r.values().all(String::is_empty));
    }
}
