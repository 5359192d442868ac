use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One measured run as emitted by a measurement executable: a flat
/// field -> value object.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize, From)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_owned(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn field(&self, name: &str) -> Result<&Value> {
        self.0.get(name).ok_or_else(|| Error::MissingField {
            field: name.to_owned(),
            available: self.0.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        let v = self.field(name)?;
        v.as_f64().ok_or_else(|| type_error(name, "a number", v))
    }

    /// Integer view of a numeric field. Floats are truncated toward zero.
    pub fn int(&self, name: &str) -> Result<i64> {
        let v = self.field(name)?;
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| type_error(name, "an integer", v))
    }

    pub fn int_list(&self, name: &str) -> Result<Vec<i64>> {
        let v = self.field(name)?;
        let items = v
            .as_array()
            .ok_or_else(|| type_error(name, "a list of integers", v))?;
        items
            .iter()
            .map(|item| {
                item.as_i64()
                    .ok_or_else(|| type_error(name, "a list of integers", v))
            })
            .collect()
    }

    /// Field rendered for a summary line: strings bare, everything else as JSON.
    pub fn display(&self, name: &str) -> Result<String> {
        Ok(match self.field(name)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn type_error(field: &str, expected: &'static str, found: &Value) -> Error {
    Error::FieldType {
        field: field.to_owned(),
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_field_lists_available_keys() {
        let r = Record::new().with("block_size", 10).with("rsync_bytes", 5);
        match r.f64("error_prob") {
            Err(Error::MissingField { field, available }) => {
                assert_eq!(field, "error_prob");
                assert_eq!(available, "block_size, rsync_bytes");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn int_truncates_floats() {
        let r = Record::new().with("block_size", 31.9);
        assert_eq!(r.int("block_size").unwrap(), 31);
    }

    #[test]
    fn int_list_rejects_non_lists() {
        let r = Record::new().with("nodes", "none");
        assert!(matches!(r.int_list("nodes"), Err(Error::FieldType { .. })));
        let r = Record::new().with("nodes", json!([0, 2, 4]));
        assert_eq!(r.int_list("nodes").unwrap(), vec![0, 2, 4]);
    }

    #[test]
    fn display_strips_string_quotes() {
        let r = Record::new().with("error_prob", 0.001).with("name", "emacs");
        assert_eq!(r.display("error_prob").unwrap(), "0.001");
        assert_eq!(r.display("name").unwrap(), "emacs");
    }
}
