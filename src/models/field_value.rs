use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field id -> value, as captured from the landing form.
pub type Fields = BTreeMap<String, FieldValue>;

/// A single form answer. Multi-select inputs keep every selected option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a loosely-typed JSON field into a `FieldValue`.
    ///
    /// Form builders either send the raw value or a field record object that
    /// carries it under `value`; both are accepted.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::List(items.iter().map(scalar_text).collect()),
            Value::Object(obj) => match obj.get("value") {
                Some(inner) => FieldValue::from_json(inner),
                None => FieldValue::Scalar(value.to_string()),
            },
            other => FieldValue::Scalar(scalar_text(other)),
        }
    }

    /// Append another occurrence of the same field, promoting to a list.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::Scalar(first) => {
                *self = FieldValue::List(vec![std::mem::take(first), value]);
            }
            FieldValue::List(items) => items.push(value),
        }
    }

    pub fn display(&self) -> String {
        match self {
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

/// Text of a JSON scalar. Nested values fall back to compact JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json_keeps_lists() {
        assert_eq!(
            FieldValue::from_json(&json!(["a", "b"])),
            FieldValue::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(FieldValue::from_json(&json!("Ann")), FieldValue::Scalar("Ann".into()));
    }

    #[test]
    fn from_json_coerces_scalars() {
        assert_eq!(FieldValue::from_json(&json!(42)), FieldValue::Scalar("42".into()));
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::Scalar("true".into()));
        assert_eq!(FieldValue::from_json(&Value::Null), FieldValue::Scalar(String::new()));
    }

    #[test]
    fn from_json_unwraps_field_records() {
        let record = json!({ "id": "email", "type": "email", "value": "a@x.com" });
        assert_eq!(FieldValue::from_json(&record), FieldValue::Scalar("a@x.com".into()));
    }

    #[test]
    fn push_promotes_scalar() {
        let mut value = FieldValue::Scalar("red".into());
        value.push("blue".into());
        value.push("green".into());
        assert_eq!(value, FieldValue::List(vec!["red".into(), "blue".into(), "green".into()]));
    }

    #[test]
    fn display_joins_lists() {
        assert_eq!(FieldValue::Scalar("x".into()).display(), "x");
        assert_eq!(FieldValue::List(vec!["a".into(), "b".into()]).display(), "a, b");
    }

    #[test]
    fn serializes_untagged() {
        let mut fields = Fields::new();
        fields.insert("first_name".into(), FieldValue::Scalar("Ann".into()));
        fields.insert("topics".into(), FieldValue::List(vec!["crm".into()]));
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({ "first_name": "Ann", "topics": ["crm"] })
        );
    }
}
