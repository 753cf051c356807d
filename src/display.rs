//! Flattening stored payloads into label/value rows for the admin API.

use serde::Serialize;
use serde_json::Value;

use crate::models::{scalar_text, FieldValue, Fields};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub label: String,
    pub value: String,
}

pub fn field_label(id: &str) -> &str {
    match id {
        "first_name" => "First Name",
        "last_name" => "Last Name",
        "email" => "Email",
        "phone" => "Phone",
        "zipcode" => "Zip Code",
        "acceptance" => "Terms Accepted",
        other => other,
    }
}

pub fn primary_rows(fields: &Fields) -> Vec<DisplayRow> {
    fields
        .iter()
        .map(|(id, value)| DisplayRow {
            label: field_label(id).to_string(),
            value: value.display(),
        })
        .collect()
}

/// Survey answers are keyed by whatever the survey service sends; keys are
/// shown verbatim.
pub fn secondary_rows(payload: Option<&Value>) -> Vec<DisplayRow> {
    let Some(Value::Object(obj)) = payload else {
        return Vec::new();
    };
    obj.iter()
        .map(|(key, value)| DisplayRow {
            label: key.clone(),
            value: json_display(value),
        })
        .collect()
}

fn json_display(value: &Value) -> String {
    match value {
        Value::Array(items) if items.iter().all(is_scalar) => {
            FieldValue::List(items.iter().map(scalar_text).collect()).display()
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_text(scalar),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn labels_known_fields() {
        assert_eq!(field_label("zipcode"), "Zip Code");
        assert_eq!(field_label("company"), "company");
    }

    #[test]
    fn primary_rows_join_lists() {
        let mut fields = Fields::new();
        fields.insert("first_name".into(), FieldValue::Scalar("Ann".into()));
        fields.insert("acceptance".into(), FieldValue::List(vec!["on".into(), "yes".into()]));

        assert_eq!(
            primary_rows(&fields),
            vec![
                DisplayRow {
                    label: "Terms Accepted".into(),
                    value: "on, yes".into()
                },
                DisplayRow {
                    label: "First Name".into(),
                    value: "Ann".into()
                },
            ]
        );
    }

    #[test]
    fn secondary_rows_flatten_json() {
        let payload = json!({
            "answers": { "q1": "yes" },
            "count": 3,
            "missing": null,
            "tags": ["a", 2, true],
            "title": "Survey"
        });
        let rows = secondary_rows(Some(&payload));
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec![r#"{"q1":"yes"}"#, "3", "", "a, 2, true", "Survey"]);
    }

    #[test]
    fn secondary_rows_empty_without_payload() {
        assert!(secondary_rows(None).is_empty());
    }
}
