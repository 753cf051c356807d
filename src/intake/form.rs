use std::collections::btree_map::Entry;

use serde_json::Value;

use crate::models::{FieldValue, Fields};

const FORM_NAME_KEY: &str = "form_name";
const FIELD_PREFIX: &str = "form_fields[";

/// A completed landing-page form, independent of how it was posted.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub form_name: String,
    pub fields: Fields,
}

impl FormSubmission {
    /// Accepts `{"form_name": .., "fields": {id: value}}` or a flat object
    /// where every key other than `form_name` is a field.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "Expected a JSON object".to_string())?;

        let form_name = obj
            .get(FORM_NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing form_name".to_string())?
            .to_string();

        let fields = match obj.get("fields") {
            Some(Value::Object(fields)) => fields
                .iter()
                .map(|(id, v)| (id.clone(), FieldValue::from_json(v)))
                .collect(),
            Some(_) => return Err("fields must be an object".to_string()),
            None => obj
                .iter()
                .filter(|(key, _)| key.as_str() != FORM_NAME_KEY)
                .map(|(id, v)| (id.clone(), FieldValue::from_json(v)))
                .collect(),
        };

        Ok(FormSubmission { form_name, fields })
    }

    /// Build from urlencoded or multipart pairs.
    ///
    /// When any `form_fields[id]` keys are present only those are treated as
    /// fields (the rest is form-builder bookkeeping). A trailing `[]` or a
    /// repeated key produces a list.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, String> {
        let scoped = pairs.iter().any(|(key, _)| key.starts_with(FIELD_PREFIX));
        let mut form_name = None;
        let mut fields = Fields::new();

        for (key, value) in pairs {
            if key == FORM_NAME_KEY {
                form_name = Some(value);
                continue;
            }

            let (base, is_list) = match key.strip_suffix("[]") {
                Some(base) => (base, true),
                None => (key.as_str(), false),
            };
            let id = match base
                .strip_prefix(FIELD_PREFIX)
                .and_then(|rest| rest.strip_suffix(']'))
            {
                Some(id) => id,
                None if scoped => continue,
                None => base,
            };
            if id.is_empty() {
                continue;
            }

            match fields.entry(id.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(if is_list {
                        FieldValue::List(vec![value])
                    } else {
                        FieldValue::Scalar(value)
                    });
                }
                Entry::Occupied(mut slot) => slot.get_mut().push(value),
            }
        }

        let form_name = form_name.ok_or_else(|| "Missing form_name".to_string())?;
        Ok(FormSubmission { form_name, fields })
    }
}
