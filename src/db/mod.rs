pub mod submissions;
pub mod webhook_deliveries;

use serde_json::Value;

use crate::models::{FieldValue, Fields};

/// Postgres text and JSONB reject U+0000; it is removed before writing.
pub fn strip_nul(value: &mut Value) {
    match value {
        Value::String(s) => strip_nul_str(s),
        Value::Array(items) => items.iter_mut().for_each(strip_nul),
        Value::Object(map) => {
            if map.keys().any(|k| k.contains('\0')) {
                *map = std::mem::take(map)
                    .into_iter()
                    .map(|(k, v)| (k.replace('\0', ""), v))
                    .collect();
            }
            map.values_mut().for_each(strip_nul);
        }
        _ => {}
    }
}

pub fn strip_nul_fields(fields: &Fields) -> Fields {
    fields
        .iter()
        .map(|(name, value)| {
            let value = match value {
                FieldValue::Scalar(s) => FieldValue::Scalar(s.replace('\0', "")),
                FieldValue::List(items) => {
                    FieldValue::List(items.iter().map(|s| s.replace('\0', "")).collect())
                }
            };
            (name.replace('\0', ""), value)
        })
        .collect()
}

pub fn strip_nul_str(s: &mut String) {
    if s.contains('\0') {
        s.retain(|c| c != '\0');
    }
}
