use serde_json::Value;

use crate::error::PayloadError;
use crate::model::PaperEntry;

/// Checks that a decoded extraction payload is an array and decodes each
/// element leniently. Only the array shape is enforced; malformed fields
/// inside an entry degrade to absent values.
pub fn validate_entries(payload: Value) -> Result<Vec<PaperEntry>, PayloadError> {
    match payload {
        Value::Array(items) => Ok(items.into_iter().map(PaperEntry::from_value).collect()),
        other => Err(PayloadError::NotAnArray {
            found: json_kind(&other),
        }),
    }
}

pub fn parse_entries(json: &str) -> Result<Vec<PaperEntry>, PayloadError> {
    let payload = serde_json::from_str::<Value>(json)?;
    validate_entries(payload)
}

#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
