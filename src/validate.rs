// Schema validation for model-returned date JSON.
// Applied between parse_response_json() and DateCollection construction.
// A hand-rolled walk instead of serde derive so every violation carries
// the JSON path it happened at.

use serde_json::Value;
use thiserror::Error;

use crate::types::{DateCollection, DateRecord};

/// A structural violation of the date-collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("missing required field '{field}' at {path}")]
    MissingField { path: String, field: &'static str },

    #[error("expected {expected} at {path}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Validate a parsed model reply against the date-collection schema.
///
/// The root must be an object with a `dates` array of objects, each
/// carrying integer `day`, `month` and `year`. Unknown keys are ignored,
/// no type coercion is performed, and the integers are taken verbatim
/// (calendar plausibility is out of scope here). Record order in the
/// output follows array order in the input.
pub fn validate_date_collection(value: &Value) -> Result<DateCollection, SchemaViolation> {
    let root = value.as_object().ok_or_else(|| SchemaViolation::TypeMismatch {
        path: "$".into(),
        expected: "object",
        found: json_type_name(value),
    })?;

    let dates_value = root.get("dates").ok_or_else(|| SchemaViolation::MissingField {
        path: "$".into(),
        field: "dates",
    })?;

    let items = dates_value
        .as_array()
        .ok_or_else(|| SchemaViolation::TypeMismatch {
            path: "dates".into(),
            expected: "array",
            found: json_type_name(dates_value),
        })?;

    let mut dates = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        dates.push(validate_date_record(item, index)?);
    }

    Ok(DateCollection { dates })
}

/// Validate one element of the `dates` array.
fn validate_date_record(item: &Value, index: usize) -> Result<DateRecord, SchemaViolation> {
    let record = item.as_object().ok_or_else(|| SchemaViolation::TypeMismatch {
        path: format!("dates[{index}]"),
        expected: "object",
        found: json_type_name(item),
    })?;

    let int_field = |field: &'static str| -> Result<i64, SchemaViolation> {
        let value = record.get(field).ok_or_else(|| SchemaViolation::MissingField {
            path: format!("dates[{index}]"),
            field,
        })?;
        value.as_i64().ok_or_else(|| SchemaViolation::TypeMismatch {
            path: format!("dates[{index}].{field}"),
            expected: "integer",
            found: json_type_name(value),
        })
    };

    Ok(DateRecord {
        day: int_field("day")?,
        month: int_field("month")?,
        year: int_field("year")?,
    })
}

/// JSON type name for violation messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
