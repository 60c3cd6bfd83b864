//! Response field extraction and type coercion.

use serde_json::{Number, Value};

use refresh_engine::ProviderError;

use crate::config::FieldType;

/// Follow a dotted path. Numeric segments index arrays.
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(body, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Coerce an extracted value to the declared field type.
///
/// Strings holding a number or boolean are parsed; numbers and booleans
/// are stringified for `string` fields.
pub fn coerce(field: &str, value: &Value, field_type: FieldType) -> Result<Value, ProviderError> {
    let mismatch = || {
        ProviderError::Response(format!(
            "field '{field}': cannot convert {value} to {field_type:?}"
        ))
    };

    match (field_type, value) {
        (FieldType::String, Value::String(_)) => Ok(value.clone()),
        (FieldType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (FieldType::Integer, Value::Number(n)) => integer(n).ok_or_else(mismatch),
        (FieldType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| mismatch()),

        (FieldType::Number, Value::Number(_)) => Ok(value.clone()),
        (FieldType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(mismatch),

        (FieldType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (FieldType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },

        (FieldType::Object, Value::Object(_)) => Ok(value.clone()),

        _ => Err(mismatch()),
    }
}

fn integer(n: &Number) -> Option<Value> {
    if n.is_i64() || n.is_u64() {
        return Some(Value::Number(n.clone()));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(Value::from(f as i64))
        }
        _ => None,
    }
}
