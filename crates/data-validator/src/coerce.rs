//! Loose value coercion

use crate::error::ValidationError;
use serde_json::Value;

/// Coerce a loosely-typed value into an optional number
///
/// `null` and empty (or whitespace-only) strings are absent. Numbers and
/// strings holding a number are accepted. Anything else present is rejected.
pub fn optional_number(field: &'static str, value: &Value) -> Result<Option<f64>, ValidationError> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::NotNumeric {
            field,
            value: n.to_string(),
        })?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| ValidationError::NotNumeric {
                    field,
                    value: format!("{s:?}"),
                })?
        }
        other => {
            return Err(ValidationError::NotNumeric {
                field,
                value: other.to_string(),
            })
        }
    };

    if !number.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }

    Ok(Some(number))
}

/// Require a non-blank string, returning it unchanged
pub fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}
