use crate::core::model::Label;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("Label {value} is not a valid number")]
pub struct LabelError {
    pub value: String,
}

impl LabelError {
    fn new(value: &Value) -> Self {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self { value }
    }
}

/// Interprets a stored metadata value as an integer cluster label.
///
/// Integers pass through, finite floats truncate toward zero, booleans map to
/// 0/1 and strings must hold a (possibly signed) decimal integer.
pub fn to_label(value: &Value) -> Result<Label, LabelError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let range = i64::MIN as f64..i64::MAX as f64;
            match n.as_f64().map(f64::trunc) {
                Some(f) if range.contains(&f) => Ok(f as i64),
                _ => Err(LabelError::new(value)),
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => parse_label_str(s).ok_or_else(|| LabelError::new(value)),
        _ => Err(LabelError::new(value)),
    }
}

fn parse_label_str(s: &str) -> Option<Label> {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats() {
        assert_eq!(to_label(&json!(7)).unwrap(), 7);
        assert_eq!(to_label(&json!(-4)).unwrap(), -4);
        assert_eq!(to_label(&json!(2.9)).unwrap(), 2);
        assert_eq!(to_label(&json!(-2.9)).unwrap(), -2);
        assert_eq!(to_label(&json!(true)).unwrap(), 1);
    }

    #[test]
    fn strings() {
        assert_eq!(to_label(&json!("12")).unwrap(), 12);
        assert_eq!(to_label(&json!(" -3 ")).unwrap(), -3);
        assert_eq!(to_label(&json!("+5")).unwrap(), 5);
    }

    #[test]
    fn rejects_non_integers() {
        for bad in [
            json!("abc"),
            json!("1.5"),
            json!(""),
            json!("-"),
            json!(null),
            json!([1]),
            json!({"a": 1}),
            json!("99999999999999999999"),
        ] {
            assert!(to_label(&bad).is_err(), "{bad} should not convert");
        }
        let err = to_label(&json!("abc")).unwrap_err();
        assert_eq!(err.to_string(), "Label abc is not a valid number");
    }
}
