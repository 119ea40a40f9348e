//! Optional-path helpers over loosely typed JSON payloads.

use serde_json::{Map, Value};

/// Follow a dotted path (`lead.email`) through nested objects.
///
/// Any step that is not an object, or a missing key, yields `None`.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Return the first candidate path that resolves to a non-null value.
pub fn first_present<'a>(value: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|path| lookup(value, path).filter(|found| !found.is_null()))
}

/// Coerce an identifier-like value to an integer.
///
/// Integers pass through, numeric strings are parsed; booleans, floats and
/// everything else are treated as non-matching.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

/// Borrow the object rows of a list-shaped payload, skipping non-objects.
pub fn object_rows(items: &[Value]) -> impl Iterator<Item = &Map<String, Value>> {
    items.iter().filter_map(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_nested_objects() {
        let value = json!({"lead": {"id": 7, "email": "a@x.com"}});
        assert_eq!(lookup(&value, "lead.id"), Some(&json!(7)));
        assert_eq!(lookup(&value, "lead.missing"), None);
        assert_eq!(lookup(&value, "lead.id.deeper"), None);
    }

    #[test]
    fn first_present_skips_nulls() {
        let value = json!({"id": null, "campaign_id": 4});
        assert_eq!(first_present(&value, &["id", "campaign_id"]), Some(&json!(4)));
        assert_eq!(first_present(&value, &["nope"]), None);
    }

    #[test]
    fn coerce_int_rejects_booleans_and_floats() {
        assert_eq!(coerce_int(&json!(3)), Some(3));
        assert_eq!(coerce_int(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_int(&json!("")), None);
        assert_eq!(coerce_int(&json!("x1")), None);
        assert_eq!(coerce_int(&json!(true)), None);
        assert_eq!(coerce_int(&json!(3.0)), None);
        assert_eq!(coerce_int(&Value::Null), None);
    }
}
