// Path lookups into raw JSON payloads. Absent keys and type mismatches
// both read as `None`.

use serde_json::Value;

/// Stand-in for a missing payload.
pub(crate) static NULL: Value = Value::Null;

pub(crate) fn at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(data, |node, key| node.get(*key))
}

pub(crate) fn str_at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(data, path).and_then(Value::as_str)
}

pub(crate) fn bool_at(data: &Value, path: &[&str]) -> Option<bool> {
    at(data, path).and_then(Value::as_bool)
}

pub(crate) fn i64_at(data: &Value, path: &[&str]) -> Option<i64> {
    at(data, path).and_then(Value::as_i64)
}

pub(crate) fn u64_at(data: &Value, path: &[&str]) -> Option<u64> {
    at(data, path).and_then(Value::as_u64)
}

pub(crate) fn f64_at(data: &Value, path: &[&str]) -> Option<f64> {
    at(data, path).and_then(Value::as_f64)
}

/// Array at `path`, or an empty slice.
pub(crate) fn list_at<'a>(data: &'a Value, path: &[&str]) -> &'a [Value] {
    at(data, path)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Non-empty string at `path`.
pub(crate) fn text_at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a str> {
    str_at(data, path).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookups() {
        let data = json!({ "a": { "b": { "c": 3, "s": "x", "e": "" }, "l": [1, 2] } });
        assert_eq!(u64_at(&data, &["a", "b", "c"]), Some(3));
        assert_eq!(str_at(&data, &["a", "b", "s"]), Some("x"));
        assert_eq!(text_at(&data, &["a", "b", "e"]), None);
        assert_eq!(bool_at(&data, &["a", "b", "c"]), None);
        assert_eq!(list_at(&data, &["a", "l"]).len(), 2);
        assert!(list_at(&data, &["a", "missing"]).is_empty());
        assert!(at(&data, &["a", "b", "c", "deeper"]).is_none());
    }
}
