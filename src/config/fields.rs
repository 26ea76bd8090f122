//! Alias-aware field readers shared by the codecs.

use serde_json::{Map, Value};

/// Returns a copy of `raw` as an object, or an empty object for anything else.
pub(crate) fn object_or_empty(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// First non-null value among `keys`, in priority order.
pub(crate) fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

pub(crate) fn pick_string(obj: &Map<String, Value>, keys: &[&str], default: &str) -> String {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(scalar_to_string)
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn pick_bool(obj: &Map<String, Value>, keys: &[&str], default: bool) -> bool {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// First value among `keys` that is an array.
pub(crate) fn pick_array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(Value::as_array)
}

/// First value among `keys` that is an object.
pub(crate) fn pick_object<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Map<String, Value>> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(Value::as_object)
}

/// Reads a list of strings from the first usable key. Accepts arrays and
/// comma-separated strings.
pub(crate) fn pick_string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::Array(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
            Value::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

/// Strings stay as they are; numbers and booleans are rendered as text.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Removes every key in each of `groups` from `obj`.
pub(crate) fn without_keys(mut obj: Map<String, Value>, groups: &[&[&str]]) -> Map<String, Value> {
    for key in groups.iter().flat_map(|group| group.iter()) {
        obj.remove(*key);
    }
    obj
}
