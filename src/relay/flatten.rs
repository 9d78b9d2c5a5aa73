use serde_json::{Map, Value};

/// Flatten a JSON object into a single-level map. Nested objects
/// recurse with their path joined by `_`; everything else (including
/// arrays) is an opaque scalar and passes through untouched.
///
/// `{"a": {"b": 1}}` becomes `{"a_b": 1}`.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    walk(value, "", &mut out);
    out
}

fn walk(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
    let Some(obj) = value.as_object() else {
        return;
    };

    for (key, val) in obj {
        match val {
            Value::Object(_) => walk(val, &format!("{prefix}{key}_"), out),
            other => {
                out.insert(format!("{prefix}{key}"), other.clone());
            }
        }
    }
}

/// Convert a flattened value into something the spreadsheet API will
/// accept as a cell: scalars pass through, anything else becomes its
/// compact JSON text.
pub fn cell_value(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => value.clone(),
        other => Value::String(other.to_string()),
    }
}
