use serde_json::{Map, Value};

use super::schema::{FieldKind, FormSchema};

/// Collect a urlencoded form post into a label→value response map.
///
/// Checkbox fields accumulate every checked option into an array and
/// are omitted entirely when nothing is checked. Every other field
/// takes its last submitted value; fields absent from the post are
/// omitted.
pub fn collect(schema: &FormSchema, body: &[u8]) -> Map<String, Value> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut form_data = Map::new();

    for field in &schema.fields {
        let values: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k == &field.label)
            .map(|(_, v)| v.as_str())
            .collect();

        if values.is_empty() {
            continue;
        }

        if field.kind == FieldKind::Checkbox {
            form_data.insert(
                field.label.clone(),
                Value::Array(values.iter().map(|v| Value::String(v.to_string())).collect()),
            );
        } else {
            // Single-valued input; the last occurrence wins.
            let last = values[values.len() - 1];
            form_data.insert(field.label.clone(), Value::String(last.to_string()));
        }
    }

    form_data
}
