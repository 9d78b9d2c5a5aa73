use serde_json::Value;

/// A validated form schema. The raw JSON is what gets persisted; this
/// typed view drives rendering and response collection.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub title: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub required: bool,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Radio,
    Checkbox,
    /// Unknown declared type — rendered as a plain text input.
    Other(String),
}

impl FieldKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "number" => FieldKind::Number,
            "radio" => FieldKind::Radio,
            "checkbox" => FieldKind::Checkbox,
            other => FieldKind::Other(other.to_string()),
        }
    }

    /// The HTML input type used to render this field.
    pub fn input_type(&self) -> &str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Text | FieldKind::Other(_) => "text",
        }
    }

    /// Choice fields render one input per option.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Checkbox)
    }
}

/// Parse operator-entered JSON text into a schema. Returns the parsed
/// JSON (for persistence) alongside the typed view. Nothing is
/// persisted on failure; the message is surfaced inline.
pub fn parse(text: &str) -> Result<(Value, FormSchema), String> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| "Invalid JSON schema".to_string())?;
    let schema = from_value(&value)?;
    Ok((value, schema))
}

/// Validate the shape of a schema JSON value.
pub fn from_value(value: &Value) -> Result<FormSchema, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "Schema must be a JSON object".to_string())?;

    let title = obj
        .get("title")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "Schema needs a non-empty string title".to_string())?
        .to_string();

    let raw_fields = obj
        .get("fields")
        .and_then(|f| f.as_array())
        .ok_or_else(|| "Schema needs a fields array".to_string())?;

    let mut fields = Vec::with_capacity(raw_fields.len());
    for raw in raw_fields {
        fields.push(parse_field(raw)?);
    }

    Ok(FormSchema { title, fields })
}

fn parse_field(raw: &Value) -> Result<Field, String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| "Each field must be a JSON object".to_string())?;

    let label = obj
        .get("label")
        .and_then(|l| l.as_str())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| "Each field needs a non-empty label".to_string())?
        .to_string();

    let kind = FieldKind::parse(
        obj.get("type").and_then(|t| t.as_str()).unwrap_or("text"),
    );

    let placeholder = obj
        .get("placeholder")
        .and_then(|p| p.as_str())
        .map(|p| p.to_string());

    let required = obj
        .get("required")
        .and_then(|r| r.as_bool())
        .unwrap_or(false);

    let options: Vec<String> = obj
        .get("options")
        .and_then(|o| o.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    if kind.is_choice() && options.is_empty() {
        return Err(format!("Field '{label}' needs at least one option"));
    }

    Ok(Field {
        label,
        kind,
        placeholder,
        required,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_schema() {
        let text = r#"{
            "title": "Signup",
            "fields": [
                { "label": "Name", "type": "text", "placeholder": "Your name", "required": true },
                { "label": "Email", "type": "email" },
                { "label": "Toppings", "type": "checkbox", "options": ["Cheese", "Olives"] }
            ]
        }"#;

        let (_, schema) = parse(text).unwrap();
        assert_eq!(schema.title, "Signup");
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[0].kind, FieldKind::Text);
        assert!(schema.fields[0].required);
        assert_eq!(schema.fields[2].options, vec!["Cheese", "Olives"]);
    }

    #[test]
    fn unknown_type_falls_back_to_text_input() {
        let (_, schema) = parse(
            r#"{ "title": "T", "fields": [{ "label": "When", "type": "datetime-local" }] }"#,
        )
        .unwrap();
        assert_eq!(schema.fields[0].kind, FieldKind::Other("datetime-local".into()));
        assert_eq!(schema.fields[0].kind.input_type(), "text");
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let (_, schema) =
            parse(r#"{ "title": "T", "fields": [{ "label": "Name" }] }"#).unwrap();
        assert_eq!(schema.fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse("{ not json").is_err());
    }

    #[test]
    fn rejects_missing_title() {
        assert!(parse(r#"{ "fields": [] }"#).is_err());
        assert!(parse(r#"{ "title": "", "fields": [] }"#).is_err());
    }

    #[test]
    fn rejects_field_without_label() {
        assert!(parse(r#"{ "title": "T", "fields": [{ "type": "text" }] }"#).is_err());
    }

    #[test]
    fn rejects_choice_field_without_options() {
        assert!(parse(r#"{ "title": "T", "fields": [{ "label": "Pick", "type": "radio" }] }"#)
            .is_err());
    }
}
