use askama::Template;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::form::{collect, schema};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "form/show.html")]
struct FormTemplate {
    title: String,
    fields: Vec<FieldView>,
}

struct FieldView {
    label: String,
    input_type: String,
    is_choice: bool,
    options: Vec<String>,
    placeholder: String,
    required: bool,
}

#[derive(Template)]
#[template(path = "form/submitted.html")]
struct SubmittedTemplate {
    title: String,
}

#[derive(Template)]
#[template(path = "form/missing.html")]
struct MissingTemplate {}

/// Render the shared form for respondents.
pub async fn show(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(stored) = db::schemas::find_by_id(&state.pool, id).await? else {
        return Ok(missing_page());
    };

    let parsed = schema::from_value(&stored.schema)
        .map_err(|e| AppError::Internal(format!("Stored schema {id} is invalid: {e}")))?;

    let template = FormTemplate {
        title: parsed.title.clone(),
        fields: parsed.fields.iter().map(field_view).collect(),
    };
    Ok(Html(template.render().unwrap_or_default()).into_response())
}

/// Store one response row and show the terminal submitted page.
pub async fn submit(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, AppError> {
    let Some(stored) = db::schemas::find_by_id(&state.pool, id).await? else {
        return Ok(missing_page());
    };

    let parsed = schema::from_value(&stored.schema)
        .map_err(|e| AppError::Internal(format!("Stored schema {id} is invalid: {e}")))?;

    let form_data = collect::collect(&parsed, &body);
    db::responses::create(
        &state.pool,
        &parsed.title,
        &serde_json::Value::Object(form_data),
    )
    .await?;

    let template = SubmittedTemplate {
        title: parsed.title,
    };
    Ok(Html(template.render().unwrap_or_default()).into_response())
}

fn field_view(field: &schema::Field) -> FieldView {
    FieldView {
        label: field.label.clone(),
        input_type: field.kind.input_type().to_string(),
        is_choice: field.kind.is_choice(),
        options: field.options.clone(),
        placeholder: field.placeholder.clone().unwrap_or_default(),
        required: field.required,
    }
}

fn missing_page() -> Response {
    let template = MissingTemplate {};
    (
        StatusCode::NOT_FOUND,
        Html(template.render().unwrap_or_default()),
    )
        .into_response()
}
