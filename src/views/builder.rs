use askama::Template;
use axum::Form;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::form::schema;
use crate::routes::responses::export_csv;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "builder/index.html")]
struct BuilderTemplate {
    user_name: String,
    error: String,
    share_link: String,
    schema_text: String,
    forms: Vec<FormItem>,
    selected_title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

struct FormItem {
    id: String,
    title: String,
}

#[derive(Deserialize)]
pub struct IndexParams {
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateForm {
    pub schema: String,
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub title: String,
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, AppError> {
    let selected_title = params.title.unwrap_or_default();
    let mut template = base_template(&state, auth, &selected_title).await?;
    template.schema_text = String::new();

    if !selected_title.is_empty() && template.rows.is_empty() {
        template.error = "No data found for the selected title".to_string();
    }

    Ok(Html(template.render().unwrap_or_default()))
}

/// Parse the operator's schema text; persist and show the share link,
/// or re-render with the error and persist nothing.
pub async fn generate(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<GenerateForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut template = base_template(&state, auth, "").await?;

    match schema::parse(&form.schema) {
        Ok((value, parsed)) => {
            let id = uuid::Uuid::new_v4();
            let stored = db::schemas::create(&state.pool, id, &value).await?;
            tracing::info!("Created form schema {} ({})", stored.id, parsed.title);

            template.share_link =
                format!("{}/shared-form/{}", state.config.base_url, stored.id);
            template.schema_text = String::new();

            // Refresh the listing so the new form shows up immediately
            template.forms = form_items(&state).await?;
        }
        Err(e) => {
            template.error = e;
            template.schema_text = form.schema;
        }
    }

    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn export(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let rows = db::responses::list_by_title(&state.pool, &params.title).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(
            "No data found for the selected title".to_string(),
        ));
    }

    let csv = export_csv(&rows);
    let filename = params.title.replace('"', "");

    Ok((
        [
            (axum::http::header::CONTENT_TYPE, "text/csv".to_string()),
            (
                axum::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.csv\""),
            ),
        ],
        csv,
    ))
}

async fn base_template(
    state: &SharedState,
    auth: AuthUser,
    selected_title: &str,
) -> Result<BuilderTemplate, AppError> {
    let user_name = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default();

    let forms = form_items(state).await?;

    let (headers, rows) = if selected_title.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let responses = db::responses::list_by_title(&state.pool, selected_title).await?;
        response_table(&responses)
    };

    Ok(BuilderTemplate {
        user_name,
        error: String::new(),
        share_link: String::new(),
        schema_text: String::new(),
        forms,
        selected_title: selected_title.to_string(),
        headers,
        rows,
    })
}

async fn form_items(state: &SharedState) -> Result<Vec<FormItem>, AppError> {
    let forms = db::schemas::list_unique_by_title(&state.pool).await?;
    Ok(forms
        .iter()
        .map(|f| FormItem {
            id: f.id.to_string(),
            title: f.title().to_string(),
        })
        .collect())
}

/// Table columns come from the first fetched row, matching the export.
fn response_table(
    responses: &[crate::models::FormResponse],
) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = responses
        .first()
        .and_then(|r| r.form_data.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();

    let rows = responses
        .iter()
        .map(|r| {
            headers
                .iter()
                .map(|h| {
                    r.form_data
                        .get(h)
                        .map(|v| match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    (headers, rows)
}
