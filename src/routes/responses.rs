use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::FormResponse;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct TitleParams {
    pub title: String,
}

/// Public submission against a stored schema. The response row carries
/// the schema's title; the body is the label→value map.
pub async fn submit(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let stored = db::schemas::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    if !body.is_object() {
        return Err(AppError::BadRequest(
            "Response body must be a JSON object".to_string(),
        ));
    }

    let response = db::responses::create(&state.pool, stored.title(), &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "created", "response_id": response.id })),
    ))
}

/// All responses whose stored title exactly matches the query title.
pub async fn list_by_title(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<TitleParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rows = db::responses::list_by_title(&state.pool, &params.title).await?;

    let data: Vec<&serde_json::Value> = rows.iter().map(|r| &r.form_data).collect();

    Ok(Json(json!({
        "title": params.title,
        "total": rows.len(),
        "responses": data,
    })))
}

pub async fn export(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<TitleParams>,
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
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.csv\""),
            ),
        ],
        csv,
    ))
}

/// Columns are the keys of the first fetched row; later rows with other
/// keys contribute empty cells for anything missing.
pub fn export_csv(rows: &[FormResponse]) -> String {
    use std::fmt::Write;
    let mut csv = String::new();

    let keys: Vec<String> = rows
        .first()
        .and_then(|r| r.form_data.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();

    let _ = writeln!(csv, "{}", keys.iter().map(|k| csv_escape(k)).collect::<Vec<_>>().join(","));

    for row in rows {
        let line: Vec<String> = keys
            .iter()
            .map(|key| {
                row.form_data
                    .get(key)
                    .map(|v| match v {
                        serde_json::Value::String(s) => csv_escape(s),
                        other => csv_escape(&other.to_string()),
                    })
                    .unwrap_or_default()
            })
            .collect();
        let _ = writeln!(csv, "{}", line.join(","));
    }

    csv
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
