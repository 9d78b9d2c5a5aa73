use axum::Json;
use axum::extract::{Path, State};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::form::schema;
use crate::models::StoredSchema;
use crate::state::SharedState;

/// Persist a new form schema under a fresh share id. The body is the
/// schema JSON itself; shape failures reject without persisting.
pub async fn create(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let parsed = schema::from_value(&body).map_err(AppError::BadRequest)?;

    let id = Uuid::new_v4();
    let stored = db::schemas::create(&state.pool, id, &body).await?;

    tracing::info!("Created form schema {} ({})", stored.id, parsed.title);

    Ok(Json(json!({
        "id": stored.id,
        "title": parsed.title,
        "share_url": format!("{}/shared-form/{}", state.config.base_url, stored.id),
    })))
}

/// List stored schemas deduplicated by title, first-seen wins.
pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let forms = db::schemas::list_unique_by_title(&state.pool).await?;

    let items: Vec<serde_json::Value> = forms
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "title": f.title(),
                "created_at": f.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "forms": items })))
}

/// Public lookup — shared-link visitors fetch the schema by id.
pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredSchema>, AppError> {
    let stored = db::schemas::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(stored))
}
