use sqlx::PgPool;
use uuid::Uuid;

use crate::models::StoredSchema;

pub async fn create(
    pool: &PgPool,
    id: Uuid,
    schema: &serde_json::Value,
) -> Result<StoredSchema, sqlx::Error> {
    sqlx::query_as::<_, StoredSchema>(
        "INSERT INTO form_schemas (id, schema) VALUES ($1, $2) RETURNING *",
    )
    .bind(id)
    .bind(schema)
    .fetch_one(pool)
    .await
}

/// Public lookup — used by the shared-form pages, no auth.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<StoredSchema>, sqlx::Error> {
    sqlx::query_as::<_, StoredSchema>("SELECT * FROM form_schemas WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All schemas, oldest first, so the first-seen schema wins when the
/// caller deduplicates by title.
pub async fn list(pool: &PgPool) -> Result<Vec<StoredSchema>, sqlx::Error> {
    sqlx::query_as::<_, StoredSchema>("SELECT * FROM form_schemas ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

/// All schemas, deduplicated by title, first-seen wins.
pub async fn list_unique_by_title(pool: &PgPool) -> Result<Vec<StoredSchema>, sqlx::Error> {
    let all = list(pool).await?;
    let mut seen = std::collections::HashSet::new();
    Ok(all
        .into_iter()
        .filter(|s| seen.insert(s.title().to_string()))
        .collect())
}
