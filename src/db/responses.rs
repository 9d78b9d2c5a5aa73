use sqlx::PgPool;

use crate::models::FormResponse;

pub async fn create(
    pool: &PgPool,
    title: &str,
    form_data: &serde_json::Value,
) -> Result<FormResponse, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(
        "INSERT INTO form_responses (title, form_data) VALUES ($1, $2) RETURNING *",
    )
    .bind(title)
    .bind(form_data)
    .fetch_one(pool)
    .await
}

/// Exact, case-sensitive title match, in insertion order.
pub async fn list_by_title(pool: &PgPool, title: &str) -> Result<Vec<FormResponse>, sqlx::Error> {
    sqlx::query_as::<_, FormResponse>(
        "SELECT * FROM form_responses WHERE title = $1 ORDER BY created_at ASC",
    )
    .bind(title)
    .fetch_all(pool)
    .await
}
