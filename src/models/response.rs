use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct FormResponse {
    pub id: Uuid,
    pub title: String,
    pub form_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
