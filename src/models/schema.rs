use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted form schema, keyed by the share id embedded in the
/// public link. The schema column holds the operator's JSON as parsed.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct StoredSchema {
    pub id: Uuid,
    pub schema: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl StoredSchema {
    /// Title as stored in the schema JSON. Rows only ever hold schemas
    /// that passed validation, so a missing title means a bug upstream.
    pub fn title(&self) -> &str {
        self.schema
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("")
    }
}
