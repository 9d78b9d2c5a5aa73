use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::relay::flatten;
use crate::state::SharedState;

const INVALID_DATA: &str = "Invalid data provided. Ensure 'form_title' is present.";
const SAVE_FAILED: &str = "Failed to save data.";

/// `POST /submit` — relay an arbitrary JSON payload into the
/// spreadsheet tab named by its `form_title` field.
pub async fn submit(
    State(state): State<SharedState>,
    body: Bytes,
) -> (StatusCode, String) {
    let Ok(raw) = serde_json::from_slice::<Value>(&body) else {
        tracing::warn!("Relay received an unparseable body");
        return (StatusCode::BAD_REQUEST, INVALID_DATA.to_string());
    };

    let Some(obj) = raw.as_object() else {
        return (StatusCode::BAD_REQUEST, INVALID_DATA.to_string());
    };

    let tab = match obj.get("form_title").and_then(|t| t.as_str()) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            tracing::warn!("Relay payload missing form_title");
            return (StatusCode::BAD_REQUEST, INVALID_DATA.to_string());
        }
    };

    let Some(sheets) = state.sheets.as_ref() else {
        tracing::error!("Relay request received but no spreadsheet backend is configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED.to_string());
    };

    // form_title selects the tab and never becomes row data.
    let mut data = obj.clone();
    data.remove("form_title");
    let flat = flatten::flatten(&Value::Object(data));

    tracing::debug!("Relaying {} columns into tab {tab}", flat.len());

    match sheets.append_submission(&tab, &flat).await {
        Ok(()) => (StatusCode::OK, format!("Data saved to sheet \"{tab}\".")),
        Err(e) => {
            tracing::error!("Error writing to sheet {tab}: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED.to_string())
        }
    }
}
