//! In-process stand-in for the Sheets v4 REST API, recording tabs and
//! rows so relay tests can assert on what was written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

pub const SPREADSHEET_ID: &str = "test-spreadsheet";

/// tab title -> rows, each row a list of cell values.
pub type SheetsState = Arc<Mutex<HashMap<String, Vec<Vec<Value>>>>>;

pub struct MockSheets {
    pub base_url: String,
    pub state: SheetsState,
}

impl MockSheets {
    pub fn tabs(&self) -> Vec<String> {
        self.state.lock().unwrap().keys().cloned().collect()
    }

    pub fn rows(&self, tab: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .unwrap()
            .get(tab)
            .cloned()
            .unwrap_or_default()
    }
}

pub async fn spawn() -> MockSheets {
    let state: SheetsState = Arc::new(Mutex::new(HashMap::new()));

    let app = axum::Router::new()
        .route("/v4/spreadsheets/{seg}", get(get_spreadsheet).post(batch_update))
        .route("/v4/spreadsheets/{id}/values/{seg}", get(read_range).post(append_range))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock sheets server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock sheets server failed");
    });

    MockSheets {
        base_url: format!("http://{addr}"),
        state,
    }
}

async fn get_spreadsheet(State(state): State<SheetsState>, Path(seg): Path<String>) -> Response {
    if seg != SPREADSHEET_ID {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "unknown spreadsheet"})))
            .into_response();
    }

    let tabs = state.lock().unwrap();
    let sheets: Vec<Value> = tabs
        .keys()
        .map(|title| json!({ "properties": { "title": title } }))
        .collect();

    Json(json!({ "sheets": sheets })).into_response()
}

async fn batch_update(
    State(state): State<SheetsState>,
    Path(seg): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if seg != format!("{SPREADSHEET_ID}:batchUpdate") {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "bad path"}))).into_response();
    }

    let Some(title) = body
        .pointer("/requests/0/addSheet/properties/title")
        .and_then(|t| t.as_str())
    else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "no addSheet request"})))
            .into_response();
    };

    let mut tabs = state.lock().unwrap();
    if tabs.contains_key(title) {
        // Google rejects duplicate tab titles
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("A sheet with the name \"{title}\" already exists")})),
        )
            .into_response();
    }

    tabs.insert(title.to_string(), Vec::new());
    Json(json!({ "replies": [{ "addSheet": { "properties": { "title": title } } }] }))
        .into_response()
}

async fn read_range(
    State(state): State<SheetsState>,
    Path((_, range)): Path<(String, String)>,
) -> Response {
    let Some(tab) = range.split('!').next() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad range"}))).into_response();
    };

    let tabs = state.lock().unwrap();
    let Some(rows) = tabs.get(tab) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "unknown tab"}))).into_response();
    };

    match rows.first() {
        Some(first) => Json(json!({ "range": range, "values": [first] })).into_response(),
        None => Json(json!({ "range": range })).into_response(),
    }
}

async fn append_range(
    State(state): State<SheetsState>,
    Path((_, seg)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(range) = seg.strip_suffix(":append") else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "bad path"}))).into_response();
    };
    let Some(tab) = range.split('!').next() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad range"}))).into_response();
    };

    let new_rows: Vec<Vec<Value>> = body
        .get("values")
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .map(|row| row.as_array().cloned().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let mut tabs = state.lock().unwrap();
    let Some(rows) = tabs.get_mut(tab) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "unknown tab"}))).into_response();
    };

    rows.extend(new_rows);
    Json(json!({ "updates": { "updatedRows": 1 } })).into_response()
}
