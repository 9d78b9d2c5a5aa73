pub mod auth;
pub mod forms;
pub mod relay;
pub mod responses;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Form schemas
        .route("/api/v1/forms", get(forms::list).post(forms::create))
        .route("/api/v1/forms/{id}", get(forms::get))
        // Responses
        .route("/api/v1/forms/{id}/responses", post(responses::submit))
        .route("/api/v1/responses", get(responses::list_by_title))
        .route("/api/v1/responses/export", get(responses::export))
}

/// The spreadsheet relay. Independent of the form store; cross-origin
/// access is limited to the single configured origin.
pub fn relay_routes(origin: &str) -> Router<SharedState> {
    let allow_origin = origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/submit", post(relay::submit))
        .layer(cors)
}
