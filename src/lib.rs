pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod views;
pub mod form;
pub mod relay;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::middleware::auth_redirect::redirect_unauthorized;
use crate::relay::sheets::SheetsClient;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> Router {
    // Build the spreadsheet client if the relay is configured
    let sheets = config.sheets.as_ref().and_then(|cfg| {
        match SheetsClient::new(cfg) {
            Ok(client) => {
                tracing::info!("Sheets relay configured for spreadsheet {}", cfg.spreadsheet_id);
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("Sheets relay not available: {e}");
                None
            }
        }
    });

    let relay_origin = config.relay_origin.clone();
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        sheets,
    });

    Router::new()
        .merge(routes::api_routes())
        .merge(routes::relay_routes(&relay_origin))
        .merge(views::public_routes())
        .merge(views::operator_routes().layer(axum::middleware::from_fn(redirect_unauthorized)))
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
