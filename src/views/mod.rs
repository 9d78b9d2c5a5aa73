pub mod auth;
pub mod builder;
pub mod form;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

/// Pages reachable by respondents via shared links. No auth.
pub fn public_routes() -> Router<SharedState> {
    Router::new().route("/shared-form/{id}", get(form::show).post(form::submit))
}

/// Operator pages. Wrapped by the auth-redirect middleware in lib.rs.
pub fn operator_routes() -> Router<SharedState> {
    Router::new()
        // Builder
        .route("/", get(builder::index))
        .route("/forms", post(builder::generate))
        .route("/forms/export", get(builder::export))
        // Auth pages
        .route("/auth/login", get(auth::login_page).post(auth::login_submit))
        .route(
            "/auth/register",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/auth/logout", post(auth::logout))
}
