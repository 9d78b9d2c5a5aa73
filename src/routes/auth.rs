use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{Claims, encode_token};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn auth_cookie(access_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build();

    CookieJar::new().add(access)
}

pub fn clear_auth_cookie() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access)
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if db::users::find_by_email(&state.pool, &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let user = db::users::create(&state.pool, &req.email, &pw_hash, &req.name).await?;

    tracing::info!("Registered user {}", user.id);

    let claims = Claims::new(user.id);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok((auth_cookie(&access_token), Json(AuthResponse { access_token })))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let user = db::users::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid =
        password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = Claims::new(user.id);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok((auth_cookie(&access_token), Json(AuthResponse { access_token })))
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    (
        clear_auth_cookie(),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
