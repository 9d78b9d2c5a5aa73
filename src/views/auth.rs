use askama::Template;
use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::jwt::{Claims, encode_token};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::routes::auth::{auth_cookie, clear_auth_cookie};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    error: String,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    error: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub async fn login_page() -> Html<String> {
    let template = LoginTemplate {
        error: String::new(),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn register_page() -> Html<String> {
    let template = RegisterTemplate {
        error: String::new(),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn login_submit(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = db::users::find_by_email(&state.pool, &form.email).await?;

    let valid = match &user {
        Some(u) => password::verify(&form.password, &u.password_hash).unwrap_or(false),
        None => false,
    };

    if !valid {
        let template = LoginTemplate {
            error: "Invalid email or password".to_string(),
        };
        return Ok(Html(template.render().unwrap_or_default()).into_response());
    }

    let user = user.ok_or_else(|| AppError::Internal("user vanished".to_string()))?;
    let token =
        encode_token(&Claims::new(user.id), &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok((auth_cookie(&token), Redirect::to("/")).into_response())
}

pub async fn register_submit(
    State(state): State<SharedState>,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let error = if form.email.is_empty() || form.password.is_empty() || form.name.is_empty() {
        Some("All fields are required".to_string())
    } else if form.password.len() < 8 {
        Some("Password must be at least 8 characters".to_string())
    } else if db::users::find_by_email(&state.pool, &form.email)
        .await?
        .is_some()
    {
        Some("Email already registered".to_string())
    } else {
        None
    };

    if let Some(error) = error {
        let template = RegisterTemplate { error };
        return Ok(Html(template.render().unwrap_or_default()).into_response());
    }

    let pw_hash = password::hash(&form.password).map_err(AppError::Internal)?;
    let user = db::users::create(&state.pool, &form.email, &pw_hash, &form.name).await?;

    tracing::info!("Registered user {}", user.id);

    let token =
        encode_token(&Claims::new(user.id), &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok((auth_cookie(&token), Redirect::to("/")).into_response())
}

pub async fn logout() -> (CookieJar, Redirect) {
    (clear_auth_cookie(), Redirect::to("/auth/login"))
}
