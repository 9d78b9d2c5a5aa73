#![allow(dead_code)]

pub mod sheets_mock;

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use formrelay::config::{Config, CredentialSource, SheetsConfig};

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register a default operator, return the access token.
    pub async fn operator(&self) -> String {
        let (body, status) = self
            .register("operator@test.com", "password123", "Operator")
            .await;
        assert_eq!(status, StatusCode::OK, "operator register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Create a form schema, return the response JSON (id, title, share_url).
    pub async fn create_form(&self, token: &str, schema: &Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/v1/forms"))
            .bearer_auth(token)
            .json(schema)
            .send()
            .await
            .expect("create form failed");
        assert_eq!(resp.status(), StatusCode::OK, "create form non-200");
        resp.json().await.unwrap()
    }

    /// Submit a response to a form via the JSON API.
    pub async fn submit_response(&self, form_id: &str, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(&format!("/api/v1/forms/{form_id}/responses")))
            .json(data)
            .send()
            .await
            .expect("submit response failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST a urlencoded body to a shared form page.
    pub async fn submit_shared_form(
        &self,
        form_id: &str,
        data: &[(&str, &str)],
    ) -> (String, StatusCode) {
        let resp = self
            .client
            .post(self.url(&format!("/shared-form/{form_id}")))
            .form(data)
            .send()
            .await
            .expect("shared form submit failed");
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (body, status)
    }

    /// POST a JSON payload to the relay endpoint, return plain-text body + status.
    pub async fn submit_relay(&self, payload: &Value) -> (String, StatusCode) {
        let resp = self
            .client
            .post(self.url("/submit"))
            .json(payload)
            .send()
            .await
            .expect("relay submit failed");
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn a test app without a spreadsheet backend.
pub async fn spawn_app() -> TestApp {
    spawn_app_inner(None).await
}

/// Spawn a test app whose relay talks to a mock Sheets server.
pub async fn spawn_app_with_sheets(api_base: &str) -> TestApp {
    spawn_app_inner(Some(SheetsConfig {
        spreadsheet_id: sheets_mock::SPREADSHEET_ID.to_string(),
        credentials: CredentialSource::StaticToken("test-token".to_string()),
        api_base: api_base.to_string(),
    }))
    .await
}

async fn spawn_app_inner(sheets: Option<SheetsConfig>) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "formrelay_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        base_url: "http://localhost:0".to_string(),
        relay_origin: "http://relay-client.test".to_string(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        sheets,
    };

    let app = formrelay::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
