use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub relay_origin: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub sheets: Option<SheetsConfig>,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub credentials: CredentialSource,
    pub api_base: String,
}

/// Where the Sheets access token comes from. Production uses a service
/// account key file; tests inject a fixed token.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    KeyFile(PathBuf),
    StaticToken(String),
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("FORMRELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_HOST: {e}"))?;

        let port: u16 = env_or("FORMRELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_PORT: {e}"))?;

        let base_url = env_or("FORMRELAY_BASE_URL", &format!("http://{host}:{port}"));

        // The relay answers cross-origin requests from exactly one origin.
        let relay_origin = env_or("FORMRELAY_RELAY_ORIGIN", "http://localhost:3000");

        let max_body_size: usize = env_or("FORMRELAY_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("FORMRELAY_LOG_LEVEL", "info");

        let sheets = match (
            std::env::var("FORMRELAY_SPREADSHEET_ID").ok(),
            std::env::var("FORMRELAY_SHEETS_CREDENTIALS").ok(),
        ) {
            (Some(spreadsheet_id), Some(key_file)) => Some(SheetsConfig {
                spreadsheet_id,
                credentials: CredentialSource::KeyFile(PathBuf::from(key_file)),
                api_base: env_or("FORMRELAY_SHEETS_API_BASE", "https://sheets.googleapis.com"),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            relay_origin,
            max_body_size,
            log_level,
            sheets,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
