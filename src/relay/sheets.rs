use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use crate::config::{CredentialSource, SheetsConfig};

use super::flatten;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Client for the Sheets v4 REST API, authenticated as a service
/// account via the JWT bearer grant.
pub struct SheetsClient {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

enum Credentials {
    ServiceAccount(ServiceAccountKey),
    Static(String),
}

#[derive(Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct GrantClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self, String> {
        let credentials = match &config.credentials {
            CredentialSource::KeyFile(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| format!("Cannot read service account key {}: {e}", path.display()))?;
                let key: ServiceAccountKey = serde_json::from_str(&raw)
                    .map_err(|e| format!("Invalid service account key: {e}"))?;
                Credentials::ServiceAccount(key)
            }
            CredentialSource::StaticToken(token) => Credentials::Static(token.clone()),
        };

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Relay one flattened payload into the tab named `tab`: ensure the
    /// tab exists, write headers if the first row is empty, append the
    /// values as a data row.
    pub async fn append_submission(
        &self,
        tab: &str,
        flat: &Map<String, Value>,
    ) -> Result<(), String> {
        self.ensure_tab(tab).await?;

        let headers: Vec<Value> = flat.keys().map(|k| Value::String(k.clone())).collect();
        let values: Vec<Value> = flat.values().map(flatten::cell_value).collect();

        // Headers come from the first payload only; later payloads with
        // different keys land in whatever columns already exist.
        let existing = self.read_first_row(tab).await?;
        if existing.is_empty() {
            tracing::debug!("Writing header row for tab {tab}");
            self.append_row(&format!("{tab}!A1"), &headers).await?;
        }

        self.append_row(&format!("{tab}!A2"), &values).await
    }

    /// Create the tab if it is not in the spreadsheet's tab list. Not
    /// transactional; a concurrent create for the same new tab can race
    /// and one side fails with the backend's own duplicate error.
    pub async fn ensure_tab(&self, tab: &str) -> Result<(), String> {
        let titles = self.tab_titles().await?;
        if titles.iter().any(|t| t == tab) {
            return Ok(());
        }

        tracing::info!("Creating spreadsheet tab {tab}");
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.api_base, self.spreadsheet_id
        );
        let body = json!({
            "requests": [
                { "addSheet": { "properties": { "title": tab } } }
            ]
        });
        self.post_json(&url, &body).await.map(|_| ())
    }

    async fn tab_titles(&self) -> Result<Vec<String>, String> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties.title",
            self.api_base, self.spreadsheet_id
        );
        let body = self.get_json(&url).await?;

        Ok(body
            .get("sheets")
            .and_then(|s| s.as_array())
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| {
                        s.pointer("/properties/title")
                            .and_then(|t| t.as_str())
                            .map(|t| t.to_string())
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_first_row(&self, tab: &str) -> Result<Vec<Value>, String> {
        let range = encode_segment(&format!("{tab}!A1:Z1"));
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{range}",
            self.api_base, self.spreadsheet_id
        );
        let body = self.get_json(&url).await?;

        Ok(body
            .get("values")
            .and_then(|v| v.as_array())
            .and_then(|rows| rows.first())
            .and_then(|row| row.as_array())
            .cloned()
            .unwrap_or_default())
    }

    async fn append_row(&self, range: &str, row: &[Value]) -> Result<(), String> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=RAW",
            self.api_base,
            self.spreadsheet_id,
            encode_segment(range)
        );
        let body = json!({ "values": [row] });
        self.post_json(&url, &body).await.map(|_| ())
    }

    async fn get_json(&self, url: &str) -> Result<Value, String> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Sheets request failed: {e}"))?;
        Self::parse_response(resp).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, String> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Sheets request failed: {e}"))?;
        Self::parse_response(resp).await
    }

    async fn parse_response(resp: reqwest::Response) -> Result<Value, String> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(512)
                .collect::<String>();
            return Err(format!("Sheets API returned {status}: {body}"));
        }
        resp.json()
            .await
            .map_err(|e| format!("Invalid Sheets API response: {e}"))
    }

    async fn access_token(&self) -> Result<String, String> {
        let key = match &self.credentials {
            Credentials::Static(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key.clone(),
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            // Refresh a minute early so an in-flight request never
            // carries an expired token.
            if token.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(token.token.clone());
            }
        }

        let now = Utc::now();
        let claims = GrantClaims {
            iss: key.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| format!("Invalid service account private key: {e}"))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| format!("Failed to sign token grant: {e}"))?;

        let resp = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| format!("Token exchange failed: {e}"))?;

        let body = Self::parse_response(resp).await?;
        let token = body
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| "Token response missing access_token".to_string())?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(|e| e.as_i64())
            .unwrap_or(3600);

        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + Duration::seconds(expires_in),
        });

        Ok(token)
    }
}

/// Percent-encode a path segment. `!` and `:` stay literal so ranges
/// like `Tab!A1:Z1` remain readable in logs.
fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'!' | b':' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_spaces_in_tab_names() {
        assert_eq!(encode_segment("My Tab!A1:Z1"), "My%20Tab!A1:Z1");
    }

    #[test]
    fn leaves_plain_ranges_alone() {
        assert_eq!(encode_segment("Signups!A1"), "Signups!A1");
    }
}
