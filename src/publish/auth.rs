use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::config::PublishConfig;
use crate::foundation::error::{ReelError, ReelResult};

/// Seconds before nominal expiry at which a token is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth2 token response, stamped with the time it was saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub saved_at: i64,
}

impl TokenData {
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        now_unix > self.saved_at + self.expires_in - EXPIRY_MARGIN_SECS
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Plain JSON token file.
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ReelResult<Option<TokenData>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read token file '{}'", self.path.display()))?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Stamp `saved_at` with the current time and write the file.
    pub fn save(&self, token: &mut TokenData) -> ReelResult<()> {
        token.saved_at = chrono::Utc::now().timestamp();
        let json = serde_json::to_vec_pretty(token)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write token file '{}'", self.path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

/// Parse a token endpoint body, turning an `error` field into an adapter error.
pub fn parse_token_response(body: &str) -> ReelResult<TokenData> {
    let resp: TokenResponse = serde_json::from_str(body)?;
    if let Some(error) = resp.error.filter(|e| !e.is_empty()) {
        return Err(ReelError::adapter(
            "oauth",
            format!(
                "{error}: {}",
                resp.error_description.unwrap_or_default()
            ),
        ));
    }
    Ok(serde_json::from_value(serde_json::Value::Object(resp.rest))?)
}

/// Authorization-code exchange and refresh against the token endpoint.
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_key: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn from_config(http: reqwest::Client, cfg: &PublishConfig) -> Self {
        Self {
            http,
            token_url: cfg.token_url.clone(),
            client_key: cfg.client_key.clone(),
            client_secret: cfg.client_secret.clone(),
            redirect_uri: cfg.redirect_uri.clone(),
        }
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> ReelResult<TokenData> {
        if self.client_key.is_empty() || self.client_secret.is_empty() {
            return Err(ReelError::precondition(
                "publish.client_key and publish.client_secret must be configured",
            ));
        }
        let resp = self.http.post(&self.token_url).form(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ReelError::adapter(
                "oauth",
                format!("token endpoint returned HTTP {status}: {}", body.trim()),
            ));
        }
        parse_token_response(&body)
    }

    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> ReelResult<TokenData> {
        self.post_form(&[
            ("client_key", self.client_key.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> ReelResult<TokenData> {
        self.post_form(&[
            ("client_key", self.client_key.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// Stored token, refreshed and re-saved when expired.
    pub async fn fresh_token(&self, store: &TokenStore) -> ReelResult<TokenData> {
        let Some(token) = store.load()? else {
            return Err(ReelError::precondition(format!(
                "no token at '{}'; run `lyricreel auth <code>` first",
                store.path().display()
            )));
        };
        if !token.is_expired() {
            return Ok(token);
        }
        tracing::info!("access token expired, refreshing");
        let mut refreshed = self.refresh_token(&token.refresh_token).await?;
        store.save(&mut refreshed)?;
        Ok(refreshed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/auth.rs"]
mod tests;
