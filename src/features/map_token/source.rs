use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::core::config::MapConfig;
use crate::features::map_token::dto::MapTokenDto;

/// Error payload of the token endpoint. Both `{ "error": .. }` and the
/// `{ "message": .. }` envelope are understood.
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to fetch map token: {0}")]
    FetchError(String),

    #[error("Map token endpoint answered HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse map token response: {0}")]
    ParseError(String),

    #[error("Map token endpoint returned an empty token")]
    EmptyToken,
}

/// Remote issuer of the credential required by the tile map
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, TokenError>;
}

/// Fetches the map token over HTTP
pub struct HttpTokenSource {
    client: reqwest::Client,
    token_url: String,
}

impl HttpTokenSource {
    pub fn new(token_url: impl Into<String>, timeout: Duration) -> Result<Self, TokenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("TerritoryPortal/0.1 (map-token)")
            .build()
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        Ok(Self {
            client,
            token_url: token_url.into(),
        })
    }

    pub fn from_config(config: &MapConfig) -> Result<Self, TokenError> {
        Self::new(config.token_url.clone(), config.token_timeout)
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        tracing::debug!("Fetching map token from {}", self.token_url);

        let response = self
            .client
            .get(&self.token_url)
            .send()
            .await
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let payload: MapTokenDto = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        if payload.token.trim().is_empty() {
            return Err(TokenError::EmptyToken);
        }

        tracing::info!("Fetched map token from {}", self.token_url);
        Ok(payload.token)
    }
}

fn error_message(body: &str) -> String {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    payload
        .error
        .or(payload.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}
