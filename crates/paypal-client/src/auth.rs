//! # OAuth Token Authority
//!
//! Client-credentials token acquisition and caching.
//!
//! The cached token is the only shared mutable state in the client. It sits
//! behind an async mutex that is held across a refresh, so concurrent callers
//! that miss the cache wait for one in-flight fetch instead of each issuing
//! their own.

use crate::clock::Clock;
use crate::config::PayPalConfig;
use chrono::{DateTime, Utc};
use paypal_core::{PayPalError, PayPalResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// A bearer token and the instant it stops being valid
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
    pub app_id: Option<String>,
}

impl AccessToken {
    /// Valid while its expiry is strictly after `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Owns token acquisition for one credential set.
pub struct TokenAuthority {
    http: Client,
    token_url: String,
    client_id: String,
    secret: String,
    refresh_margin: chrono::Duration,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenAuthority {
    pub fn new(http: Client, config: &PayPalConfig, clock: Arc<dyn Clock>) -> Self {
        let refresh_margin = chrono::Duration::from_std(config.token_refresh_margin)
            .unwrap_or_else(|_| chrono::Duration::zero());

        Self {
            http,
            token_url: format!("{}{}", config.api_base_url, TOKEN_PATH),
            client_id: config.client_id.clone(),
            secret: config.secret.clone(),
            refresh_margin,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return a currently valid bearer token, fetching one only on a miss.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> PayPalResult<String> {
        let mut cached = self.cached.lock().await;

        let now = self.clock.now();
        if let Some(token) = cached.as_ref() {
            let horizon = now
                .checked_add_signed(self.refresh_margin)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if token.is_valid_at(horizon) {
                debug!("Using cached PayPal access token");
                return Ok(token.value.clone());
            }
            debug!(expired_at = %token.expires_at, "Cached PayPal access token expired");
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    /// Expiry of the cached token, if one is cached
    pub async fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cached.lock().await.as_ref().map(|token| token.expires_at)
    }

    /// Drop the cached token so the next call fetches a new one
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch_token(&self) -> PayPalResult<AccessToken> {
        debug!("Requesting PayPal access token");

        let response = self
            .http
            .post(&self.token_url)
            .query(&[("grant_type", "client_credentials")])
            .basic_auth(&self.client_id, Some(&self.secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| PayPalError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PayPalError::Transport(e.to_string()))?;

        // Expiry is measured from when the response arrived
        let received_at = self.clock.now();
        let token = parse_token_response(status.as_u16(), &body, received_at)?;

        info!(expires_at = %token.expires_at, "Obtained PayPal access token");
        Ok(token)
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Decide whether a token endpoint response is a usable token.
///
/// A token is accepted only from a 2xx response that carries `access_token`
/// and no `error` field.
fn parse_token_response(
    status: u16,
    body: &str,
    received_at: DateTime<Utc>,
) -> PayPalResult<AccessToken> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) if !(200..300).contains(&status) => {
            warn!(status, "PayPal token endpoint returned a non-JSON error");
            return Err(PayPalError::Authentication {
                error: format!("http_{}", status),
                description: body.chars().take(200).collect(),
            });
        }
        Err(e) => {
            return Err(PayPalError::Serialization(format!(
                "Failed to parse token response: {}",
                e
            )))
        }
    };

    if let Some(error) = json.get("error") {
        let error = error.as_str().unwrap_or("unknown_error").to_string();
        let description = json
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        warn!(status, error = %error, "PayPal rejected the client credentials");
        return Err(PayPalError::Authentication { error, description });
    }

    if !(200..300).contains(&status) {
        warn!(status, "PayPal token endpoint returned an error status");
        return Err(PayPalError::Authentication {
            error: format!("http_{}", status),
            description: "token endpoint returned a non-success status".to_string(),
        });
    }

    let value = json
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| PayPalError::Authentication {
            error: "missing_access_token".to_string(),
            description: "token response did not contain access_token".to_string(),
        })?
        .to_string();

    let expires_in = json
        .get("expires_in")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            PayPalError::Serialization("token response did not contain expires_in".to_string())
        })?;

    let expires_at = chrono::Duration::try_seconds(expires_in)
        .and_then(|lifetime| received_at.checked_add_signed(lifetime))
        .ok_or_else(|| {
            PayPalError::Serialization(format!("expires_in out of range: {}", expires_in))
        })?;

    Ok(AccessToken {
        value,
        expires_at,
        scope: json.get("scope").and_then(Value::as_str).map(String::from),
        app_id: json.get("app_id").and_then(Value::as_str).map(String::from),
    })
}
