//! # API Gateway
//!
//! Builds authenticated requests against the configured base URL and decodes
//! every response into an [`ApiResult`]. All resource operations go through
//! [`ApiGateway::request`].

use crate::auth::TokenAuthority;
use crate::clock::Clock;
use crate::config::PayPalConfig;
use paypal_core::{ApiResult, PayPalError, PayPalResult, RemoteError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

// ===== Request Builder =====

/// One call against the PayPal API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Add a caller header. `Authorization` and `Content-Type` are always
    /// overridden by the gateway.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> PayPalResult<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Use an already-encoded JSON document as the body, sent byte-for-byte
    pub fn raw_json(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Deadline for the whole call, token acquisition included
    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.timeout = Some(deadline);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

// ===== Gateway =====

/// Authenticated HTTP access to one PayPal environment
#[derive(Debug)]
pub struct ApiGateway {
    http: Client,
    config: PayPalConfig,
    auth: TokenAuthority,
}

impl ApiGateway {
    pub fn new(config: PayPalConfig, clock: Arc<dyn Clock>) -> PayPalResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PayPalError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let auth = TokenAuthority::new(http.clone(), &config, clock);

        Ok(Self { http, config, auth })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    pub fn token_authority(&self) -> &TokenAuthority {
        &self.auth
    }

    /// Issue `request` and decode the response as `T`.
    ///
    /// Structured PayPal errors come back as `Ok(ApiResult::RemoteError)`;
    /// `Err` is reserved for failures that never produced a usable response.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> PayPalResult<ApiResult<T>> {
        let deadline = request.timeout;
        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.execute(request))
                .await
                .map_err(|_| {
                    warn!(?deadline, "PayPal call exceeded its deadline");
                    PayPalError::Timeout(deadline)
                })?,
            None => self.execute(request).await,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> PayPalResult<ApiResult<T>> {
        let token = self.auth.access_token().await?;

        let headers = build_headers(&request.headers, &token, request.body.is_some())?;

        let url = format!("{}{}", self.config.api_base_url, request.path);
        debug!(url = %url, "Sending PayPal request");

        let mut builder = self.http.request(request.method, &url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PayPalError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PayPalError::Transport(e.to_string()))?;

        // A rejected bearer token must not be served from cache again
        if status == StatusCode::UNAUTHORIZED {
            self.auth.invalidate().await;
        }

        decode_response(status, &body)
    }
}

/// Caller headers in order, repeats kept, then the gateway's own
/// `Authorization` and `Content-Type` replacing any caller values.
fn build_headers(
    caller: &[(String, String)],
    token: &str,
    has_body: bool,
) -> PayPalResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in caller {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PayPalError::InvalidRequest(format!("header {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            PayPalError::InvalidRequest(format!("header {:?} value: {}", name, e))
        })?;
        headers.append(name, value);
    }

    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| PayPalError::Serialization(format!("access token: {}", e)))?;
    headers.insert(AUTHORIZATION, bearer);
    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(headers)
}

/// Map a status and body onto the typed result.
fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> PayPalResult<ApiResult<T>> {
    let trimmed = body.trim();
    let json: Value = if trimmed.is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(trimmed) {
            Ok(json) => json,
            Err(_) if !status.is_success() => {
                error!(status = status.as_u16(), "PayPal returned a non-JSON error body");
                return Err(PayPalError::UnexpectedResponse {
                    status: status.as_u16(),
                    body: body.to_string(),
                });
            }
            Err(e) => {
                return Err(PayPalError::Serialization(format!(
                    "Response body is not JSON: {}",
                    e
                )))
            }
        }
    };

    if RemoteError::is_error_shape(&json) {
        let remote = RemoteError::from_error_body(json, status.as_u16());
        warn!(
            status = remote.status,
            name = %remote.name,
            debug_id = %remote.debug_id,
            "PayPal API returned an error"
        );
        return Ok(ApiResult::RemoteError(remote));
    }

    if !status.is_success() {
        if let Some(remote) = RemoteError::from_oauth_body(&json, status.as_u16()) {
            warn!(status = remote.status, name = %remote.name, "PayPal API rejected the request");
            return Ok(ApiResult::RemoteError(remote));
        }

        error!(status = status.as_u16(), "PayPal error body has no recognizable shape");
        return Err(PayPalError::UnexpectedResponse {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let value = serde_json::from_value(json).map_err(|e| {
        PayPalError::Serialization(format!("Failed to decode PayPal response: {}", e))
    })?;

    Ok(ApiResult::Success(value))
}
