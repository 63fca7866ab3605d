//! # Request Handlers
//!
//! Axum request handlers for the PayPal gateway.
//! Remote PayPal errors are relayed with their original status and body.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use paypal_client::dispatch_webhook_event;
use paypal_core::{
    AddTrackersRequest, ApiResult, BatchTrackerCollection, CaptureOrderRequest,
    CreateOrderRequest, Order, OrderTrackerRequest, Patch, PayPalError, PayPalResult,
    RemoteError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const REQUEST_ID: HeaderName = HeaderName::from_static("paypal-request-id");

// =============================================================================
// Error Responses
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Errors a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    PayPal(#[from] PayPalError),

    #[error("PayPal rejected the request: {0}")]
    Remote(RemoteError),

    #[error("Webhook signature could not be verified")]
    Unverified,

    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Remote(remote) => {
                let status =
                    StatusCode::from_u16(remote.status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(remote)).into_response()
            }
            ApiError::PayPal(PayPalError::Remote(remote)) => {
                ApiError::Remote(remote).into_response()
            }
            // No webhook id means the service cannot verify anything yet
            ApiError::PayPal(err @ PayPalError::Configuration(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("PayPal is not fully configured", 503)
                    .with_details(err.to_string())),
            )
                .into_response(),
            ApiError::PayPal(err) => {
                let code = err.status_code();
                if code >= 500 {
                    error!("PayPal call failed: {}", err);
                }
                (
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    Json(ErrorResponse::new(err.to_string(), code)),
                )
                    .into_response()
            }
            ApiError::Unverified => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Webhook signature could not be verified", 401)),
            )
                .into_response(),
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid request body", 400).with_details(details)),
            )
                .into_response(),
        }
    }
}

/// Unwrap a client result, turning remote errors into relayed responses
fn relay<T>(result: PayPalResult<ApiResult<T>>) -> Result<T, ApiError> {
    match result? {
        ApiResult::Success(value) => Ok(value),
        ApiResult::RemoteError(remote) => Err(ApiError::Remote(remote)),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "paypal-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "paypal_environment": state.client.config().environment.as_str()
    }))
}

/// Create an order. The caller's `PayPal-Request-Id` is forwarded; one is
/// generated when absent and echoed back either way.
#[instrument(skip(state, headers, request))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Response, ApiError> {
    let request_id = resolve_request_id(&headers);

    let order = relay(state.client.create_order(Some(&request_id), &request).await)?;

    info!(order_id = %order.id, request_id = %request_id, "Order created");

    let mut response = (StatusCode::CREATED, Json(order)).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    Ok(response)
}

/// The caller's idempotency key exactly as received, or a fresh one
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Show order details
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    relay(state.client.get_order(&order_id).await).map(Json)
}

/// Update an order with JSON Patch operations
#[instrument(skip(state, patches))]
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(patches): Json<Vec<Patch>>,
) -> Result<StatusCode, ApiError> {
    relay(state.client.update_order(&order_id, &patches).await)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Capture an approved order. The body is optional.
#[instrument(skip(state, body))]
pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CaptureOrderRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let order = relay(state.client.capture_order(&order_id, &request).await)?;
    info!(order_id = %order.id, status = ?order.status, "Order captured");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Add tracking information to an order
#[instrument(skip(state, request))]
pub async fn add_order_tracking(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<OrderTrackerRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = relay(state.client.add_order_tracking(&order_id, &request).await)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Add trackers for several transactions
#[instrument(skip(state, request), fields(count = request.trackers.len()))]
pub async fn add_trackers(
    State(state): State<AppState>,
    Json(request): Json<AddTrackersRequest>,
) -> Result<Json<BatchTrackerCollection>, ApiError> {
    relay(state.client.add_trackers(&request).await).map(Json)
}

/// PayPal webhook receiver.
///
/// The body is taken as raw bytes so it can be verified exactly as PayPal
/// sent it.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn paypal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let raw_body = std::str::from_utf8(&body)
        .map_err(|_| ApiError::BadRequest("webhook body is not UTF-8".to_string()))?;

    let event = match state.client.verified_event(&headers, raw_body).await {
        Ok(Some(event)) => event,
        Ok(None) => return Err(ApiError::Unverified),
        Err(PayPalError::InvalidRequest(details)) => {
            warn!("Rejected webhook delivery: {}", details);
            return Err(ApiError::BadRequest(details));
        }
        Err(e) => {
            error!("Webhook verification failed: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Received webhook: type={}, id={}",
        event.event_type, event.id
    );

    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), &event) {
        // Verified events are acknowledged even when the handler fails
        error!("Webhook handler failed for {}: {}", event.id, e);
    }

    Ok(StatusCode::OK)
}
