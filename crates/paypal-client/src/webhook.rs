//! # PayPal Webhook Handling
//!
//! Signature verification and event dispatch for PayPal webhook
//! notifications.
//!
//! PayPal verifies signatures remotely: the receiver posts the transmission
//! headers together with the event *exactly as received* to
//! `/v1/notifications/verify-webhook-signature`. Re-serializing the event
//! would change its bytes and break the signature, so the request body is
//! built as a template with a sentinel that is then replaced by the raw body.

use crate::client::PayPalClient;
use crate::gateway::{ApiGateway, ApiRequest};
use paypal_core::webhooks::{
    CHECKOUT_ORDER_APPROVED, CHECKOUT_ORDER_COMPLETED, PAYMENT_CAPTURE_COMPLETED,
    PAYMENT_CAPTURE_DENIED, PAYMENT_CAPTURE_REFUNDED,
};
use paypal_core::{
    ApiResult, Capture, PayPalError, PayPalResult, Refund, VerifyWebhookSignatureResponse,
    WebhookEvent,
};
use reqwest::header::HeaderMap;
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

pub const VERIFY_WEBHOOK_SIGNATURE_PATH: &str = "/v1/notifications/verify-webhook-signature";

pub const HEADER_AUTH_ALGO: &str = "paypal-auth-algo";
pub const HEADER_CERT_URL: &str = "paypal-cert-url";
pub const HEADER_TRANSMISSION_ID: &str = "paypal-transmission-id";
pub const HEADER_TRANSMISSION_SIG: &str = "paypal-transmission-sig";
pub const HEADER_TRANSMISSION_TIME: &str = "paypal-transmission-time";

const RAW_BODY_SENTINEL: &str = "__RAW_BODY__";

// ===== Verification =====

/// Transmission parameters of one webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookVerification {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
}

impl WebhookVerification {
    /// Read the `PAYPAL-*` transmission headers of an incoming delivery
    pub fn from_headers(headers: &HeaderMap, webhook_id: impl Into<String>) -> PayPalResult<Self> {
        let header = |name: &str| -> PayPalResult<String> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
                .ok_or_else(|| {
                    PayPalError::InvalidRequest(format!("missing webhook header {}", name))
                })
        };

        Ok(Self {
            auth_algo: header(HEADER_AUTH_ALGO)?,
            cert_url: header(HEADER_CERT_URL)?,
            transmission_id: header(HEADER_TRANSMISSION_ID)?,
            transmission_sig: header(HEADER_TRANSMISSION_SIG)?,
            transmission_time: header(HEADER_TRANSMISSION_TIME)?,
            webhook_id: webhook_id.into(),
        })
    }
}

/// Field order here is the field order on the wire; `webhook_event` stays last.
#[derive(Serialize)]
struct VerificationShape<'a> {
    auth_algo: &'a str,
    cert_url: &'a str,
    transmission_id: &'a str,
    transmission_sig: &'a str,
    transmission_time: &'a str,
    webhook_id: &'a str,
    webhook_event: &'a str,
}

/// Build the verify-signature request body with `raw_body` embedded verbatim
/// as the `webhook_event` value.
pub fn canonical_verification_body(
    params: &WebhookVerification,
    raw_body: &str,
) -> PayPalResult<String> {
    if raw_body.trim().is_empty() {
        return Err(PayPalError::InvalidRequest(
            "webhook body is empty".to_string(),
        ));
    }
    // Well-formedness check only; the parsed value is discarded
    serde_json::from_str::<IgnoredAny>(raw_body).map_err(|e| {
        PayPalError::InvalidRequest(format!("webhook body is not valid JSON: {}", e))
    })?;

    let shape = VerificationShape {
        auth_algo: &params.auth_algo,
        cert_url: &params.cert_url,
        transmission_id: &params.transmission_id,
        transmission_sig: &params.transmission_sig,
        transmission_time: &params.transmission_time,
        webhook_id: &params.webhook_id,
        webhook_event: RAW_BODY_SENTINEL,
    };
    let template = serde_json::to_string(&shape)?;

    let quoted = format!("\"{}\"", RAW_BODY_SENTINEL);
    let at = template.rfind(&quoted).ok_or_else(|| {
        PayPalError::Serialization("verification template lost its placeholder".to_string())
    })?;

    let mut body = String::with_capacity(template.len() + raw_body.len());
    body.push_str(&template[..at]);
    body.push_str(raw_body);
    body.push_str(&template[at + quoted.len()..]);
    Ok(body)
}

impl ApiGateway {
    /// Ask PayPal whether `raw_body` was signed by PayPal for this webhook
    #[instrument(skip(self, params, raw_body), fields(transmission_id = %params.transmission_id))]
    pub async fn verify_webhook_signature(
        &self,
        params: &WebhookVerification,
        raw_body: &str,
    ) -> PayPalResult<ApiResult<VerifyWebhookSignatureResponse>> {
        let body = canonical_verification_body(params, raw_body)?;
        debug!(bytes = body.len(), "Verifying webhook signature");

        self.request(ApiRequest::post(VERIFY_WEBHOOK_SIGNATURE_PATH).raw_json(body))
            .await
    }
}

impl PayPalClient {
    pub async fn verify_webhook_signature(
        &self,
        params: &WebhookVerification,
        raw_body: &str,
    ) -> PayPalResult<ApiResult<VerifyWebhookSignatureResponse>> {
        self.gateway().verify_webhook_signature(params, raw_body).await
    }

    /// `true` only for a `SUCCESS` verification status.
    ///
    /// A `FAILURE` status is `Ok(false)`; a remote error from the verify
    /// endpoint itself (bad webhook id, bad credentials) is `Err`.
    pub async fn is_webhook_signature_valid(
        &self,
        params: &WebhookVerification,
        raw_body: &str,
    ) -> PayPalResult<bool> {
        let response = self
            .verify_webhook_signature(params, raw_body)
            .await?
            .into_result()?;

        if !response.is_verified() {
            warn!(
                transmission_id = %params.transmission_id,
                status = ?response.verification_status,
                "Webhook signature rejected"
            );
        }
        Ok(response.is_verified())
    }

    /// Verify an incoming delivery against the configured webhook id and
    /// parse it. `Ok(None)` means the signature did not verify.
    #[instrument(skip(self, headers, raw_body))]
    pub async fn verified_event(
        &self,
        headers: &HeaderMap,
        raw_body: &str,
    ) -> PayPalResult<Option<WebhookEvent>> {
        let webhook_id = self.config().webhook_id.clone().ok_or_else(|| {
            PayPalError::Configuration("PAYPAL_WEBHOOK_ID not set".to_string())
        })?;

        let params = WebhookVerification::from_headers(headers, webhook_id)?;
        if !self.is_webhook_signature_valid(&params, raw_body).await? {
            return Ok(None);
        }

        parse_event(raw_body).map(Some)
    }
}

/// Parse a webhook delivery body
pub fn parse_event(raw_body: &str) -> PayPalResult<WebhookEvent> {
    serde_json::from_str(raw_body)
        .map_err(|e| PayPalError::InvalidRequest(format!("malformed webhook event: {}", e)))
}

// ===== Dispatch =====

/// Webhook event handler trait
///
/// Implement this trait to handle different webhook events.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when the payer approves an order
    fn on_order_approved(&self, event: &WebhookEvent) -> PayPalResult<()> {
        info!("Order approved: {:?}", event.resource_id());
        Ok(())
    }

    /// Called when all payments of an order are captured
    fn on_order_completed(&self, event: &WebhookEvent) -> PayPalResult<()> {
        info!("Order completed: {:?}", event.resource_id());
        Ok(())
    }

    /// Called when a capture completes
    fn on_capture_completed(&self, capture: Capture, event: &WebhookEvent) -> PayPalResult<()> {
        info!(
            "Capture completed: capture={:?}, order={:?}",
            capture.id,
            capture.order_id()
        );
        Ok(())
    }

    /// Called when a capture is denied
    fn on_capture_denied(&self, capture: Capture, event: &WebhookEvent) -> PayPalResult<()> {
        warn!("Capture denied: {:?}", capture.id);
        Ok(())
    }

    /// Called when a capture is refunded
    fn on_capture_refunded(&self, refund: Refund, event: &WebhookEvent) -> PayPalResult<()> {
        info!("Capture refunded: refund={:?}", refund.id);
        Ok(())
    }

    /// Called for every other event type
    fn on_other_event(&self, event: &WebhookEvent) -> PayPalResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the matching handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> PayPalResult<()> {
    match event.event_type.as_str() {
        CHECKOUT_ORDER_APPROVED => handler.on_order_approved(event),
        CHECKOUT_ORDER_COMPLETED => handler.on_order_completed(event),
        PAYMENT_CAPTURE_COMPLETED => handler.on_capture_completed(resource(event)?, event),
        PAYMENT_CAPTURE_DENIED => handler.on_capture_denied(resource(event)?, event),
        PAYMENT_CAPTURE_REFUNDED => handler.on_capture_refunded(resource(event)?, event),
        _ => handler.on_other_event(event),
    }
}

fn resource<T: serde::de::DeserializeOwned>(event: &WebhookEvent) -> PayPalResult<T> {
    serde_json::from_value(event.resource.clone()).map_err(|e| {
        PayPalError::InvalidRequest(format!(
            "{} resource could not be decoded: {}",
            event.event_type, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn params() -> WebhookVerification {
        WebhookVerification {
            auth_algo: "SHA256withRSA".to_string(),
            cert_url: "https://api.sandbox.paypal.com/v1/notifications/certs/CERT-360caa42".to_string(),
            transmission_id: "69cd13f0-d67a-11e5-baa3-778b53f4ae55".to_string(),
            transmission_sig: "lmI95Jx3Y9nhR5SJWlHVIWpg4AgFk7n9bCHSRxbrd8A9zrhdu2rMyFrmz+Zjh3s3boXB07VXCXUZy/UFzUlnGJn0wDugt7FlSvdKeIJenLRemUxYCPVoEZzg9VFNqOa48gMkvF+XTpxBeUx/kWy6B5cp7GkT2+pOowfRK7OaynuxUoKW3JcMWw272VKjLTtTAShncla7tGF+55rxyt2KNZIIqxNMJ48RDZheGU5w1npu9dZHnPgTXB9iomeVRoD8O/jhRpnKsGrDschyNdkeh81BJJMH4Ctc6lnCCquoP/GzCzz33MMsNdid7vL/NIWaCsekQpW26FpWPi/tfj8nLA==".to_string(),
            transmission_time: "2016-02-18T20:01:35Z".to_string(),
            webhook_id: "1JE4291016473214C".to_string(),
        }
    }

    #[test]
    fn test_raw_body_is_spliced_verbatim() {
        let body = canonical_verification_body(&params(), r#"{"id":"evt1","other":1}"#).unwrap();

        assert!(body.contains(r#""webhook_event":{"id":"evt1","other":1}"#));
        assert!(body.starts_with(r#"{"auth_algo":"SHA256withRSA","#));
        assert!(body.ends_with(r#""webhook_event":{"id":"evt1","other":1}}"#));
        assert!(!body.contains(RAW_BODY_SENTINEL));
    }

    #[test]
    fn test_raw_body_formatting_is_preserved() {
        let raw = "{ \"other\" : 1.50,\n  \"id\":\"evt1\" }";
        let body = canonical_verification_body(&params(), raw).unwrap();

        assert!(body.contains(&format!("\"webhook_event\":{}}}", raw)));
    }

    #[test]
    fn test_sentinel_inside_params_is_left_alone() {
        let mut params = params();
        params.transmission_id = RAW_BODY_SENTINEL.to_string();

        let body = canonical_verification_body(&params, r#"{"id":"evt1"}"#).unwrap();

        assert!(body.contains(r#""transmission_id":"__RAW_BODY__""#));
        assert!(body.ends_with(r#""webhook_event":{"id":"evt1"}}"#));
    }

    #[test]
    fn test_rejects_empty_or_malformed_body() {
        assert!(matches!(
            canonical_verification_body(&params(), "  "),
            Err(PayPalError::InvalidRequest(_))
        ));
        assert!(matches!(
            canonical_verification_body(&params(), r#"{"id":"evt1""#),
            Err(PayPalError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("paypal-auth-algo", HeaderValue::from_static("SHA256withRSA"));
        headers.insert("paypal-cert-url", HeaderValue::from_static("https://example.com/cert"));
        headers.insert("paypal-transmission-id", HeaderValue::from_static("tx-1"));
        headers.insert("paypal-transmission-sig", HeaderValue::from_static("sig"));
        headers.insert("paypal-transmission-time", HeaderValue::from_static("2024-05-01T12:00:00Z"));

        let params = WebhookVerification::from_headers(&headers, "WH-1").unwrap();
        assert_eq!(params.transmission_id, "tx-1");
        assert_eq!(params.webhook_id, "WH-1");

        headers.remove("paypal-transmission-sig");
        assert!(WebhookVerification::from_headers(&headers, "WH-1").is_err());
    }

    fn capture_event() -> WebhookEvent {
        parse_event(
            &json!({
                "id": "WH-58D329510W468432D-8HN650336L201105X",
                "event_type": "PAYMENT.CAPTURE.COMPLETED",
                "resource_type": "capture",
                "resource": {
                    "id": "42311647XV020574X",
                    "status": "COMPLETED",
                    "amount": { "currency_code": "USD", "value": "29.99" },
                    "supplementary_data": { "related_ids": { "order_id": "5O190127TN364715T" } }
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_dispatch_capture_completed() {
        struct TestHandler {
            called: AtomicBool,
        }

        impl WebhookHandler for TestHandler {
            fn on_capture_completed(
                &self,
                capture: Capture,
                _event: &WebhookEvent,
            ) -> PayPalResult<()> {
                assert_eq!(capture.order_id(), Some("5O190127TN364715T"));
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            called: AtomicBool::new(false),
        };
        dispatch_webhook_event(&handler, &capture_event()).unwrap();

        assert!(handler.called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_dispatch_unknown_event_type() {
        let mut event = capture_event();
        event.event_type = "BILLING.SUBSCRIPTION.CREATED".to_string();

        assert!(dispatch_webhook_event(&LoggingWebhookHandler, &event).is_ok());
    }
}
