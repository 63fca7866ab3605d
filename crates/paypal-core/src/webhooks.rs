//! # Webhook Types
//!
//! Webhook event notifications and the verify-signature response.
//! Event types are plain strings; the constants below cover the ones the
//! client dispatches on, everything else passes through untouched.

use crate::shared::HateoasLink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CHECKOUT_ORDER_APPROVED: &str = "CHECKOUT.ORDER.APPROVED";
pub const CHECKOUT_ORDER_COMPLETED: &str = "CHECKOUT.ORDER.COMPLETED";
pub const PAYMENT_CAPTURE_COMPLETED: &str = "PAYMENT.CAPTURE.COMPLETED";
pub const PAYMENT_CAPTURE_DENIED: &str = "PAYMENT.CAPTURE.DENIED";
pub const PAYMENT_CAPTURE_REFUNDED: &str = "PAYMENT.CAPTURE.REFUNDED";

/// A webhook event notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// The resource that triggered the event (order, capture, ...)
    #[serde(default)]
    pub resource: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<HateoasLink>,
}

impl WebhookEvent {
    /// `resource.id`, when the resource has one
    pub fn resource_id(&self) -> Option<&str> {
        self.resource.get("id").and_then(Value::as_str)
    }
}

/// Outcome reported by the verify-signature endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

/// Response of `POST /v1/notifications/verify-webhook-signature`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyWebhookSignatureResponse {
    pub verification_status: VerificationStatus,
}

impl VerifyWebhookSignatureResponse {
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Success
    }
}
