//! # Tracking Types
//!
//! Shipment tracking for captured payments. Carrier codes are PayPal's own
//! (`UPS`, `USPS`, `DHL`, ... or `OTHER` with `carrier_name_other`) and are
//! passed through as strings.

use crate::result::RemoteError;
use crate::shared::HateoasLink;
use serde::{Deserialize, Serialize};

/// Status of a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackerStatus {
    Cancelled,
    Delivered,
    LocalPickup,
    OnHold,
    Shipped,
}

/// Tracking information for one transaction, as sent to
/// `POST /v1/shipping/trackers-batch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    /// PayPal transaction (capture) ID
    pub transaction_id: String,
    pub status: TrackerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// `CARRIER_PROVIDED` or `E2E_PARTNER_PROVIDED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name_other: Option<String>,
    /// YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_buyer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl Tracker {
    pub fn shipped(
        transaction_id: impl Into<String>,
        tracking_number: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: TrackerStatus::Shipped,
            tracking_number: Some(tracking_number.into()),
            tracking_number_type: None,
            carrier: Some(carrier.into()),
            carrier_name_other: None,
            shipment_date: None,
            notify_buyer: None,
            quantity: None,
        }
    }
}

/// Body of `POST /v1/shipping/trackers-batch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddTrackersRequest {
    pub trackers: Vec<Tracker>,
}

/// Identifies a tracker that PayPal accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingIdentifier {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<HateoasLink>,
}

/// Response of the batch endpoint. Individual trackers can fail while the
/// batch as a whole succeeds; those land in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchTrackerCollection {
    #[serde(default)]
    pub tracker_identifiers: Vec<TrackingIdentifier>,
    #[serde(default)]
    pub errors: Vec<RemoteError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<HateoasLink>,
}

impl BatchTrackerCollection {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Body of `POST /v2/checkout/orders/{id}/track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTrackerRequest {
    pub capture_id: String,
    pub tracking_number: String,
    pub carrier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_payer: Option<bool>,
}

impl OrderTrackerRequest {
    pub fn new(
        capture_id: impl Into<String>,
        tracking_number: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            capture_id: capture_id.into(),
            tracking_number: tracking_number.into(),
            carrier: carrier.into(),
            carrier_name_other: None,
            notify_payer: None,
        }
    }
}
