//! # paypal-core
//!
//! Core types for the PayPal REST client.
//!
//! This crate provides:
//! - `PayPalError` for typed error handling
//! - `ApiResult` and `RemoteError` for the success-or-error duality of every endpoint
//! - Order, payment, tracking and webhook resource types
//!
//! ## Example
//!
//! ```rust,ignore
//! use paypal_core::{AmountWithBreakdown, ApiResult, CheckoutIntent, CreateOrderRequest, PurchaseUnit};
//!
//! let request = CreateOrderRequest::new(CheckoutIntent::Capture)
//!     .with_purchase_unit(PurchaseUnit::new(AmountWithBreakdown::new("USD", "29.99")));
//!
//! match client.create_order(Some("req-1"), &request).await? {
//!     ApiResult::Success(order) => println!("approve at {:?}", order.approve_url()),
//!     ApiResult::RemoteError(err) => eprintln!("PayPal said no: {err}"),
//! }
//! ```

pub mod error;
pub mod orders;
pub mod payments;
pub mod result;
pub mod shared;
pub mod tracking;
pub mod webhooks;

// Re-exports for convenience
pub use error::{PayPalError, PayPalResult};
pub use orders::{
    CaptureOrderRequest, CheckoutIntent, CreateOrderRequest, ExperienceContext, Item,
    ItemCategory, Order, OrderStatus, Payee, Payer, PurchaseUnit, ShippingDetails,
};
pub use payments::{Authorization, Capture, CaptureStatus, Refund};
pub use result::{ApiResult, ErrorDetail, RemoteError};
pub use shared::{
    Amount, AmountBreakdown, AmountWithBreakdown, HateoasLink, Name, Patch, PatchOperation,
    PostalAddress,
};
pub use tracking::{
    AddTrackersRequest, BatchTrackerCollection, OrderTrackerRequest, Tracker, TrackerStatus,
    TrackingIdentifier,
};
pub use webhooks::{VerificationStatus, VerifyWebhookSignatureResponse, WebhookEvent};
