//! # paypal-client
//!
//! Authenticated client for the PayPal REST API.
//!
//! - [`TokenAuthority`] caches the OAuth client-credentials token and
//!   refreshes it once per expiry, even under concurrent callers
//! - [`ApiGateway`] issues bearer-authenticated requests and decodes
//!   responses into [`ApiResult`](paypal_core::ApiResult)
//! - Order, tracking and webhook operations on [`PayPalClient`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paypal_client::PayPalClient;
//! use paypal_core::{AmountWithBreakdown, ApiResult, CheckoutIntent, CreateOrderRequest, PurchaseUnit};
//!
//! let client = PayPalClient::from_env()?;
//!
//! let request = CreateOrderRequest::new(CheckoutIntent::Capture)
//!     .with_purchase_unit(PurchaseUnit::new(AmountWithBreakdown::new("USD", "100.00")));
//!
//! if let ApiResult::Success(order) = client.create_order(Some("req-1"), &request).await? {
//!     // Redirect the payer to order.approve_url()
//! }
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use paypal_client::webhook::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! // In your webhook endpoint, with the body exactly as received:
//! if let Some(event) = client.verified_event(&headers, &raw_body).await? {
//!     dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! }
//! ```

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod gateway;
pub mod orders;
pub mod tracking;
pub mod webhook;

// Re-exports
pub use auth::{AccessToken, TokenAuthority};
pub use client::PayPalClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Environment, PayPalConfig};
pub use gateway::{ApiGateway, ApiRequest};
pub use orders::REQUEST_ID_HEADER;
pub use webhook::{
    canonical_verification_body, dispatch_webhook_event, parse_event, LoggingWebhookHandler,
    WebhookHandler, WebhookVerification,
};
