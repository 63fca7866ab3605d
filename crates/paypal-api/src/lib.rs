//! # paypal-api
//!
//! HTTP gateway in front of the PayPal REST client.
//!
//! This crate provides:
//! - Axum-based HTTP server sharing one PayPal client (and token cache)
//! - REST endpoints for orders and shipment tracking
//! - A webhook receiver that verifies deliveries before dispatching them
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/orders` | Create order |
//! | GET | `/api/v1/orders/{id}` | Show order |
//! | PATCH | `/api/v1/orders/{id}` | Update order |
//! | POST | `/api/v1/orders/{id}/capture` | Capture order |
//! | POST | `/api/v1/orders/{id}/track` | Add tracking to order |
//! | POST | `/api/v1/trackers` | Add trackers in batch |
//! | POST | `/webhook/paypal` | PayPal webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
