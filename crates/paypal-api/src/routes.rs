//! # Routes
//!
//! Axum router configuration for the PayPal gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET   /health
/// - POST  /api/v1/orders
/// - GET   /api/v1/orders/{order_id}
/// - PATCH /api/v1/orders/{order_id}
/// - POST  /api/v1/orders/{order_id}/capture
/// - POST  /api/v1/orders/{order_id}/track
/// - POST  /api/v1/trackers
/// - POST  /webhook/paypal
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/orders", post(handlers::create_order))
        .route(
            "/orders/{order_id}",
            get(handlers::get_order).patch(handlers::update_order),
        )
        .route("/orders/{order_id}/capture", post(handlers::capture_order))
        .route("/orders/{order_id}/track", post(handlers::add_order_tracking))
        .route("/trackers", post(handlers::add_trackers))
        .layer(cors);

    // Webhook routes (no CORS, must accept raw body)
    let webhook_routes = Router::new().route("/paypal", post(handlers::paypal_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .nest("/webhook", webhook_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
