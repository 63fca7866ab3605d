//! Orders v2 operations.

use crate::client::PayPalClient;
use crate::gateway::ApiRequest;
use paypal_core::{
    ApiResult, CaptureOrderRequest, CreateOrderRequest, Order, PayPalError, PayPalResult, Patch,
};
use tracing::{info, instrument};

pub const ORDERS_PATH: &str = "/v2/checkout/orders";

/// Idempotency header passed through untouched
pub const REQUEST_ID_HEADER: &str = "PayPal-Request-Id";

pub(crate) fn order_path(order_id: &str) -> PayPalResult<String> {
    let order_id = order_id.trim();
    if order_id.is_empty() || order_id.contains('/') || order_id.contains('?') {
        return Err(PayPalError::InvalidRequest(format!(
            "invalid order id {:?}",
            order_id
        )));
    }
    Ok(format!("{}/{}", ORDERS_PATH, order_id))
}

impl PayPalClient {
    /// Create an order.
    ///
    /// `request_id` is sent as `PayPal-Request-Id`, which makes retries of
    /// the same creation idempotent on PayPal's side.
    #[instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        request_id: Option<&str>,
        request: &CreateOrderRequest,
    ) -> PayPalResult<ApiResult<Order>> {
        let mut call = ApiRequest::post(ORDERS_PATH)
            .header("Prefer", "return=representation")
            .json(request)?;
        if let Some(request_id) = request_id {
            call = call.header(REQUEST_ID_HEADER, request_id);
        }

        let result = self.request::<Order>(call).await?;
        if let ApiResult::Success(order) = &result {
            info!(order_id = %order.id, status = ?order.status, "Created PayPal order");
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> PayPalResult<ApiResult<Order>> {
        self.request(ApiRequest::get(order_path(order_id)?)).await
    }

    /// Apply JSON Patch operations. PayPal answers `204 No Content`.
    #[instrument(skip(self, patches))]
    pub async fn update_order(
        &self,
        order_id: &str,
        patches: &[Patch],
    ) -> PayPalResult<ApiResult<()>> {
        if patches.is_empty() {
            return Err(PayPalError::InvalidRequest(
                "update requires at least one patch operation".to_string(),
            ));
        }

        self.request(ApiRequest::patch(order_path(order_id)?).json(patches)?)
            .await
    }

    /// Capture payment for an approved order
    #[instrument(skip(self, request))]
    pub async fn capture_order(
        &self,
        order_id: &str,
        request: &CaptureOrderRequest,
    ) -> PayPalResult<ApiResult<Order>> {
        let call = ApiRequest::post(format!("{}/capture", order_path(order_id)?))
            .header("Prefer", "return=representation")
            .json(request)?;

        let result = self.request::<Order>(call).await?;
        if let ApiResult::Success(order) = &result {
            info!(order_id = %order.id, status = ?order.status, "Captured PayPal order");
        }
        Ok(result)
    }
}
