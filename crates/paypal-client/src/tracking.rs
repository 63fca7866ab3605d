//! Shipment tracking operations.

use crate::client::PayPalClient;
use crate::gateway::ApiRequest;
use crate::orders::order_path;
use paypal_core::{
    AddTrackersRequest, ApiResult, BatchTrackerCollection, Order, OrderTrackerRequest,
    PayPalError, PayPalResult,
};
use tracing::{info, instrument, warn};

pub const TRACKERS_BATCH_PATH: &str = "/v1/shipping/trackers-batch";

impl PayPalClient {
    /// Attach tracking information to a captured order
    #[instrument(skip(self, request), fields(capture_id = %request.capture_id))]
    pub async fn add_order_tracking(
        &self,
        order_id: &str,
        request: &OrderTrackerRequest,
    ) -> PayPalResult<ApiResult<Order>> {
        let call = ApiRequest::post(format!("{}/track", order_path(order_id)?)).json(request)?;
        self.request(call).await
    }

    /// Add trackers for several transactions at once
    #[instrument(skip(self, request), fields(count = request.trackers.len()))]
    pub async fn add_trackers(
        &self,
        request: &AddTrackersRequest,
    ) -> PayPalResult<ApiResult<BatchTrackerCollection>> {
        if request.trackers.is_empty() {
            return Err(PayPalError::InvalidRequest(
                "trackers batch is empty".to_string(),
            ));
        }

        let result = self
            .request::<BatchTrackerCollection>(ApiRequest::post(TRACKERS_BATCH_PATH).json(request)?)
            .await?;

        if let ApiResult::Success(batch) = &result {
            if batch.has_errors() {
                warn!(failed = batch.errors.len(), "Some trackers were rejected");
            }
            info!(accepted = batch.tracker_identifiers.len(), "Added PayPal trackers");
        }
        Ok(result)
    }
}
