//! # PayPal Client
//!
//! Entry point for callers. Owns one [`ApiGateway`] (and with it one token
//! cache) per credential set; resource operations live in `orders`,
//! `tracking` and `webhook`.

use crate::clock::{Clock, SystemClock};
use crate::config::PayPalConfig;
use crate::gateway::{ApiGateway, ApiRequest};
use paypal_core::{ApiResult, PayPalResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

/// Typed PayPal REST client
#[derive(Debug)]
pub struct PayPalClient {
    gateway: ApiGateway,
}

impl PayPalClient {
    /// Create a new client using the system clock
    pub fn new(config: PayPalConfig) -> PayPalResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client whose token expiry follows `clock`
    pub fn with_clock(config: PayPalConfig, clock: Arc<dyn Clock>) -> PayPalResult<Self> {
        info!(
            environment = %config.environment,
            base_url = %config.api_base_url,
            "Creating PayPal client"
        );

        Ok(Self {
            gateway: ApiGateway::new(config, clock)?,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PayPalResult<Self> {
        Self::new(PayPalConfig::from_env()?)
    }

    pub fn config(&self) -> &PayPalConfig {
        self.gateway.config()
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    /// Escape hatch for endpoints without a typed method
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> PayPalResult<ApiResult<T>> {
        self.gateway.request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_empty_credentials() {
        assert!(PayPalClient::new(PayPalConfig::sandbox("", "xyz")).is_err());
    }

    #[test]
    fn test_client_exposes_config() {
        let client = PayPalClient::new(PayPalConfig::sandbox("abc", "xyz")).unwrap();
        assert!(client.config().is_sandbox());
        assert_eq!(client.config().client_id, "abc");
    }
}
