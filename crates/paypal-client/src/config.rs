//! # PayPal Configuration
//!
//! Credentials and connection settings. Secrets are loaded from environment
//! variables; the environment (sandbox or live) fixes the API host.

use paypal_core::{PayPalError, PayPalResult};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const SANDBOX_API_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
pub const LIVE_API_BASE_URL: &str = "https://api-m.paypal.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which PayPal environment the credentials belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    pub fn api_base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_API_BASE_URL,
            Environment::Live => LIVE_API_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }
}

impl FromStr for Environment {
    type Err = PayPalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" | "production" => Ok(Environment::Live),
            other => Err(PayPalError::Configuration(format!(
                "PAYPAL_ENVIRONMENT must be sandbox or live, got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PayPal API configuration
#[derive(Clone)]
pub struct PayPalConfig {
    /// REST app client ID
    pub client_id: String,

    /// REST app secret
    pub secret: String,

    /// Sandbox or live
    pub environment: Environment,

    /// API base URL (derived from the environment, overridable for mocking)
    pub api_base_url: String,

    /// Per-HTTP-request timeout
    pub timeout: Duration,

    /// Webhook ID from the developer dashboard, needed to verify signatures
    pub webhook_id: Option<String>,

    /// Treat a token as expired this long before its real expiry
    pub token_refresh_margin: Duration,
}

impl PayPalConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_CLIENT_SECRET`
    ///
    /// Optional: `PAYPAL_ENVIRONMENT` (default `sandbox`), `PAYPAL_WEBHOOK_ID`,
    /// `PAYPAL_TIMEOUT_SECS`.
    pub fn from_env() -> PayPalResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let client_id = required_var("PAYPAL_CLIENT_ID")?;
        let secret = required_var("PAYPAL_CLIENT_SECRET")?;

        let environment = match env::var("PAYPAL_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Sandbox,
        };

        let timeout = match env::var("PAYPAL_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                PayPalError::Configuration(format!(
                    "PAYPAL_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    value
                ))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let webhook_id = env::var("PAYPAL_WEBHOOK_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());

        let mut config = Self::new(client_id, secret, environment).with_timeout(timeout);
        config.webhook_id = webhook_id;
        Ok(config)
    }

    /// Create config with explicit values
    pub fn new(
        client_id: impl Into<String>,
        secret: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            environment,
            api_base_url: environment.api_base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            webhook_id: None,
            token_refresh_margin: Duration::ZERO,
        }
    }

    pub fn sandbox(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::new(client_id, secret, Environment::Sandbox)
    }

    pub fn live(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::new(client_id, secret, Environment::Live)
    }

    pub fn is_sandbox(&self) -> bool {
        self.environment == Environment::Sandbox
    }

    /// Reject configs that cannot possibly authenticate
    pub fn validate(&self) -> PayPalResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(PayPalError::Configuration("client ID is empty".to_string()));
        }
        if self.secret.trim().is_empty() {
            return Err(PayPalError::Configuration("secret is empty".to_string()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(PayPalError::Configuration(format!(
                "API base URL must be http(s), got {:?}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_webhook_id(mut self, webhook_id: impl Into<String>) -> Self {
        self.webhook_id = Some(webhook_id.into());
        self
    }

    pub fn with_token_refresh_margin(mut self, margin: Duration) -> Self {
        self.token_refresh_margin = margin;
        self
    }
}

// Keep the secret out of logs
impl fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("webhook_id", &self.webhook_id)
            .field("token_refresh_margin", &self.token_refresh_margin)
            .finish()
    }
}

fn required_var(name: &str) -> PayPalResult<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| PayPalError::Configuration(format!("{} not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_selects_host() {
        let config = PayPalConfig::sandbox("abc", "xyz");
        assert!(config.is_sandbox());
        assert_eq!(config.api_base_url, "https://api-m.sandbox.paypal.com");

        let config = PayPalConfig::live("abc", "xyz");
        assert!(!config.is_sandbox());
        assert_eq!(config.api_base_url, "https://api-m.paypal.com");
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!("Sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!("live".parse::<Environment>().unwrap(), Environment::Live);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PayPalConfig::sandbox("abc", "super-secret-value");
        let printed = format!("{:?}", config);

        assert!(printed.contains("abc"));
        assert!(!printed.contains("super-secret-value"));
    }

    #[test]
    fn test_validate() {
        assert!(PayPalConfig::sandbox("abc", "xyz").validate().is_ok());
        assert!(PayPalConfig::sandbox("", "xyz").validate().is_err());
        assert!(PayPalConfig::sandbox("abc", "xyz")
            .with_api_base_url("localhost:8080")
            .validate()
            .is_err());
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = PayPalConfig::sandbox("abc", "xyz").with_api_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
    }
}
