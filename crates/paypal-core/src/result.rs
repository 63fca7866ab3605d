//! # API Results
//!
//! Every PayPal endpoint answers with either the requested resource or a
//! structured error body. [`ApiResult`] keeps that duality as data so callers
//! can branch on error names and keep the `debug_id` for support tickets.

use crate::error::{PayPalError, PayPalResult};
use crate::shared::HateoasLink;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A structured error returned by the PayPal API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Human-readable, unique name of the error (e.g. `RESOURCE_NOT_FOUND`)
    pub name: String,

    /// Message that describes the error
    #[serde(default)]
    pub message: String,

    /// PayPal internal ID used for correlation
    #[serde(default)]
    pub debug_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_link: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<HateoasLink>,

    /// HTTP status the error arrived with (not part of the body)
    #[serde(skip)]
    pub status: u16,
}

/// Additional detail about an error, usually for client-side 4xx errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Unique, fine-grained application-level error code
    #[serde(default)]
    pub issue: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// The offending value, in whatever JSON type PayPal echoes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// `body`, `path` or `query`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RemoteError {
    /// Whether a decoded JSON body has the PayPal error shape
    /// (a `name` together with a `debug_id`).
    pub fn is_error_shape(body: &Value) -> bool {
        body.get("name").is_some_and(Value::is_string)
            && body.get("debug_id").is_some_and(Value::is_string)
    }

    /// Build from a body that passed [`RemoteError::is_error_shape`].
    ///
    /// Malformed `details` or `links` entries are skipped so the error name
    /// and `debug_id` always survive.
    pub fn from_error_body(body: Value, status: u16) -> Self {
        let mut remote = match serde_json::from_value::<RemoteError>(body.clone()) {
            Ok(remote) => remote,
            Err(_) => {
                let text = |key: &str| {
                    body.get(key)
                        .and_then(Value::as_str)
                        .map(String::from)
                };
                Self {
                    name: text("name").unwrap_or_default(),
                    message: text("message").unwrap_or_default(),
                    debug_id: text("debug_id").unwrap_or_default(),
                    information_link: text("information_link"),
                    details: lenient_list(body.get("details")),
                    links: lenient_list(body.get("links")),
                    status,
                }
            }
        };
        remote.status = status;
        remote
    }

    /// Build from an OAuth-style `{error, error_description}` body.
    pub fn from_oauth_body(body: &Value, status: u16) -> Option<Self> {
        let name = body.get("error")?.as_str()?.to_string();
        let message = body
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            name,
            message,
            debug_id: String::new(),
            information_link: None,
            details: Vec::new(),
            links: Vec::new(),
            status,
        })
    }

    /// First detail issue code, if any (e.g. `ORDER_NOT_APPROVED`)
    pub fn issue(&self) -> Option<&str> {
        self.details.first().map(|d| d.issue.as_str())
    }
}

/// Decode each array entry on its own, dropping the ones that don't fit `T`
fn lenient_list<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| T::deserialize(entry).ok())
                .collect()
        })
        .unwrap_or_default()
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        if !self.debug_id.is_empty() {
            write!(f, " (debug_id={})", self.debug_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Outcome of a PayPal API call that reached the server
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    /// The requested resource
    Success(T),
    /// A structured error body
    RemoteError(RemoteError),
}

impl<T> ApiResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    /// The resource, discarding any remote error
    pub fn ok(self) -> Option<T> {
        match self {
            ApiResult::Success(value) => Some(value),
            ApiResult::RemoteError(_) => None,
        }
    }

    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            ApiResult::Success(_) => None,
            ApiResult::RemoteError(err) => Some(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success(value) => ApiResult::Success(f(value)),
            ApiResult::RemoteError(err) => ApiResult::RemoteError(err),
        }
    }

    /// Convert into a plain `Result`, turning remote errors into
    /// [`PayPalError::Remote`] so callers can use `?`.
    pub fn into_result(self) -> PayPalResult<T> {
        match self {
            ApiResult::Success(value) => Ok(value),
            ApiResult::RemoteError(err) => Err(PayPalError::Remote(err)),
        }
    }
}
