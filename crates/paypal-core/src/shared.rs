//! # Shared Types
//!
//! Building blocks reused across the Orders, Payments and Tracking APIs.
//! Currency codes, country codes and locales are passed through as strings;
//! PayPal validates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A monetary amount. `value` is a decimal string as PayPal expects it
/// (`"10.00"`, or `"1000"` for JPY).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Three-character ISO-4217 currency code
    pub currency_code: String,
    pub value: String,
}

impl Amount {
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            value: value.into(),
        }
    }
}

/// Breakdown of a purchase unit amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_total: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_total: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_discount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Amount>,
}

/// Total amount with an optional breakdown.
///
/// When a breakdown is present, `value` must equal item_total + tax_total +
/// shipping + handling + insurance - shipping_discount - discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountWithBreakdown {
    pub currency_code: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<AmountBreakdown>,
}

impl AmountWithBreakdown {
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            value: value.into(),
            breakdown: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown: AmountBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

/// HATEOAS link attached to most PayPal resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateoasLink {
    pub href: String,
    /// Link relation type (`self`, `approve`, `capture`, ...)
    pub rel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "encType", default, skip_serializing_if = "Option::is_none")]
    pub enc_type: Option<String>,
}

/// Find a link by relation type
pub fn find_link<'a>(links: &'a [HateoasLink], rel: &str) -> Option<&'a HateoasLink> {
    links.iter().find(|link| link.rel == rel)
}

/// JSON Patch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A JSON Patch entry used by `PATCH /v2/checkout/orders/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub op: PatchOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Patch {
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOperation::Replace,
            path: Some(path.into()),
            value: Some(value),
            from: None,
        }
    }

    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOperation::Add,
            path: Some(path.into()),
            value: Some(value),
            from: None,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOperation::Remove,
            path: Some(path.into()),
            value: None,
            from: None,
        }
    }
}

/// Name of a party
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Portable international postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    /// City, town, or village
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area_2: Option<String>,
    /// State, province, or prefecture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Two-character ISO 3166-1 code
    pub country_code: String,
}

/// Phone number in E.164 format (national number only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub national_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_serialization() {
        let patch = Patch::replace(
            "/purchase_units/@reference_id=='default'/amount",
            json!({ "currency_code": "USD", "value": "12.00" }),
        );
        let value = serde_json::to_value(&patch).unwrap();

        assert_eq!(value["op"], "replace");
        assert_eq!(value["value"]["value"], "12.00");
        assert!(value.get("from").is_none());
    }

    #[test]
    fn test_find_link() {
        let links: Vec<HateoasLink> = serde_json::from_value(json!([
            { "href": "https://api-m.paypal.com/v2/checkout/orders/1", "rel": "self", "method": "GET" },
            { "href": "https://www.paypal.com/checkoutnow?token=1", "rel": "approve", "method": "GET" }
        ]))
        .unwrap();

        let approve = find_link(&links, "approve").unwrap();
        assert_eq!(approve.href, "https://www.paypal.com/checkoutnow?token=1");
        assert!(find_link(&links, "capture").is_none());
    }
}
