//! # Order Types
//!
//! Request and response shapes for the Orders v2 API. Only the fields the
//! client works with are typed; payment sources and other deeply nested
//! objects are carried as raw JSON so nothing PayPal returns is lost.

use crate::payments::{Authorization, Capture, Refund};
use crate::shared::{
    find_link, Amount, AmountWithBreakdown, HateoasLink, Name, Phone, PostalAddress,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether to capture immediately or authorize for later capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutIntent {
    Capture,
    Authorize,
}

impl Default for CheckoutIntent {
    fn default() -> Self {
        CheckoutIntent::Capture
    }
}

/// Order status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Saved,
    Approved,
    Voided,
    Completed,
    PayerActionRequired,
    #[serde(other)]
    Unknown,
}

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    DigitalGoods,
    PhysicalGoods,
    Donation,
}

/// An item in a purchase unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Whole number, as a string
    pub quantity: String,
    pub unit_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Amount>,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u32, unit_amount: Amount) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.to_string(),
            unit_amount,
            description: None,
            sku: None,
            category: None,
            tax: None,
        }
    }
}

/// The merchant who receives the funds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

/// Name and address of the person the items ship to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    /// `SHIPPING` or `PICKUP_IN_PERSON`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub shipping_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    /// Trackers attached to this purchase unit (response only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trackers: Vec<Value>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payments made against a purchase unit (response only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentCollection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizations: Vec<Authorization>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<Capture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refunds: Vec<Refund>,
}

/// A purchase unit: one contract between payer and payee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    pub amount: AmountWithBreakdown,
    /// Required for PATCH when an order has several purchase units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Payee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_instruction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentCollection>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PurchaseUnit {
    pub fn new(amount: AmountWithBreakdown) -> Self {
        Self {
            amount,
            reference_id: None,
            description: None,
            custom_id: None,
            invoice_id: None,
            soft_descriptor: None,
            items: Vec::new(),
            payee: None,
            payment_instruction: None,
            shipping: None,
            payments: None,
            extra: Map::new(),
        }
    }

    pub fn with_reference_id(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}

/// The customer who approves and pays for the order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<PayerPhone>,
    /// YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerPhone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
    pub phone_number: Phone,
}

/// Customizes the payer experience during approval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    /// `GET_FROM_FILE`, `NO_SHIPPING` or `SET_PROVIDED_ADDRESS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    /// `LOGIN`, `GUEST_CHECKOUT` or `NO_PREFERENCE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<String>,
    /// `CONTINUE` or `PAY_NOW`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_action: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /v2/checkout/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub intent: CheckoutIntent,
    /// 1 to 10 purchase units
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    /// Payment source definition, passed through as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ExperienceContext>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateOrderRequest {
    pub fn new(intent: CheckoutIntent) -> Self {
        Self {
            intent,
            purchase_units: Vec::new(),
            payer: None,
            payment_source: None,
            application_context: None,
            extra: Map::new(),
        }
    }

    pub fn with_purchase_unit(mut self, unit: PurchaseUnit) -> Self {
        self.purchase_units.push(unit);
        self
    }

    pub fn with_payer(mut self, payer: Payer) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_payment_source(mut self, payment_source: Value) -> Self {
        self.payment_source = Some(payment_source);
        self
    }

    pub fn with_application_context(mut self, context: ExperienceContext) -> Self {
        self.application_context = Some(context);
        self
    }
}

/// Body of `POST /v2/checkout/orders/{id}/capture`.
///
/// Serializes to `{}` when empty; PayPal rejects a capture without a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<Value>,
}

/// An order as returned by PayPal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<CheckoutIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<HateoasLink>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// URL the payer must visit to approve the order
    pub fn approve_url(&self) -> Option<&str> {
        find_link(&self.links, "approve")
            .or_else(|| find_link(&self.links, "payer-action"))
            .map(|link| link.href.as_str())
    }

    /// All captures across purchase units
    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.purchase_units
            .iter()
            .filter_map(|unit| unit.payments.as_ref())
            .flat_map(|payments| payments.captures.iter())
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::CaptureStatus;
    use serde_json::json;

    #[test]
    fn test_create_order_request_shape() {
        let request = CreateOrderRequest::new(CheckoutIntent::Capture).with_purchase_unit(
            PurchaseUnit::new(AmountWithBreakdown::new("USD", "100.00"))
                .with_reference_id("d9f80740-38f0-11e8-b467-0ed5f89f718b"),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["intent"], "CAPTURE");
        assert_eq!(value["purchase_units"][0]["amount"]["value"], "100.00");
        assert!(value.get("payer").is_none());
        assert!(value["purchase_units"][0].get("items").is_none());
    }

    #[test]
    fn test_create_order_request_keeps_unmodelled_fields() {
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": { "currency_code": "USD", "value": "100.00" },
                "supplementary_data": { "card": { "level_2": { "invoice_id": "INV-7" } } },
                "shipping": {
                    "options": [{ "id": "SHIP_1", "label": "Ground", "selected": true }]
                }
            }],
            "application_context": { "brand_name": "Acme", "payment_method": { "payee_preferred": "IMMEDIATE_PAYMENT_REQUIRED" } }
        });

        let request: CreateOrderRequest = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(request.purchase_units[0].amount.value, "100.00");
        assert!(request.purchase_units[0].extra.contains_key("supplementary_data"));

        assert_eq!(serde_json::to_value(&request).unwrap(), body);
    }

    #[test]
    fn test_empty_capture_request_is_object() {
        let body = serde_json::to_string(&CaptureOrderRequest::default()).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_parse_captured_order() {
        let order: Order = serde_json::from_value(json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "payment_source": { "paypal": { "email_address": "buyer@example.com" } },
            "purchase_units": [{
                "reference_id": "default",
                "amount": { "currency_code": "USD", "value": "100.00" },
                "payments": {
                    "captures": [{
                        "id": "3C679366HH908993F",
                        "status": "COMPLETED",
                        "amount": { "currency_code": "USD", "value": "100.00" },
                        "final_capture": true
                    }]
                }
            }],
            "links": [
                { "href": "https://api-m.paypal.com/v2/checkout/orders/5O190127TN364715T", "rel": "self", "method": "GET" }
            ],
            "create_time": "2018-04-01T21:18:49Z"
        }))
        .unwrap();

        assert!(order.is_completed());
        let captures: Vec<_> = order.captures().collect();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].status, Some(CaptureStatus::Completed));
        assert!(order.approve_url().is_none());
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let order: Order = serde_json::from_value(json!({
            "id": "8XK12345",
            "status": "SOMETHING_NEW",
            "gross_amount": { "currency_code": "EUR", "value": "5.00" }
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(order.extra.contains_key("gross_amount"));
    }
}
