//! Orders and the checkout request that creates them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{Currency, Email, OrderId, ShopItemId};

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ShopItemId,
    /// Size label, absent for one-size products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_params: Vec<String>,
}

/// Promo code applied at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    #[serde(alias = "promo")]
    pub name: String,
    pub discount: Decimal,
}

/// Destination-specific shipping details, tagged by `orderType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "orderType")]
pub enum Shipping {
    /// Delivery inside Ukraine through a Nova Poshta branch.
    #[serde(rename = "ukraine", rename_all = "camelCase")]
    Domestic { nova_poshta: String },
    /// International delivery to a postal address.
    #[serde(rename = "worldwide", rename_all = "camelCase")]
    Worldwide {
        country_city_region: String,
        postal_code: String,
        address: String,
    },
}

/// Destination discriminator as sent by the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "ukraine")]
    Domestic,
    #[serde(rename = "worldwide")]
    Worldwide,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub approved: bool,
    pub items: Vec<LineItem>,
    pub price: Decimal,
    pub currency: Currency,
    pub email: Email,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub agreement: bool,
    #[serde(flatten)]
    pub shipping: Shipping,
    #[serde(default)]
    pub promo: Option<AppliedPromo>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub delivery: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
}

impl Order {
    /// Destination discriminator of this order.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        match self.shipping {
            Shipping::Domestic { .. } => OrderType::Domestic,
            Shipping::Worldwide { .. } => OrderType::Worldwide,
        }
    }

    /// Whether the order ships inside Ukraine.
    #[must_use]
    pub const fn is_domestic(&self) -> bool {
        matches!(self.shipping, Shipping::Domestic { .. })
    }
}

/// Contact and shipping block of the checkout form.
///
/// Which shipping fields are required depends on the request's
/// [`OrderType`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderContact {
    pub email: Email,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub agreement: bool,
    pub currency: Currency,
    #[serde(default)]
    pub nova_poshta: Option<String>,
    #[serde(default)]
    pub country_city_region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub promo: Option<AppliedPromo>,
}

/// Checkout submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<LineItem>,
    pub price: Decimal,
    /// Client-chosen reference, shared with the payment page.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub order_type: OrderType,
    pub order_data: OrderContact,
    #[serde(default)]
    pub promo: Option<AppliedPromo>,
    #[serde(default)]
    pub delivery: Decimal,
    #[serde(default, alias = "utm_source")]
    pub utm_source: Option<String>,
    #[serde(default, alias = "utm_campaign")]
    pub utm_campaign: Option<String>,
}

/// A shipping field required by the order type is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required for {order_type:?} orders")]
pub struct MissingShippingField {
    pub field: &'static str,
    pub order_type: OrderType,
}

impl CreateOrderRequest {
    /// Build the unapproved order this request describes.
    ///
    /// # Errors
    ///
    /// Returns `MissingShippingField` if a field required by the order type
    /// is absent or blank.
    pub fn into_order(
        self,
        order_id: OrderId,
        created_at: DateTime<Utc>,
    ) -> Result<Order, MissingShippingField> {
        let contact = self.order_data;
        let require = |value: Option<String>, field: &'static str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(MissingShippingField {
                    field,
                    order_type: self.order_type,
                })
        };

        let shipping = match self.order_type {
            OrderType::Domestic => Shipping::Domestic {
                nova_poshta: require(contact.nova_poshta, "novaPoshta")?,
            },
            OrderType::Worldwide => Shipping::Worldwide {
                country_city_region: require(contact.country_city_region, "countryCityRegion")?,
                postal_code: require(contact.postal_code, "postalCode")?,
                address: require(contact.address, "address")?,
            },
        };

        Ok(Order {
            order_id,
            approved: false,
            items: self.items,
            price: self.price,
            currency: contact.currency,
            email: contact.email,
            full_name: contact.full_name,
            phone: contact.phone,
            city: contact.city,
            agreement: contact.agreement,
            shipping,
            promo: contact.promo.or(self.promo),
            created_at,
            delivery: self.delivery,
            utm_source: self.utm_source,
            utm_campaign: self.utm_campaign,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn worldwide_request() -> serde_json::Value {
        json!({
            "items": [{ "id": "PROD-003", "size": "M", "title": "Leather Jacket" }],
            "price": 350,
            "orderId": "ORD-100",
            "orderType": "worldwide",
            "orderData": {
                "email": "buyer@example.com",
                "fullName": "Bob Johnson",
                "phone": "+10000000000",
                "city": "New York",
                "countryCityRegion": "United States, New York, NY",
                "postalCode": "10001",
                "address": "123 Main Street",
                "agreement": true,
                "currency": "eur"
            },
            "promo": { "promo": "SUMMER10", "discount": 10 },
            "utm_source": "newsletter"
        })
    }

    #[test]
    fn test_into_order_worldwide() {
        let request: CreateOrderRequest = serde_json::from_value(worldwide_request()).unwrap();
        let order = request
            .into_order(OrderId::new("ORD-100"), Utc::now())
            .unwrap();

        assert!(!order.approved);
        assert_eq!(order.order_type(), OrderType::Worldwide);
        assert_eq!(order.currency, Currency::Eur);
        assert_eq!(order.promo.as_ref().unwrap().name, "SUMMER10");
        assert_eq!(order.utm_source.as_deref(), Some("newsletter"));
    }

    #[test]
    fn test_into_order_requires_shipping_fields() {
        let mut body = worldwide_request();
        body["orderData"]["postalCode"] = json!("  ");
        let request: CreateOrderRequest = serde_json::from_value(body).unwrap();

        let err = request
            .into_order(OrderId::new("ORD-100"), Utc::now())
            .unwrap_err();
        assert_eq!(err.field, "postalCode");
    }

    #[test]
    fn test_domestic_requires_nova_poshta() {
        let mut body = worldwide_request();
        body["orderType"] = json!("ukraine");
        let request: CreateOrderRequest = serde_json::from_value(body).unwrap();

        let err = request
            .into_order(OrderId::new("ORD-100"), Utc::now())
            .unwrap_err();
        assert_eq!(err.field, "novaPoshta");
        assert_eq!(err.order_type, OrderType::Domestic);
    }

    #[test]
    fn test_order_document_is_flat_and_tagged() {
        let request: CreateOrderRequest = serde_json::from_value(worldwide_request()).unwrap();
        let order = request
            .into_order(OrderId::new("ORD-100"), Utc::now())
            .unwrap();

        let doc = serde_json::to_value(&order).unwrap();
        assert_eq!(doc["orderType"], "worldwide");
        assert_eq!(doc["postalCode"], "10001");
        assert_eq!(doc["orderId"], "ORD-100");

        let back: Order = serde_json::from_value(doc).unwrap();
        assert_eq!(back, order);
    }
}
