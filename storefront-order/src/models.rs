use crate::error::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storefront_core::{PaymentMethod, PaymentStatus};
use storefront_shared::Masked;

/// Order status in the fulfillment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The forward path, in order. `Cancelled` is a side exit and not on it.
    pub const FORWARD: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    /// Strict parse of an upstream status string. Unrecognized values are a data
    /// fault and are never defaulted to `Pending`.
    pub fn parse(raw: &str) -> LifecycleResult<Self> {
        Self::parse_field("status", raw)
    }

    pub(crate) fn parse_field(field: &'static str, raw: &str) -> LifecycleResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(LifecycleError::unknown(field, raw)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who placed the order and where it goes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Option<Masked<String>>,
    pub shipping_address: String,
}

/// A product line within an order. Prices are fixed when the order is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    /// Opaque media reference, resolved by the media service
    pub image: Option<String>,
    pub unit_price: Decimal,
    /// Kept signed so bad upstream data can be represented and reported
    pub quantity: i64,
    /// Per-item override of the order status
    pub item_status: Option<OrderStatus>,
}

impl OrderItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: Decimal,
        quantity: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            image: None,
            unit_price,
            quantity,
            item_status: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.item_status = Some(status);
        self
    }

    /// The item's own status, falling back to the order's
    pub fn effective_status(&self, order_status: OrderStatus) -> OrderStatus {
        self.item_status.unwrap_or(order_status)
    }
}

/// The single source of truth for a customer's purchase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Insertion order is invoice line order
    pub items: Vec<OrderItem>,
    pub customer: Customer,
    pub tracking_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Find a line by product id
    pub fn item(&self, product_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Total units across all lines, saturating on absurd upstream quantities
    pub fn unit_count(&self) -> i64 {
        self.items.iter().fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_strict() {
        assert_eq!(OrderStatus::parse("Delivered").unwrap(), OrderStatus::Delivered);
        assert_eq!(" shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::parse("canceled").unwrap(), OrderStatus::Cancelled);

        let err = OrderStatus::parse("on_hold").unwrap_err();
        assert_eq!(
            err,
            LifecycleError::UnknownStatus {
                field: "status",
                value: "on_hold".to_string()
            }
        );
        assert!(err.is_data_fault());
    }

    #[test]
    fn test_empty_status_is_not_pending() {
        assert!(OrderStatus::parse("").is_err());
    }

    #[test]
    fn test_item_status_falls_back_to_order() {
        let item = OrderItem::new("P-1", "Kurta", Decimal::from(499), 1);
        assert_eq!(item.effective_status(OrderStatus::Shipped), OrderStatus::Shipped);

        let item = item.with_status(OrderStatus::Delivered);
        assert_eq!(item.effective_status(OrderStatus::Shipped), OrderStatus::Delivered);
    }

    #[test]
    fn test_unit_count_saturates() {
        let order = Order {
            id: "ORD-1".to_string(),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Pending,
            items: vec![
                OrderItem::new("P-1", "Socks", Decimal::ZERO, i64::MAX),
                OrderItem::new("P-2", "Socks", Decimal::ZERO, i64::MAX),
            ],
            customer: Customer {
                name: "Asha".to_string(),
                email: Masked::new("asha@example.com".to_string()),
                phone: None,
                shipping_address: "Chennai".to_string(),
            },
            tracking_id: None,
            created_at: DateTime::<Utc>::default(),
        };

        assert_eq!(order.unit_count(), i64::MAX);
    }
}
