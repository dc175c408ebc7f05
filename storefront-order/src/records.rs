//! Wire shapes returned by the Order/Return API.
//!
//! These mirror the JSON exactly (camelCase keys, string enums, nullable optionals) so
//! nothing is lost on the way in. Conversion into the typed model is where unknown
//! enum values are caught and payment methods are normalized.

use crate::error::{LifecycleError, LifecycleResult};
use crate::models::{Customer, Order, OrderItem, OrderStatus};
use crate::returns::{ReturnItem, ReturnReason, ReturnRequest, ReturnStatus, ReturnType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{PaymentMethod, PaymentStatus};
use storefront_shared::Masked;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub shipping_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub item_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub items: Vec<OrderItemRecord>,
    pub customer: CustomerRecord,
    #[serde(default)]
    pub tracking_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItemRecord {
    pub product_id: String,
    pub reason: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRecord {
    pub id: String,
    pub order_id: String,
    #[serde(rename = "type")]
    pub return_type: String,
    pub status: String,
    pub items: Vec<ReturnItemRecord>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
}

impl TryFrom<OrderItemRecord> for OrderItem {
    type Error = LifecycleError;

    fn try_from(record: OrderItemRecord) -> LifecycleResult<Self> {
        let item_status = record
            .item_status
            .as_deref()
            .map(|s| OrderStatus::parse_field("item status", s))
            .transpose()?;

        Ok(OrderItem {
            product_id: record.product_id,
            product_name: record.product_name,
            image: record.image,
            unit_price: record.unit_price,
            quantity: record.quantity,
            item_status,
        })
    }
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Customer {
            name: record.name,
            email: Masked::new(record.email),
            phone: record.phone.map(Masked::new),
            shipping_address: record.shipping_address,
        }
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = LifecycleError;

    fn try_from(record: OrderRecord) -> LifecycleResult<Self> {
        let status = OrderStatus::parse(&record.status)?;
        let payment_status = PaymentStatus::parse(&record.payment_status)
            .ok_or_else(|| LifecycleError::unknown("payment status", &record.payment_status))?;
        let payment_method = PaymentMethod::normalize(&record.payment_method);

        if payment_method == PaymentMethod::Other {
            tracing::debug!(
                "Order {} payment method {:?} normalized to other",
                record.id,
                record.payment_method
            );
        }

        let items = record
            .items
            .into_iter()
            .map(OrderItem::try_from)
            .collect::<LifecycleResult<Vec<_>>>()?;

        Ok(Order {
            id: record.id,
            status,
            payment_method,
            payment_status,
            items,
            customer: record.customer.into(),
            tracking_id: record.tracking_id,
            created_at: record.created_at,
        })
    }
}

impl TryFrom<ReturnItemRecord> for ReturnItem {
    type Error = LifecycleError;

    fn try_from(record: ReturnItemRecord) -> LifecycleResult<Self> {
        let reason = ReturnReason::parse(&record.reason)?;
        let quantity = u32::try_from(record.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| LifecycleError::InvalidReturnItem {
                product_id: record.product_id.clone(),
                problem: format!("quantity {} is not positive", record.quantity),
            })?;

        Ok(ReturnItem {
            product_id: record.product_id,
            reason,
            quantity,
        })
    }
}

impl TryFrom<ReturnRecord> for ReturnRequest {
    type Error = LifecycleError;

    fn try_from(record: ReturnRecord) -> LifecycleResult<Self> {
        let return_type = ReturnType::parse(&record.return_type)?;
        let status = ReturnStatus::parse(&record.status)?;
        let items = record
            .items
            .into_iter()
            .map(ReturnItem::try_from)
            .collect::<LifecycleResult<Vec<_>>>()?;

        if let Some(amount) = record.refund_amount.filter(|a| *a < Decimal::ZERO) {
            tracing::warn!("Upstream data fault: return {} refund amount {} is negative", record.id, amount);
            return Err(LifecycleError::NegativeRefund {
                return_id: record.id,
                amount,
            });
        }

        Ok(ReturnRequest {
            id: record.id,
            order_id: record.order_id,
            return_type,
            status,
            items,
            description: record.description,
            admin_notes: record.admin_notes,
            refund_amount: record.refund_amount,
        })
    }
}

/// Parse an order straight from API JSON
pub fn order_from_json(json: &str) -> Result<Order, RecordError> {
    let record: OrderRecord = serde_json::from_str(json)?;
    Ok(Order::try_from(record)?)
}

/// Parse a return request straight from API JSON
pub fn return_from_json(json: &str) -> Result<ReturnRequest, RecordError> {
    let record: ReturnRecord = serde_json::from_str(json)?;
    Ok(ReturnRequest::try_from(record)?)
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "id": "ORD-2024-0042",
        "status": "Shipped",
        "paymentMethod": "Cash on Delivery",
        "paymentStatus": "pending",
        "items": [
            {"productId": "P-1", "productName": "Linen Shirt", "image": null, "unitPrice": "149.50", "quantity": 2},
            {"productId": "P-2", "productName": "Socks", "image": "uploads/socks.jpg", "unitPrice": 49, "quantity": 1, "itemStatus": "delivered"}
        ],
        "customer": {"name": "Asha Rao", "email": "asha@example.com", "phone": null, "shippingAddress": "12 MG Road, Bengaluru"},
        "trackingId": null,
        "createdAt": "2024-05-01T10:15:00Z"
    }"#;

    #[test]
    fn test_order_record_converts() {
        let order = order_from_json(ORDER_JSON).unwrap();

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unit_price, Decimal::new(14950, 2));
        assert_eq!(order.items[0].image, None);
        assert_eq!(order.items[1].item_status, Some(OrderStatus::Delivered));
        assert_eq!(order.customer.phone, None);
        assert_eq!(order.customer.email.expose(), "asha@example.com");
        assert_eq!(order.tracking_id, None);
    }

    #[test]
    fn test_absent_optionals_are_none() {
        let json = ORDER_JSON.replace("\"trackingId\": null,", "");
        let order = order_from_json(&json).unwrap();
        assert_eq!(order.tracking_id, None);
    }

    #[test]
    fn test_unknown_order_status_is_fault() {
        let json = ORDER_JSON.replace("\"Shipped\"", "\"out_for_delivery\"");

        match order_from_json(&json) {
            Err(RecordError::Lifecycle(LifecycleError::UnknownStatus { field, value })) => {
                assert_eq!(field, "status");
                assert_eq!(value, "out_for_delivery");
            }
            other => panic!("expected UnknownStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_payment_status_is_fault() {
        let json = ORDER_JSON.replace("\"pending\"", "\"refunded\"");
        assert!(matches!(
            order_from_json(&json),
            Err(RecordError::Lifecycle(LifecycleError::UnknownStatus { field: "payment status", .. }))
        ));
    }

    #[test]
    fn test_unknown_item_status_is_fault() {
        let json = ORDER_JSON.replace("\"delivered\"", "\"lost\"");
        assert!(matches!(
            order_from_json(&json),
            Err(RecordError::Lifecycle(LifecycleError::UnknownStatus { field: "item status", .. }))
        ));
    }

    #[test]
    fn test_return_record_converts() {
        let request = return_from_json(
            r#"{
                "id": "RET-7",
                "orderId": "ORD-2024-0042",
                "type": "exchange",
                "status": "approved",
                "items": [{"productId": "P-1", "reason": "size_issue", "quantity": 1}],
                "description": "need a larger size",
                "adminNotes": null,
                "refundAmount": null
            }"#,
        )
        .unwrap();

        assert_eq!(request.return_type, ReturnType::Exchange);
        assert_eq!(request.status, ReturnStatus::Approved);
        assert_eq!(request.items[0].reason, ReturnReason::SizeIssue);
        assert_eq!(request.refund_amount, None);
        assert_eq!(request.admin_notes, None);
    }

    #[test]
    fn test_negative_refund_is_fault() {
        let err = return_from_json(
            r#"{
                "id": "RET-8",
                "orderId": "ORD-2024-0042",
                "type": "return",
                "status": "completed",
                "items": [{"productId": "P-1", "reason": "damaged", "quantity": 1}],
                "refundAmount": "-100"
            }"#,
        )
        .unwrap_err();

        match err {
            RecordError::Lifecycle(err) => {
                assert!(err.is_data_fault());
                assert_eq!(
                    err,
                    LifecycleError::NegativeRefund {
                        return_id: "RET-8".to_string(),
                        amount: Decimal::from(-100),
                    }
                );
            }
            other => panic!("expected a lifecycle fault, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(order_from_json("{"), Err(RecordError::Malformed(_))));
    }
}
