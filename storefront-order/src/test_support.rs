use crate::models::{Customer, Order, OrderItem, OrderStatus};
use crate::returns::{ReturnItem, ReturnReason, ReturnRequest, ReturnStatus, ReturnType};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use storefront_core::{PaymentMethod, PaymentStatus};
use storefront_shared::Masked;

/// Order with lines given as (whole-rupee price, quantity); product ids are P-1, P-2, ...
pub fn order_with(
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    lines: &[(i64, i64)],
) -> Order {
    Order {
        id: "ORD-1001".to_string(),
        status,
        payment_method,
        payment_status,
        items: lines
            .iter()
            .enumerate()
            .map(|(idx, (price, qty))| {
                OrderItem::new(format!("P-{}", idx + 1), format!("Product {}", idx + 1), Decimal::from(*price), *qty)
            })
            .collect(),
        customer: Customer {
            name: "Asha Rao".to_string(),
            email: Masked::new("asha@example.com".to_string()),
            phone: None,
            shipping_address: "12 MG Road, Bengaluru 560001".to_string(),
        },
        tracking_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap(),
    }
}

/// Return covering one unit of the order's first line
pub fn return_for(order: &Order, status: ReturnStatus, refund_amount: Option<Decimal>) -> ReturnRequest {
    ReturnRequest {
        id: "RET-1".to_string(),
        order_id: order.id.clone(),
        return_type: ReturnType::Return,
        status,
        items: vec![ReturnItem {
            product_id: order.items[0].product_id.clone(),
            reason: ReturnReason::Damaged,
            quantity: 1,
        }],
        description: None,
        admin_notes: None,
        refund_amount,
    }
}
