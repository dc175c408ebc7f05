//! Property-based tests for the money model and payment verdict.

use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront_core::{PaymentMethod, PaymentStatus, ShippingPolicy};
use storefront_order::models::Customer;
use storefront_order::returns::overlay;
use storefront_order::{
    compute_totals, payment_verdict, Order, OrderItem, OrderStatus, ReturnRequest, ReturnStatus,
    ReturnType, SettlementState,
};
use storefront_shared::Masked;

fn lines_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    // (price in paise, quantity)
    prop::collection::vec((0i64..5_000_000, 1i64..50), 0..12)
}

fn items(lines: &[(i64, i64)]) -> Vec<OrderItem> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, (paise, qty))| OrderItem::new(format!("P-{}", idx), "Item", Decimal::new(*paise, 2), *qty))
        .collect()
}

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::Confirmed),
        Just(OrderStatus::Shipped),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Cancelled),
    ]
}

fn return_status_strategy() -> impl Strategy<Value = ReturnStatus> {
    prop_oneof![
        Just(ReturnStatus::Requested),
        Just(ReturnStatus::Approved),
        Just(ReturnStatus::Processing),
        Just(ReturnStatus::Rejected),
        Just(ReturnStatus::Completed),
        Just(ReturnStatus::Cancelled),
    ]
}

fn order(status: OrderStatus, method: PaymentMethod, payment: PaymentStatus, lines: &[(i64, i64)]) -> Order {
    Order {
        id: "ORD-PROP".to_string(),
        status,
        payment_method: method,
        payment_status: payment,
        items: items(lines),
        customer: Customer {
            name: "Meera".to_string(),
            email: Masked::new("meera@example.com".to_string()),
            phone: None,
            shipping_address: "Pune".to_string(),
        },
        tracking_id: None,
        created_at: chrono::DateTime::from_timestamp(1_717_000_000, 0).unwrap_or_default(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Subtotal is exactly the sum of line totals, checked against integer paise
    #[test]
    fn prop_subtotal_is_exact_sum(lines in lines_strategy()) {
        let totals = compute_totals(&items(&lines), &ShippingPolicy::STANDARD).unwrap();
        let paise: i64 = lines.iter().map(|(p, q)| p * q).sum();

        prop_assert_eq!(totals.subtotal, Decimal::new(paise, 2));
    }

    /// Total is subtotal plus shipping, and free shipping tracks the threshold
    #[test]
    fn prop_total_and_threshold(lines in lines_strategy()) {
        let totals = compute_totals(&items(&lines), &ShippingPolicy::STANDARD).unwrap();

        prop_assert_eq!(totals.total, totals.subtotal + totals.shipping_fee);
        prop_assert_eq!(totals.is_free_shipping, totals.subtotal >= Decimal::from(299));
        if totals.is_free_shipping {
            prop_assert_eq!(totals.shipping_fee, Decimal::ZERO);
        } else {
            prop_assert_eq!(totals.shipping_fee, Decimal::from(50));
        }
    }

    /// Online payments follow payment status regardless of fulfillment status
    #[test]
    fn prop_online_verdict_ignores_fulfillment(
        status in status_strategy(),
        lines in lines_strategy(),
    ) {
        let policy = ShippingPolicy::STANDARD;
        let paid = payment_verdict(&order(status, PaymentMethod::Card, PaymentStatus::Paid, &lines), &policy).unwrap();
        let failed = payment_verdict(&order(status, PaymentMethod::Card, PaymentStatus::Failed, &lines), &policy).unwrap();
        let pending = payment_verdict(&order(status, PaymentMethod::Card, PaymentStatus::Pending, &lines), &policy).unwrap();

        prop_assert_eq!(paid.state, SettlementState::Settled);
        prop_assert_eq!(failed.state, SettlementState::Failed);
        prop_assert_eq!(pending.state, SettlementState::Pending);
    }

    /// Cash on delivery is due for the full total until delivered
    #[test]
    fn prop_cod_due_matches_total(status in status_strategy(), lines in lines_strategy()) {
        let policy = ShippingPolicy::STANDARD;
        let order = order(status, PaymentMethod::CashOnDelivery, PaymentStatus::Pending, &lines);
        let verdict = payment_verdict(&order, &policy).unwrap();

        if status == OrderStatus::Delivered {
            prop_assert_eq!(verdict.state, SettlementState::Settled);
            prop_assert_eq!(verdict.amount_due, None);
        } else {
            let totals = compute_totals(&order.items, &policy).unwrap();
            prop_assert_eq!(verdict.state, SettlementState::Due);
            prop_assert_eq!(verdict.amount_due, Some(totals.total));
        }
    }

    /// Overlay is a pure function of its inputs
    #[test]
    fn prop_overlay_is_idempotent(
        return_status in return_status_strategy(),
        refund in proptest::option::of(0i64..100_000),
        lines in lines_strategy(),
    ) {
        let order = order(OrderStatus::Delivered, PaymentMethod::Upi, PaymentStatus::Paid, &lines);
        let request = ReturnRequest {
            id: "RET-P".to_string(),
            order_id: order.id.clone(),
            return_type: ReturnType::Exchange,
            status: return_status,
            items: vec![],
            description: None,
            admin_notes: None,
            refund_amount: refund.map(|p| Decimal::new(p, 2)),
        };

        let first = overlay(&order, Some(&request), &ShippingPolicy::STANDARD).unwrap();
        let second = overlay(&order, Some(&request), &ShippingPolicy::STANDARD).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.nodes.len(), 5);
        prop_assert!(first.nodes.iter().filter(|n| n.current).count() <= 1);
    }
}
