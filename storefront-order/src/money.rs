use crate::error::{LifecycleError, LifecycleResult, LineItemProblem};
use crate::models::OrderItem;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use storefront_core::ShippingPolicy;

/// Label every shipping-inclusive total carries. There is no tax line.
pub const TOTAL_NOTE: &str = "includes shipping, no tax";

/// Subtotal, shipping and grand total for one order, at full precision.
///
/// Every view (list, detail, tracking, invoice) renders these exact values.
/// Rounding happens only in [`OrderTotals::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub is_free_shipping: bool,
    pub total: Decimal,
}

/// Display-ready strings, two decimal places
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTotals {
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub note: &'static str,
}

impl OrderTotals {
    pub fn display(&self) -> DisplayTotals {
        DisplayTotals {
            subtotal: format_amount(self.subtotal),
            shipping_fee: if self.is_free_shipping {
                "Free".to_string()
            } else {
                format_amount(self.shipping_fee)
            },
            total: format_amount(self.total),
            note: TOTAL_NOTE,
        }
    }
}

/// unit price × quantity, rejecting negative prices and non-positive quantities
pub fn line_total(item: &OrderItem) -> LifecycleResult<Decimal> {
    let invalid = |problem| LifecycleError::InvalidLineItem {
        product_id: item.product_id.clone(),
        problem,
    };

    if item.unit_price < Decimal::ZERO {
        return Err(invalid(LineItemProblem::NegativePrice(item.unit_price)));
    }
    if item.quantity <= 0 {
        return Err(invalid(LineItemProblem::NonPositiveQuantity(item.quantity)));
    }

    item.unit_price
        .checked_mul(Decimal::from(item.quantity))
        .ok_or_else(|| invalid(LineItemProblem::AmountOverflow))
}

/// Compute the order's totals under the given shipping policy.
///
/// An empty item list is valid: the subtotal is zero and the flat fee still applies.
pub fn compute_totals(items: &[OrderItem], policy: &ShippingPolicy) -> LifecycleResult<OrderTotals> {
    let mut subtotal = Decimal::ZERO;

    for item in items {
        let line = line_total(item).inspect_err(|e| {
            tracing::warn!("Rejecting order totals: {}", e);
        })?;
        subtotal = subtotal
            .checked_add(line)
            .ok_or_else(|| LifecycleError::InvalidLineItem {
                product_id: item.product_id.clone(),
                problem: LineItemProblem::AmountOverflow,
            })?;
    }

    let is_free_shipping = policy.qualifies_for_free_shipping(subtotal);
    let shipping_fee = policy.fee_for(subtotal);
    let total = subtotal + shipping_fee;

    tracing::debug!(
        "Computed totals over {} lines: subtotal {}, shipping {}, total {}",
        items.len(),
        subtotal,
        shipping_fee,
        total
    );

    Ok(OrderTotals {
        subtotal,
        shipping_fee,
        is_free_shipping,
        total,
    })
}

/// Round half away from zero to paise
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `₹300.00` style rendering
pub fn format_amount(amount: Decimal) -> String {
    format!("₹{:.2}", round_for_display(amount))
}
