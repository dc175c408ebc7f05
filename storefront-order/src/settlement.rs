use crate::error::LifecycleResult;
use crate::models::{Order, OrderStatus};
use crate::money::{compute_totals, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{PaymentMethod, PaymentStatus, ShippingPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    Settled,
    Due,
    Pending,
    Failed,
}

/// The derived payment state shown to the user.
///
/// This is the only place payment badges and payment text come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerdict {
    pub state: SettlementState,
    pub method: PaymentMethod,
    /// Set only for cash on delivery that has not been collected yet
    pub amount_due: Option<Decimal>,
}

impl PaymentVerdict {
    pub fn badge(&self) -> &'static str {
        match self.state {
            SettlementState::Settled => "Paid",
            SettlementState::Due => "Payment due",
            SettlementState::Pending => "Payment pending",
            SettlementState::Failed => "Payment failed",
        }
    }

    pub fn description(&self) -> String {
        match (self.state, self.amount_due) {
            (SettlementState::Settled, _) if self.method.is_cash_on_delivery() => {
                "cash on delivery — collected".to_string()
            }
            (SettlementState::Settled, _) => format!("paid via {}", self.method),
            (SettlementState::Due, Some(amount)) => {
                format!("cash on delivery — {} due on delivery", format_amount(amount))
            }
            (SettlementState::Due, None) => "cash on delivery — due on delivery".to_string(),
            (SettlementState::Pending, _) => format!("payment via {} pending", self.method),
            (SettlementState::Failed, _) => format!("payment via {} failed", self.method),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state == SettlementState::Settled
    }
}

/// Settlement verdict from payment method, payment status and fulfillment status.
///
/// Cash on delivery is collected on delivery, so it is settled exactly when the order
/// is delivered and otherwise due for the full order total. Online methods follow the
/// recorded payment status.
pub fn payment_verdict(order: &Order, policy: &ShippingPolicy) -> LifecycleResult<PaymentVerdict> {
    let method = order.payment_method;

    let verdict = if method.is_cash_on_delivery() {
        if order.status == OrderStatus::Delivered {
            PaymentVerdict {
                state: SettlementState::Settled,
                method,
                amount_due: None,
            }
        } else {
            let totals = compute_totals(&order.items, policy)?;
            PaymentVerdict {
                state: SettlementState::Due,
                method,
                amount_due: Some(totals.total),
            }
        }
    } else {
        let state = match order.payment_status {
            PaymentStatus::Paid => SettlementState::Settled,
            PaymentStatus::Failed => SettlementState::Failed,
            PaymentStatus::Pending => SettlementState::Pending,
        };
        PaymentVerdict {
            state,
            method,
            amount_due: None,
        }
    };

    Ok(verdict)
}
