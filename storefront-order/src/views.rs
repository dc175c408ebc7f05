use crate::error::LifecycleResult;
use crate::fulfillment::{self, Timeline};
use crate::models::{Order, OrderStatus};
use crate::money::{line_total, DisplayTotals, OrderTotals, TOTAL_NOTE};
use crate::returns::{self, ReturnRequest, ReturnStatus, ReturnType};
use crate::settlement::{payment_verdict, PaymentVerdict};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::LifecyclePolicy;
use storefront_shared::Masked;

/// Everything derived about one order, computed once. Each page projects from this,
/// so the numbers and badges on the list, detail, tracking and invoice pages agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLifecycle {
    pub order_id: String,
    pub status: OrderStatus,
    pub totals: OrderTotals,
    pub verdict: PaymentVerdict,
    pub timeline: Timeline,
    pub can_cancel: bool,
    pub can_request_return: bool,
    pub return_summary: Option<ReturnSummary>,
}

/// The parts of a return request the order pages show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnSummary {
    pub return_type: ReturnType,
    pub status: ReturnStatus,
    pub refund_amount: Option<Decimal>,
    pub can_cancel: bool,
}

impl OrderLifecycle {
    pub fn derive(
        order: &Order,
        request: Option<&ReturnRequest>,
        policy: &LifecyclePolicy,
    ) -> LifecycleResult<Self> {
        let timeline = returns::overlay(order, request, &policy.shipping)?;
        let verdict = payment_verdict(order, &policy.shipping)?;

        Ok(Self {
            order_id: order.id.clone(),
            status: order.status,
            totals: timeline.totals,
            verdict,
            can_cancel: fulfillment::can_cancel(order),
            can_request_return: returns::can_request_return(order, request, policy.rerequest_rule),
            return_summary: request.map(|r| ReturnSummary {
                return_type: r.return_type,
                status: r.status,
                refund_amount: r.refund_amount,
                can_cancel: returns::cancel_return(r).is_ok(),
            }),
            timeline,
        })
    }
}

/// One invoice or detail line, with its total already computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub product_id: String,
    pub product_name: String,
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub line_total: Decimal,
    pub status: OrderStatus,
}

fn line_views(order: &Order) -> LifecycleResult<Vec<LineView>> {
    order
        .items
        .iter()
        .map(|item| -> LifecycleResult<LineView> {
            Ok(LineView {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                image: item.image.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: line_total(item)?,
                status: item.effective_status(order.status),
            })
        })
        .collect()
}

/// One row of the customer's order list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListRow {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
    pub total: String,
    pub status_label: &'static str,
    pub payment_badge: &'static str,
    pub can_cancel: bool,
    pub can_request_return: bool,
}

impl OrderListRow {
    pub fn project(order: &Order, lifecycle: &OrderLifecycle) -> Self {
        Self {
            order_id: order.id.clone(),
            created_at: order.created_at,
            item_count: order.unit_count(),
            total: lifecycle.totals.display().total,
            status_label: order.status.label(),
            payment_badge: lifecycle.verdict.badge(),
            can_cancel: lifecycle.can_cancel,
            can_request_return: lifecycle.can_request_return,
        }
    }
}

/// Order detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetailView {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<LineView>,
    pub totals: DisplayTotals,
    pub payment_badge: &'static str,
    pub payment_description: String,
    pub lifecycle: OrderLifecycle,
}

impl OrderDetailView {
    pub fn project(order: &Order, lifecycle: &OrderLifecycle) -> LifecycleResult<Self> {
        Ok(Self {
            order_id: order.id.clone(),
            created_at: order.created_at,
            lines: line_views(order)?,
            totals: lifecycle.totals.display(),
            payment_badge: lifecycle.verdict.badge(),
            payment_description: lifecycle.verdict.description(),
            lifecycle: lifecycle.clone(),
        })
    }
}

/// Tracking page: where the order is and where it is going
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingView {
    pub order_id: String,
    pub tracking_id: Option<String>,
    pub shipping_address: String,
    pub timeline: Timeline,
    pub progress_percent: u8,
}

impl TrackingView {
    pub fn project(order: &Order, lifecycle: &OrderLifecycle) -> Self {
        Self {
            order_id: order.id.clone(),
            tracking_id: order.tracking_id.clone(),
            shipping_address: order.customer.shipping_address.clone(),
            progress_percent: lifecycle.timeline.progress_percent(),
            timeline: lifecycle.timeline.clone(),
        }
    }
}

/// What the print renderer consumes verbatim. It must not recompute anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceView {
    pub order_id: String,
    pub issued_for: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: Masked<String>,
    pub shipping_address: String,
    pub lines: Vec<LineView>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub is_free_shipping: bool,
    pub total: Decimal,
    pub display: DisplayTotals,
    pub total_note: &'static str,
    pub payment_badge: &'static str,
    pub payment_description: String,
}

impl InvoiceView {
    pub fn project(order: &Order, lifecycle: &OrderLifecycle) -> LifecycleResult<Self> {
        let totals = lifecycle.totals;

        Ok(Self {
            order_id: order.id.clone(),
            issued_for: order.created_at,
            customer_name: order.customer.name.clone(),
            customer_email: order.customer.email.clone(),
            shipping_address: order.customer.shipping_address.clone(),
            lines: line_views(order)?,
            subtotal: totals.subtotal,
            shipping_fee: totals.shipping_fee,
            is_free_shipping: totals.is_free_shipping,
            total: totals.total,
            display: totals.display(),
            total_note: TOTAL_NOTE,
            payment_badge: lifecycle.verdict.badge(),
            payment_description: lifecycle.verdict.description(),
        })
    }
}
