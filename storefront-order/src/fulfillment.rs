use crate::error::{LifecycleError, LifecycleResult};
use crate::models::{Order, OrderStatus};
use crate::money::{compute_totals, OrderTotals};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use storefront_core::ShippingPolicy;
use storefront_shared::{LifecycleSignal, OrderCancelledEvent};

/// State changes the fulfillment machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentAction {
    Confirm,
    Ship,
    Deliver,
    Cancel,
}

impl FulfillmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentAction::Confirm => "confirm",
            FulfillmentAction::Ship => "ship",
            FulfillmentAction::Deliver => "deliver",
            FulfillmentAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for FulfillmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply an action to a status.
///
/// Pending → Confirmed → Shipped → Delivered, plus Pending → Cancelled.
/// Everything else is an `IllegalTransition`.
pub fn advance(current: OrderStatus, action: FulfillmentAction) -> LifecycleResult<OrderStatus> {
    use FulfillmentAction::*;
    use OrderStatus::*;

    match (current, action) {
        (Pending, Confirm) => Ok(Confirmed),
        (Confirmed, Ship) => Ok(Shipped),
        (Shipped, Deliver) => Ok(Delivered),
        (Pending, Cancel) => Ok(Cancelled),
        (from, Cancel) => Err(LifecycleError::IllegalTransition {
            from: from.to_string(),
            action: Cancel.as_str(),
            reason: cancel_refusal(from).to_string(),
        }),
        (from, action) => Err(LifecycleError::IllegalTransition {
            from: from.to_string(),
            action: action.as_str(),
            reason: format!("order is {} and cannot be moved by '{}'", from, action),
        }),
    }
}

fn cancel_refusal(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed | OrderStatus::Shipped => {
            "cannot cancel order that is already confirmed/shipped"
        }
        OrderStatus::Delivered => "cannot cancel order that has already been delivered",
        OrderStatus::Cancelled => "order is already cancelled",
        OrderStatus::Pending => "order can be cancelled",
    }
}

/// A validated, non-blank cancellation reason.
///
/// Blank input is rejected here, before the state machine is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationReason(String);

impl CancellationReason {
    pub fn parse(raw: &str) -> LifecycleResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LifecycleError::MissingCancellationReason);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of an accepted cancellation: the new status and the signal for the notification layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub status: OrderStatus,
    pub event: OrderCancelledEvent,
}

impl Cancellation {
    pub fn signal(&self) -> LifecycleSignal {
        LifecycleSignal::OrderCancelled(self.event.clone())
    }
}

pub fn can_cancel(order: &Order) -> bool {
    order.status == OrderStatus::Pending
}

/// Customer cancellation. Only pending orders can be cancelled.
pub fn cancel(order: &Order, reason: &CancellationReason) -> LifecycleResult<Cancellation> {
    let status = advance(order.status, FulfillmentAction::Cancel)?;

    tracing::info!("Order {} cancelled from {}: {}", order.id, order.status, reason.as_str());

    Ok(Cancellation {
        status,
        event: OrderCancelledEvent {
            order_id: order.id.clone(),
            previous_status: order.status.to_string(),
            reason: reason.as_str().to_string(),
        },
    })
}

/// Position on the forward path: pending 0 through delivered 3. Cancelled has none.
pub fn progress_index(status: OrderStatus) -> Option<usize> {
    OrderStatus::FORWARD.iter().position(|s| *s == status)
}

/// What a timeline node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStage {
    Placed,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Return,
    Exchange,
}

/// How a node should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTone {
    Done,
    Active,
    Upcoming,
    Failure,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineNode {
    pub stage: TimelineStage,
    pub label: String,
    pub description: String,
    /// Counts toward the progress bar
    pub completed: bool,
    /// Where the order currently is
    pub current: bool,
    pub tone: NodeTone,
    pub refund_amount: Option<Decimal>,
}

/// Ordered progress nodes plus the totals shown next to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub nodes: Vec<TimelineNode>,
    pub totals: OrderTotals,
}

impl Timeline {
    pub fn current(&self) -> Option<&TimelineNode> {
        self.nodes.iter().find(|n| n.current)
    }

    pub fn completed_steps(&self) -> usize {
        self.nodes.iter().filter(|n| n.completed).count()
    }

    /// Share of nodes completed, 0 to 100
    pub fn progress_percent(&self) -> u8 {
        if self.nodes.is_empty() {
            return 0;
        }
        ((self.completed_steps() * 100) / self.nodes.len()) as u8
    }
}

fn forward_copy(stage: TimelineStage) -> (&'static str, &'static str) {
    match stage {
        TimelineStage::Placed => ("Order placed", "We have received your order"),
        TimelineStage::Confirmed => ("Order confirmed", "The seller has confirmed your order"),
        TimelineStage::Shipped => ("Shipped", "Your order is on its way"),
        TimelineStage::Delivered => ("Delivered", "Your order has been delivered"),
        TimelineStage::Cancelled => ("Order cancelled", "This order was cancelled"),
        TimelineStage::Return | TimelineStage::Exchange => ("", ""),
    }
}

fn stage_for(status: OrderStatus) -> TimelineStage {
    match status {
        OrderStatus::Pending => TimelineStage::Placed,
        OrderStatus::Confirmed => TimelineStage::Confirmed,
        OrderStatus::Shipped => TimelineStage::Shipped,
        OrderStatus::Delivered => TimelineStage::Delivered,
        OrderStatus::Cancelled => TimelineStage::Cancelled,
    }
}

fn node(stage: TimelineStage, completed: bool, current: bool, tone: NodeTone) -> TimelineNode {
    let (label, description) = forward_copy(stage);
    TimelineNode {
        stage,
        label: label.to_string(),
        description: description.to_string(),
        completed,
        current,
        tone,
        refund_amount: None,
    }
}

/// Fulfillment nodes for a status, without any return step.
pub fn fulfillment_nodes(status: OrderStatus) -> Vec<TimelineNode> {
    match progress_index(status) {
        Some(current) => OrderStatus::FORWARD
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let tone = if idx == current {
                    NodeTone::Active
                } else if idx < current {
                    NodeTone::Done
                } else {
                    NodeTone::Upcoming
                };
                node(stage_for(*s), idx <= current, idx == current, tone)
            })
            .collect(),
        // Cancellation only ever happens from pending
        None => vec![
            node(TimelineStage::Placed, true, false, NodeTone::Done),
            node(TimelineStage::Cancelled, false, true, NodeTone::Failure),
        ],
    }
}

/// The order's fulfillment timeline with totals
pub fn timeline(order: &Order, policy: &ShippingPolicy) -> LifecycleResult<Timeline> {
    let totals = compute_totals(&order.items, policy)?;
    Ok(Timeline {
        nodes: fulfillment_nodes(order.status),
        totals,
    })
}
