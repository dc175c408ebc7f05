use crate::error::{LifecycleError, LifecycleResult};
use crate::fulfillment::{self, NodeTone, Timeline, TimelineNode, TimelineStage};
use crate::models::{Order, OrderStatus};
use crate::money::format_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use storefront_core::{RerequestRule, ShippingPolicy};
use storefront_shared::{LifecycleSignal, ReturnRequestedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Return,
    Exchange,
}

impl ReturnType {
    pub fn parse(raw: &str) -> LifecycleResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "return" => Ok(ReturnType::Return),
            "exchange" => Ok(ReturnType::Exchange),
            _ => Err(LifecycleError::unknown("return type", raw)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::Return => "return",
            ReturnType::Exchange => "exchange",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ReturnType::Return => "Return",
            ReturnType::Exchange => "Exchange",
        }
    }
}

/// Return request status. Transitions other than customer cancellation are driven
/// by the admin workflow; this crate only renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Processing,
    Rejected,
    Completed,
    Cancelled,
}

impl ReturnStatus {
    pub fn parse(raw: &str) -> LifecycleResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "requested" => Ok(ReturnStatus::Requested),
            "approved" => Ok(ReturnStatus::Approved),
            "processing" => Ok(ReturnStatus::Processing),
            "rejected" => Ok(ReturnStatus::Rejected),
            "completed" => Ok(ReturnStatus::Completed),
            "cancelled" | "canceled" => Ok(ReturnStatus::Cancelled),
            _ => Err(LifecycleError::unknown("return status", raw)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Requested => "requested",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Processing => "processing",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::Completed => "completed",
            ReturnStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReturnStatus::Rejected | ReturnStatus::Completed | ReturnStatus::Cancelled
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    WrongItem,
    Damaged,
    SizeIssue,
    NotMatchingDescription,
    ChangedMind,
    Other,
}

impl ReturnReason {
    pub fn parse(raw: &str) -> LifecycleResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "wrong_item" => Ok(ReturnReason::WrongItem),
            "damaged" => Ok(ReturnReason::Damaged),
            "size_issue" => Ok(ReturnReason::SizeIssue),
            "not_matching_description" => Ok(ReturnReason::NotMatchingDescription),
            "changed_mind" => Ok(ReturnReason::ChangedMind),
            "other" => Ok(ReturnReason::Other),
            _ => Err(LifecycleError::unknown("return reason", raw)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReturnReason::WrongItem => "Wrong item received",
            ReturnReason::Damaged => "Item arrived damaged",
            ReturnReason::SizeIssue => "Size doesn't fit",
            ReturnReason::NotMatchingDescription => "Not as described",
            ReturnReason::ChangedMind => "Changed my mind",
            ReturnReason::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub product_id: String,
    pub reason: ReturnReason,
    pub quantity: u32,
}

/// A return or exchange tied to one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: String,
    pub order_id: String,
    pub return_type: ReturnType,
    pub status: ReturnStatus,
    pub items: Vec<ReturnItem>,
    pub description: Option<String>,
    /// Written by the admin workflow only
    pub admin_notes: Option<String>,
    /// Informational; the settlement system owns any balance adjustment
    pub refund_amount: Option<Decimal>,
}

/// One line the customer wants to send back, as entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLineDraft {
    pub product_id: String,
    pub reason: ReturnReason,
    pub quantity: i64,
}

/// A return request as entered by the customer, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnDraft {
    pub return_type: ReturnType,
    pub items: Vec<ReturnLineDraft>,
    pub description: Option<String>,
}

/// A validated request, ready for the Order/Return API to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSubmission {
    pub order_id: String,
    pub return_type: ReturnType,
    pub status: ReturnStatus,
    pub items: Vec<ReturnItem>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReturn {
    pub submission: ReturnSubmission,
    pub event: ReturnRequestedEvent,
}

impl ValidatedReturn {
    /// Success signal for the notification layer
    pub fn signal(&self) -> LifecycleSignal {
        LifecycleSignal::ReturnRequested(self.event.clone())
    }
}

fn blocks_rerequest(existing: &ReturnRequest, rule: RerequestRule) -> bool {
    match rule {
        RerequestRule::AnyExistingBlocks => true,
        RerequestRule::OnlyActiveBlocks => existing.status.is_active(),
    }
}

/// Whether the customer may start a return for this order.
/// Every call site (order list, order detail) goes through here. A return that
/// belongs to another order never blocks this one.
pub fn can_request_return(order: &Order, existing: Option<&ReturnRequest>, rule: RerequestRule) -> bool {
    order.status == OrderStatus::Delivered
        && !existing.is_some_and(|r| r.order_id == order.id && blocks_rerequest(r, rule))
}

fn ensure_same_order(order: &Order, request: &ReturnRequest) -> LifecycleResult<()> {
    if request.order_id != order.id {
        return Err(LifecycleError::ReturnOrderMismatch {
            order_id: order.id.clone(),
            return_order_id: request.order_id.clone(),
        });
    }
    Ok(())
}

/// Validate a customer's return draft against the order and any existing request.
pub fn request_return(
    order: &Order,
    existing: Option<&ReturnRequest>,
    draft: &ReturnDraft,
    rule: RerequestRule,
) -> LifecycleResult<ValidatedReturn> {
    if let Some(existing) = existing {
        ensure_same_order(order, existing)?;
    }

    if order.status != OrderStatus::Delivered {
        return Err(LifecycleError::IllegalTransition {
            from: order.status.to_string(),
            action: "request return",
            reason: "returns can only be requested once the order is delivered".to_string(),
        });
    }

    if let Some(existing) = existing.filter(|r| blocks_rerequest(r, rule)) {
        return Err(LifecycleError::ReturnAlreadyActive {
            order_id: order.id.clone(),
            status: existing.status.to_string(),
        });
    }

    if draft.items.is_empty() {
        return Err(LifecycleError::InvalidReturnItem {
            product_id: String::new(),
            problem: "select at least one item to return".to_string(),
        });
    }

    // Several lines may name the same product; their sum is what counts
    let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
    let mut items = Vec::with_capacity(draft.items.len());

    for line in &draft.items {
        let invalid = |problem: String| LifecycleError::InvalidReturnItem {
            product_id: line.product_id.clone(),
            problem,
        };

        let ordered = order
            .item(&line.product_id)
            .ok_or_else(|| invalid("item is not part of this order".to_string()))?;

        if line.quantity <= 0 {
            return Err(invalid(format!("quantity {} is not positive", line.quantity)));
        }

        let exceeds = |requested: i64| {
            invalid(format!(
                "requested {} but only {} were ordered",
                requested, ordered.quantity
            ))
        };
        if line.quantity > ordered.quantity {
            return Err(exceeds(line.quantity));
        }

        let total = requested.entry(line.product_id.as_str()).or_insert(0);
        *total = total
            .checked_add(line.quantity)
            .ok_or_else(|| exceeds(line.quantity))?;
        if *total > ordered.quantity {
            return Err(exceeds(*total));
        }

        let quantity = u32::try_from(line.quantity)
            .map_err(|_| invalid(format!("quantity {} is too large", line.quantity)))?;

        items.push(ReturnItem {
            product_id: line.product_id.clone(),
            reason: line.reason,
            quantity,
        });
    }

    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let unit_count = items
        .iter()
        .try_fold(0u32, |acc, i| acc.checked_add(i.quantity))
        .ok_or_else(|| LifecycleError::InvalidReturnItem {
            product_id: String::new(),
            problem: "too many units in one request".to_string(),
        })?;

    tracing::info!(
        "Validated {} request for order {}: {} lines",
        draft.return_type.as_str(),
        order.id,
        items.len()
    );

    Ok(ValidatedReturn {
        event: ReturnRequestedEvent {
            order_id: order.id.clone(),
            return_type: draft.return_type.as_str().to_string(),
            line_count: items.len(),
            unit_count,
        },
        submission: ReturnSubmission {
            order_id: order.id.clone(),
            return_type: draft.return_type,
            status: ReturnStatus::Requested,
            items,
            description,
        },
    })
}

/// Customer-initiated cancellation of a return, allowed from requested or approved.
pub fn cancel_return(request: &ReturnRequest) -> LifecycleResult<ReturnStatus> {
    match request.status {
        ReturnStatus::Requested | ReturnStatus::Approved => {
            tracing::info!("Return {} for order {} cancelled by customer", request.id, request.order_id);
            Ok(ReturnStatus::Cancelled)
        }
        ReturnStatus::Processing => Err(LifecycleError::IllegalTransition {
            from: request.status.to_string(),
            action: "cancel return",
            reason: "items are already being processed".to_string(),
        }),
        status => Err(LifecycleError::IllegalTransition {
            from: status.to_string(),
            action: "cancel return",
            reason: format!("return request is already {}", status),
        }),
    }
}

/// The fifth timeline node, derived only from the return's own fields
pub fn return_node(request: &ReturnRequest) -> TimelineNode {
    let title = request.return_type.title();
    let refund = request.refund_amount;

    let (label, description, completed, current, tone) = match request.status {
        ReturnStatus::Requested => (
            format!("{} requested", title),
            "awaiting review".to_string(),
            false,
            true,
            NodeTone::Active,
        ),
        ReturnStatus::Approved => (
            format!("{} approved", title),
            "approved, ship the items back".to_string(),
            true,
            true,
            NodeTone::Active,
        ),
        ReturnStatus::Processing => (
            format!("{} processing", title),
            "items received, being processed".to_string(),
            false,
            true,
            NodeTone::Active,
        ),
        ReturnStatus::Completed => (
            format!("{} completed", title),
            match refund {
                Some(amount) => format!("refund of {} issued", format_amount(amount)),
                None => format!("{} completed", request.return_type.as_str()),
            },
            true,
            false,
            NodeTone::Done,
        ),
        ReturnStatus::Rejected => (
            format!("{} rejected", title),
            match request.admin_notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                Some(notes) => format!("request was rejected: {}", notes),
                None => "request was rejected".to_string(),
            },
            false,
            false,
            NodeTone::Failure,
        ),
        ReturnStatus::Cancelled => (
            format!("{} cancelled", title),
            "request was cancelled".to_string(),
            false,
            false,
            NodeTone::Muted,
        ),
    };

    let refund_amount = match request.status {
        ReturnStatus::Approved | ReturnStatus::Processing | ReturnStatus::Completed => refund,
        _ => None,
    };

    TimelineNode {
        stage: match request.return_type {
            ReturnType::Return => TimelineStage::Return,
            ReturnType::Exchange => TimelineStage::Exchange,
        },
        label,
        description,
        completed,
        current,
        tone,
        refund_amount,
    }
}

/// Extend an order's timeline with its return request, if any.
///
/// With a return present the fulfillment nodes give up their "current" marker; the
/// return node holds it while the request is active. Order financials are untouched.
pub fn overlay(
    order: &Order,
    request: Option<&ReturnRequest>,
    policy: &ShippingPolicy,
) -> LifecycleResult<Timeline> {
    let mut timeline = fulfillment::timeline(order, policy)?;

    let Some(request) = request else {
        return Ok(timeline);
    };

    ensure_same_order(order, request)?;

    if order.status != OrderStatus::Delivered {
        tracing::warn!(
            "Return {} overlaid on order {} which is {}, not delivered",
            request.id,
            order.id,
            order.status
        );
    }

    for node in &mut timeline.nodes {
        if node.current {
            node.current = false;
            if node.tone == NodeTone::Active {
                node.tone = NodeTone::Done;
            }
        }
    }
    timeline.nodes.push(return_node(request));

    Ok(timeline)
}
