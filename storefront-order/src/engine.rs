use crate::error::LifecycleResult;
use crate::fulfillment::{self, Cancellation, CancellationReason, FulfillmentAction, Timeline};
use crate::models::{Order, OrderStatus};
use crate::money::{self, OrderTotals};
use crate::returns::{self, ReturnDraft, ReturnRequest, ReturnStatus, ValidatedReturn};
use crate::settlement::{self, PaymentVerdict};
use crate::views::{InvoiceView, OrderDetailView, OrderLifecycle, OrderListRow, TrackingView};
use storefront_core::LifecyclePolicy;

/// Entry point for every page that shows an order.
///
/// Holds only the read-only lifecycle policy; every method is a pure function of its
/// arguments, so one engine can be shared across threads and called concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEngine {
    policy: LifecyclePolicy,
}

impl LifecycleEngine {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self { policy }
    }

    /// Engine over the process-wide installed policy
    pub fn from_installed() -> Self {
        Self::new(LifecyclePolicy::current())
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn compute_totals(&self, order: &Order) -> LifecycleResult<OrderTotals> {
        money::compute_totals(&order.items, &self.policy.shipping)
    }

    pub fn payment_verdict(&self, order: &Order) -> LifecycleResult<PaymentVerdict> {
        settlement::payment_verdict(order, &self.policy.shipping)
    }

    pub fn advance(&self, current: OrderStatus, action: FulfillmentAction) -> LifecycleResult<OrderStatus> {
        fulfillment::advance(current, action)
    }

    pub fn can_cancel(&self, order: &Order) -> bool {
        fulfillment::can_cancel(order)
    }

    /// Validate the raw reason, then ask the state machine
    pub fn cancel(&self, order: &Order, reason: &str) -> LifecycleResult<Cancellation> {
        let reason = CancellationReason::parse(reason)?;
        fulfillment::cancel(order, &reason)
    }

    pub fn overlay(&self, order: &Order, request: Option<&ReturnRequest>) -> LifecycleResult<Timeline> {
        returns::overlay(order, request, &self.policy.shipping)
    }

    pub fn can_request_return(&self, order: &Order, existing: Option<&ReturnRequest>) -> bool {
        returns::can_request_return(order, existing, self.policy.rerequest_rule)
    }

    pub fn request_return(
        &self,
        order: &Order,
        existing: Option<&ReturnRequest>,
        draft: &ReturnDraft,
    ) -> LifecycleResult<ValidatedReturn> {
        returns::request_return(order, existing, draft, self.policy.rerequest_rule)
    }

    pub fn cancel_return(&self, request: &ReturnRequest) -> LifecycleResult<ReturnStatus> {
        returns::cancel_return(request)
    }

    pub fn snapshot(&self, order: &Order, request: Option<&ReturnRequest>) -> LifecycleResult<OrderLifecycle> {
        OrderLifecycle::derive(order, request, &self.policy)
    }

    pub fn list_row(&self, order: &Order, request: Option<&ReturnRequest>) -> LifecycleResult<OrderListRow> {
        let lifecycle = self.snapshot(order, request)?;
        Ok(OrderListRow::project(order, &lifecycle))
    }

    pub fn detail(&self, order: &Order, request: Option<&ReturnRequest>) -> LifecycleResult<OrderDetailView> {
        let lifecycle = self.snapshot(order, request)?;
        OrderDetailView::project(order, &lifecycle)
    }

    pub fn tracking(&self, order: &Order, request: Option<&ReturnRequest>) -> LifecycleResult<TrackingView> {
        let lifecycle = self.snapshot(order, request)?;
        Ok(TrackingView::project(order, &lifecycle))
    }

    pub fn invoice(&self, order: &Order) -> LifecycleResult<InvoiceView> {
        let lifecycle = self.snapshot(order, None)?;
        InvoiceView::project(order, &lifecycle)
    }
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::new(LifecyclePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifecycleError;
    use crate::test_support::order_with;
    use storefront_core::{PaymentMethod, PaymentStatus};

    #[test]
    fn test_cancel_requires_reason() {
        let engine = LifecycleEngine::default();
        let order = order_with(OrderStatus::Pending, PaymentMethod::Card, PaymentStatus::Paid, &[(100, 1)]);

        assert_eq!(engine.cancel(&order, ""), Err(LifecycleError::MissingCancellationReason));
        assert!(engine.cancel(&order, "duplicate order").is_ok());
    }

    #[test]
    fn test_missing_reason_checked_before_status() {
        let engine = LifecycleEngine::default();
        let order = order_with(OrderStatus::Delivered, PaymentMethod::Card, PaymentStatus::Paid, &[(100, 1)]);

        assert_eq!(engine.cancel(&order, " "), Err(LifecycleError::MissingCancellationReason));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LifecycleEngine>();
        assert_send_sync::<OrderLifecycle>();
    }
}
