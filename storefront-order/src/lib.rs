pub mod error;
pub mod models;
pub mod records;
pub mod money;
pub mod fulfillment;
pub mod settlement;
pub mod returns;
pub mod views;
pub mod engine;

#[cfg(test)]
mod test_support;

pub use error::{LifecycleError, LifecycleResult, LineItemProblem};
pub use models::{Customer, Order, OrderItem, OrderStatus};
pub use money::{compute_totals, OrderTotals};
pub use fulfillment::{advance, cancel, progress_index, FulfillmentAction, Timeline, TimelineNode};
pub use settlement::{payment_verdict, PaymentVerdict, SettlementState};
pub use returns::{can_request_return, overlay, ReturnRequest, ReturnStatus, ReturnType};
pub use engine::LifecycleEngine;
