use rust_decimal::Decimal;
use std::fmt;

/// What exactly is wrong with a line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemProblem {
    NegativePrice(Decimal),
    NonPositiveQuantity(i64),
    AmountOverflow,
}

impl fmt::Display for LineItemProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineItemProblem::NegativePrice(price) => write!(f, "unit price {} is negative", price),
            LineItemProblem::NonPositiveQuantity(qty) => write!(f, "quantity {} is not positive", qty),
            LineItemProblem::AmountOverflow => write!(f, "amount is too large to represent"),
        }
    }
}

/// Every failure the lifecycle engine reports. All of them are recoverable and carry
/// enough structure for the caller to build a specific user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid line item {product_id}: {problem}")]
    InvalidLineItem {
        product_id: String,
        problem: LineItemProblem,
    },

    #[error("Cannot {action} from {from}: {reason}")]
    IllegalTransition {
        from: String,
        action: &'static str,
        reason: String,
    },

    #[error("Unknown {field} value {value:?}")]
    UnknownStatus { field: &'static str, value: String },

    #[error("Order {order_id} already has a return request ({status})")]
    ReturnAlreadyActive { order_id: String, status: String },

    #[error("A reason is required to cancel an order")]
    MissingCancellationReason,

    #[error("Invalid return line for {product_id}: {problem}")]
    InvalidReturnItem { product_id: String, problem: String },

    #[error("Return {return_id} has a negative refund amount {amount}")]
    NegativeRefund { return_id: String, amount: Decimal },

    #[error("Return request belongs to order {return_order_id}, not {order_id}")]
    ReturnOrderMismatch {
        order_id: String,
        return_order_id: String,
    },
}

impl LifecycleError {
    pub(crate) fn unknown(field: &'static str, value: &str) -> Self {
        tracing::warn!("Upstream data fault: unknown {} value {:?}", field, value);
        LifecycleError::UnknownStatus {
            field,
            value: value.to_string(),
        }
    }

    /// The user-surfaceable reason for a rejected transition
    pub fn transition_reason(&self) -> Option<&str> {
        match self {
            LifecycleError::IllegalTransition { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// True for faults in upstream data rather than in what the user attempted
    pub fn is_data_fault(&self) -> bool {
        matches!(
            self,
            LifecycleError::InvalidLineItem { .. }
                | LifecycleError::UnknownStatus { .. }
                | LifecycleError::NegativeRefund { .. }
                | LifecycleError::ReturnOrderMismatch { .. }
        )
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
