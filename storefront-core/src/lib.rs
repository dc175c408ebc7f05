pub mod app_config;
pub mod payment;
pub mod policy;

pub use payment::{PaymentMethod, PaymentStatus};
pub use policy::{LifecyclePolicy, RerequestRule, ShippingPolicy};

use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("Lifecycle policy was already installed for this process")]
    AlreadyInstalled,
}

pub type PolicyResult<T> = Result<T, PolicyError>;
