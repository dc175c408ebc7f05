use crate::{PolicyError, PolicyResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Free-shipping threshold and the flat fee charged below it.
///
/// This is process-wide configuration, not per-order state. Every view that shows a
/// shipping fee reads it from the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Subtotal at or above which shipping is waived
    pub free_shipping_threshold: Decimal,

    /// Fee charged when the subtotal is below the threshold
    pub flat_fee: Decimal,
}

impl ShippingPolicy {
    /// ₹299 threshold, ₹50 flat fee.
    pub const STANDARD: ShippingPolicy = ShippingPolicy {
        free_shipping_threshold: Decimal::from_parts(299, 0, 0, false, 0),
        flat_fee: Decimal::from_parts(50, 0, 0, false, 0),
    };

    pub fn new(free_shipping_threshold: Decimal, flat_fee: Decimal) -> PolicyResult<Self> {
        if free_shipping_threshold < Decimal::ZERO {
            return Err(PolicyError::NegativeAmount {
                field: "free_shipping_threshold",
                value: free_shipping_threshold,
            });
        }
        if flat_fee < Decimal::ZERO {
            return Err(PolicyError::NegativeAmount {
                field: "flat_fee",
                value: flat_fee,
            });
        }

        Ok(Self {
            free_shipping_threshold,
            flat_fee,
        })
    }

    pub fn qualifies_for_free_shipping(&self, subtotal: Decimal) -> bool {
        subtotal >= self.free_shipping_threshold
    }

    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if self.qualifies_for_free_shipping(subtotal) {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Whether an existing return record prevents the customer from requesting another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerequestRule {
    /// Any existing record blocks, including rejected, completed and cancelled ones
    #[default]
    AnyExistingBlocks,
    /// Only requested/approved/processing records block
    OnlyActiveBlocks,
}

/// Everything the lifecycle engine needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LifecyclePolicy {
    pub shipping: ShippingPolicy,
    #[serde(default)]
    pub rerequest_rule: RerequestRule,
}

static INSTALLED: OnceLock<LifecyclePolicy> = OnceLock::new();

impl LifecyclePolicy {
    /// Install the process-wide policy. Call once at startup, before any view reads it.
    pub fn install(self) -> PolicyResult<()> {
        INSTALLED
            .set(self)
            .map_err(|_| PolicyError::AlreadyInstalled)?;

        tracing::info!(
            "Installed lifecycle policy: free shipping from {}, flat fee {}, rerequest rule {:?}",
            self.shipping.free_shipping_threshold,
            self.shipping.flat_fee,
            self.rerequest_rule
        );
        Ok(())
    }

    /// The installed policy, or the standard one if nothing was installed.
    /// Once read, the value is fixed for the life of the process.
    pub fn current() -> LifecyclePolicy {
        *INSTALLED.get_or_init(LifecyclePolicy::default)
    }
}
