use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of payment methods. Upstream sends free text ("COD", "Credit Card",
/// "upi_intent", ...) which is normalized once at the system boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    Upi,
    Wallet,
    NetBanking,
    Other,
}

impl PaymentMethod {
    /// Map an arbitrary upstream string into the closed enumeration.
    /// Never fails: anything unrecognized becomes `Other`.
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let compact: String = tokens.concat();
        let has = |token: &str| tokens.iter().any(|t| *t == token);

        if has("cod") || compact.contains("cashondelivery") || has("cash") {
            PaymentMethod::CashOnDelivery
        } else if has("upi") || compact.starts_with("upi") {
            PaymentMethod::Upi
        } else if compact.contains("netbanking") || compact.contains("internetbanking") {
            PaymentMethod::NetBanking
        } else if compact.contains("card")
            || has("credit")
            || has("debit")
            || has("visa")
            || has("mastercard")
            || has("rupay")
        {
            PaymentMethod::Card
        } else if compact.contains("wallet") || has("paytm") {
            PaymentMethod::Wallet
        } else {
            PaymentMethod::Other
        }
    }

    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::CashOnDelivery)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash on delivery",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::NetBanking => "net banking",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment status as recorded by the payment collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Strict parse of the upstream value. `completed` is accepted as a synonym for
    /// `paid`; anything else outside the enumeration returns `None` so the caller can
    /// report it instead of guessing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "paid" | "completed" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}
