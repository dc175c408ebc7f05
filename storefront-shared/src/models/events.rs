/// Emitted when a customer cancellation is accepted by the fulfillment state machine.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct OrderCancelledEvent {
    pub order_id: String,
    pub previous_status: String,
    pub reason: String,
}

/// Emitted when a return or exchange draft passes validation.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct ReturnRequestedEvent {
    pub order_id: String,
    pub return_type: String,
    pub line_count: usize,
    pub unit_count: u32,
}

/// Success signals handed to the notification layer (toasts).
/// The engine only produces these; it never displays anything.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleSignal {
    OrderCancelled(OrderCancelledEvent),
    ReturnRequested(ReturnRequestedEvent),
}

impl LifecycleSignal {
    pub fn order_id(&self) -> &str {
        match self {
            LifecycleSignal::OrderCancelled(e) => &e.order_id,
            LifecycleSignal::ReturnRequested(e) => &e.order_id,
        }
    }

    /// JSON payload in the shape the notification layer consumes.
    pub fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
