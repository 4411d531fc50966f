//! Analytics event taxonomy and sink interface.
//!
//! The facade reports every purchase lifecycle transition as exactly one
//! [`PurchaseEvent`] through an [`AnalyticsSink`]. Delivery is best-effort
//! by construction: `track` is synchronous and infallible, so a sink can
//! neither block nor fail the flow it observes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::ProductId;

/// Closed set of events the purchase flow can report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PurchaseEvent {
    /// A product detail view was shown.
    ProductViewed {
        /// Product that was shown.
        product_id: ProductId,
    },
    /// A paywall was shown.
    PaywallViewed,
    /// A purchase attempt began.
    PurchaseStarted {
        /// Product being bought.
        product_id: ProductId,
    },
    /// A purchase attempt settled successfully.
    PurchaseCompleted {
        /// Product that was bought.
        product_id: ProductId,
        /// Price paid; the transaction's captured price when present,
        /// otherwise the product's listed price.
        price: Option<Decimal>,
        /// Currency of `price`.
        currency_code: Option<String>,
        /// Backend transaction identifier.
        transaction_id: String,
    },
    /// The user backed out of a purchase.
    PurchaseCancelled {
        /// Product the attempt was for.
        product_id: ProductId,
    },
    /// A purchase attempt failed.
    PurchaseFailed {
        /// Product the attempt was for.
        product_id: ProductId,
        /// Failure description.
        message: String,
    },
    /// A purchase is awaiting external approval.
    PurchasePending {
        /// Product the attempt is for.
        product_id: ProductId,
    },
    /// An active subscription renewed for another cycle.
    SubscriptionRenewed {
        /// Backing product, when known.
        product_id: Option<ProductId>,
    },
    /// Auto-renewal was switched off; access continues until expiry.
    SubscriptionCancelled {
        /// Backing product, when known.
        product_id: Option<ProductId>,
    },
    /// A subscription lapsed.
    SubscriptionExpired {
        /// Backing product, when known.
        product_id: Option<ProductId>,
    },
    /// A restore began.
    RestoreStarted,
    /// A restore finished successfully.
    RestoreCompleted,
    /// A restore failed.
    RestoreFailed {
        /// Failure description.
        message: String,
    },
}

impl PurchaseEvent {
    /// Stable snake_case event name for sinks that key on strings.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProductViewed { .. } => "product_viewed",
            Self::PaywallViewed => "paywall_viewed",
            Self::PurchaseStarted { .. } => "purchase_started",
            Self::PurchaseCompleted { .. } => "purchase_completed",
            Self::PurchaseCancelled { .. } => "purchase_cancelled",
            Self::PurchaseFailed { .. } => "purchase_failed",
            Self::PurchasePending { .. } => "purchase_pending",
            Self::SubscriptionRenewed { .. } => "subscription_renewed",
            Self::SubscriptionCancelled { .. } => "subscription_cancelled",
            Self::SubscriptionExpired { .. } => "subscription_expired",
            Self::RestoreStarted => "restore_started",
            Self::RestoreCompleted => "restore_completed",
            Self::RestoreFailed { .. } => "restore_failed",
        }
    }

    /// True for the four ways a purchase attempt can end.
    pub fn is_purchase_terminal(&self) -> bool {
        matches!(
            self,
            Self::PurchaseCompleted { .. }
                | Self::PurchaseCancelled { .. }
                | Self::PurchaseFailed { .. }
                | Self::PurchasePending { .. }
        )
    }
}

/// Destination for purchase events.
///
/// Implementations must be cheap and must never panic; the facade calls
/// `track` inline on the purchase path.
pub trait AnalyticsSink: Send + Sync {
    /// Deliver one event. Fire-and-forget.
    fn track(&self, event: &PurchaseEvent);
}

/// Default sink: forwards every event to `tracing` as a structured record.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAnalyticsSink;

impl LogAnalyticsSink {
    /// Create the default logging sink.
    pub fn new() -> Self {
        Self
    }
}

impl AnalyticsSink for LogAnalyticsSink {
    fn track(&self, event: &PurchaseEvent) {
        let name = event.name();
        match event {
            PurchaseEvent::ProductViewed { product_id }
            | PurchaseEvent::PurchaseStarted { product_id }
            | PurchaseEvent::PurchaseCancelled { product_id }
            | PurchaseEvent::PurchasePending { product_id } => {
                info!(target: "purchasekit::analytics", event = name, product_id = %product_id);
            }
            PurchaseEvent::PurchaseCompleted {
                product_id,
                price,
                currency_code,
                transaction_id,
            } => {
                info!(
                    target: "purchasekit::analytics",
                    event = name,
                    product_id = %product_id,
                    price = ?price,
                    currency_code = ?currency_code,
                    transaction_id = %transaction_id,
                );
            }
            PurchaseEvent::PurchaseFailed {
                product_id,
                message,
            } => {
                info!(
                    target: "purchasekit::analytics",
                    event = name,
                    product_id = %product_id,
                    message = %message,
                );
            }
            PurchaseEvent::SubscriptionRenewed { product_id }
            | PurchaseEvent::SubscriptionCancelled { product_id }
            | PurchaseEvent::SubscriptionExpired { product_id } => {
                info!(target: "purchasekit::analytics", event = name, product_id = ?product_id);
            }
            PurchaseEvent::RestoreFailed { message } => {
                info!(target: "purchasekit::analytics", event = name, message = %message);
            }
            PurchaseEvent::PaywallViewed
            | PurchaseEvent::RestoreStarted
            | PurchaseEvent::RestoreCompleted => {
                info!(target: "purchasekit::analytics", event = name);
            }
        }
    }
}
