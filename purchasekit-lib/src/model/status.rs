//! Aggregate subscription status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// Derived summary of the user's subscription standing.
///
/// Never persisted on its own; the provider adapter recomputes it from its
/// entitlement and subscription snapshot on every refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// Whether any tracked entitlement currently grants access.
    pub is_subscribed: bool,
    /// Product backing the active subscription, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_product_id: Option<ProductId>,
    /// When the active subscription lapses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Whether the active subscription will auto-renew.
    pub will_renew: bool,
    /// The backend is retrying a failed renewal charge.
    pub is_in_billing_retry: bool,
    /// Access continues during a billing grace period.
    pub is_in_grace_period: bool,
    /// URL where the user can manage the subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_url: Option<String>,
}

impl SubscriptionStatus {
    /// Status for a user with no active subscription.
    pub fn not_subscribed() -> Self {
        Self::default()
    }

    /// True while renewal is in doubt and the user should check their
    /// payment method.
    pub fn needs_billing_attention(&self) -> bool {
        self.is_in_billing_retry || self.is_in_grace_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_subscribed() {
        let status = SubscriptionStatus::not_subscribed();

        assert!(!status.is_subscribed);
        assert!(status.active_product_id.is_none());
        assert!(!status.needs_billing_attention());
    }

    #[test]
    fn test_billing_attention() {
        let retry = SubscriptionStatus {
            is_subscribed: true,
            is_in_billing_retry: true,
            ..Default::default()
        };
        let grace = SubscriptionStatus {
            is_subscribed: true,
            is_in_grace_period: true,
            ..Default::default()
        };

        assert!(retry.needs_billing_attention());
        assert!(grace.needs_billing_attention());
    }
}
