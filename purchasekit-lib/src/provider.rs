//! Provider capability interface.
//!
//! Any purchase backend is plugged in by implementing [`PurchaseProvider`].
//! The facade only ever talks to this trait; concrete adapters translate
//! between their backend's native types and the domain model.

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::model::{Entitlement, Offerings, Product, ProductId, PurchaseOutcome, SubscriptionStatus};

/// Capability contract a purchase backend must satisfy.
///
/// # Semantics
///
/// - Every operation except [`configure`](Self::configure) must fail with
///   `StoreError::NotConfigured` until a `configure` call has succeeded.
/// - Expected purchase endings (cancellation, pending approval) are
///   [`PurchaseOutcome`] variants, never `Err`.
/// - The three entitlement queries never fail: on an internal error they
///   log it and return their safe default, so boolean checks stay ergonomic
///   without hiding backend problems from the logs.
#[async_trait]
pub trait PurchaseProvider: Send + Sync {
    /// Short stable name for logs ("revenuecat", "mock", ...).
    fn name(&self) -> &str;

    /// One-time backend initialization with a validated configuration.
    ///
    /// Safe to call once per process lifetime. Implementations must treat a
    /// second call as idempotent: keep the first configuration, log a
    /// warning when the new one differs, and return success.
    async fn configure(&self, config: &StoreConfig) -> Result<()>;

    /// Associate the given user identity, or an anonymous one when `None`.
    async fn identify(&self, user_id: Option<&str>) -> Result<()>;

    /// Drop the current identity and revert to an anonymous one.
    async fn log_out(&self) -> Result<()>;

    /// Resolve products by identifier.
    ///
    /// Resolving none of the requested identifiers is an error
    /// (`FetchProductsFailed`), not an empty list: an empty catalog is never
    /// a legitimate state for a configured paywall. Resolving a subset
    /// returns that subset.
    async fn fetch_products(&self, identifiers: &[ProductId]) -> Result<Vec<Product>>;

    /// Fetch the backend's offering groups.
    async fn fetch_offerings(&self) -> Result<Offerings>;

    /// Run one purchase attempt for `product`.
    ///
    /// A backend-level cancellation must come back as
    /// `Ok(PurchaseOutcome::Cancelled)`; `Err` is reserved for conditions
    /// outside the purchase flow itself (misconfiguration, unknown product).
    async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome>;

    /// Re-derive entitlements from the user's purchase history.
    async fn restore_purchases(&self) -> Result<()>;

    /// Push unsynced store transactions to the backend.
    async fn sync_purchases(&self) -> Result<()>;

    /// Whether the user holds the given entitlement. Never fails; `false`
    /// on internal error, logged by the implementation.
    async fn has_entitlement(&self, entitlement_id: &str) -> bool;

    /// All entitlements the backend reports. Never fails; empty on internal
    /// error, logged by the implementation.
    async fn current_entitlements(&self) -> Vec<Entitlement>;

    /// Current subscription standing. Never fails; `None` on internal
    /// error, logged by the implementation.
    async fn subscription_status(&self) -> Option<SubscriptionStatus>;

    /// Whether `configure` has succeeded on this provider.
    fn is_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Minimal conforming implementation used to pin down object safety
    /// and the unconfigured defaults.
    struct StubProvider {
        configured: AtomicBool,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                configured: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl PurchaseProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn configure(&self, config: &StoreConfig) -> Result<()> {
            config.validate()?;
            self.configured.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn identify(&self, _user_id: Option<&str>) -> Result<()> {
            Ok(())
        }

        async fn log_out(&self) -> Result<()> {
            Ok(())
        }

        async fn fetch_products(&self, identifiers: &[ProductId]) -> Result<Vec<Product>> {
            Err(StoreError::FetchProductsFailed(format!(
                "no products for {} identifiers",
                identifiers.len()
            )))
        }

        async fn fetch_offerings(&self) -> Result<Offerings> {
            Ok(Offerings::new())
        }

        async fn purchase(&self, _product: &Product) -> Result<PurchaseOutcome> {
            Ok(PurchaseOutcome::Cancelled)
        }

        async fn restore_purchases(&self) -> Result<()> {
            Ok(())
        }

        async fn sync_purchases(&self) -> Result<()> {
            Ok(())
        }

        async fn has_entitlement(&self, _entitlement_id: &str) -> bool {
            false
        }

        async fn current_entitlements(&self) -> Vec<Entitlement> {
            Vec::new()
        }

        async fn subscription_status(&self) -> Option<SubscriptionStatus> {
            None
        }

        fn is_configured(&self) -> bool {
            self.configured.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_trait_is_object_safe() {
        let provider: Arc<dyn PurchaseProvider> = Arc::new(StubProvider::new());

        assert_eq!(provider.name(), "stub");
        assert!(!provider.is_configured());

        provider
            .configure(&StoreConfig::new("appl_key"))
            .await
            .unwrap();
        assert!(provider.is_configured());

        assert!(!provider.has_entitlement("premium").await);
        assert!(provider.current_entitlements().await.is_empty());
        assert!(provider.subscription_status().await.is_none());
    }

    #[tokio::test]
    async fn test_stub_rejects_blank_key() {
        let provider = StubProvider::new();
        let err = provider
            .configure(&StoreConfig::new("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidApiKey(_)));
        assert!(!provider.is_configured());
    }
}
