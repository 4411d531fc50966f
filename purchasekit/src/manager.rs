//! The purchase manager facade.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use purchasekit_lib::{
    AnalyticsSink, Entitlement, LogAnalyticsSink, Offerings, Product, ProductId, PurchaseEvent,
    PurchaseOutcome, PurchaseProvider, Result, StoreConfig, StoreError, SubscriptionStatus,
};

#[derive(Default)]
struct CachedState {
    entitlements: Vec<Entitlement>,
    subscription_status: Option<SubscriptionStatus>,
}

/// Clears an in-flight flag when the operation ends, on every exit path.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    /// Claim the flag, or `None` when another operation already holds it.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Front door for purchases, subscriptions and entitlements.
///
/// The manager owns one [`PurchaseProvider`], an analytics sink, and a cache
/// of the user's entitlements and subscription status. Store operations go
/// to the provider; entitlement checks read the cache, which is refreshed
/// after every state-changing operation that succeeds and on an explicit
/// [`refresh_state`](Self::refresh_state).
///
/// All methods take `&self`: the manager is made to sit in an `Arc` shared
/// across tasks. At most one purchase and one restore run at a time; a
/// second concurrent attempt fails fast with
/// [`StoreError::PurchaseFailed`] before any analytics event is emitted.
///
/// Cache refreshes diff the old subscription status against the new one and
/// emit subscription lifecycle events (renewed, cancelled, expired) on the
/// analytics sink, at most one per refresh.
pub struct PurchaseManager {
    provider: RwLock<Option<Arc<dyn PurchaseProvider>>>,
    analytics: RwLock<Arc<dyn AnalyticsSink>>,
    cache: RwLock<CachedState>,
    configured: AtomicBool,
    purchasing: AtomicBool,
    restoring: AtomicBool,
}

impl PurchaseManager {
    /// Manager that logs analytics events through `tracing`.
    pub fn new() -> Self {
        Self::with_analytics_sink(Arc::new(LogAnalyticsSink::new()))
    }

    /// Manager with a custom analytics sink.
    pub fn with_analytics_sink(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            provider: RwLock::new(None),
            analytics: RwLock::new(sink),
            cache: RwLock::new(CachedState::default()),
            configured: AtomicBool::new(false),
            purchasing: AtomicBool::new(false),
            restoring: AtomicBool::new(false),
        }
    }

    /// Swap the analytics sink at runtime.
    pub async fn set_analytics_sink(&self, sink: Arc<dyn AnalyticsSink>) {
        *self.analytics.write().await = sink;
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Configure the manager with a provider.
    ///
    /// The first successful call wins: once configured, later calls keep the
    /// existing provider and configuration, log a warning and return `Ok`.
    /// On success the entitlement cache is populated from the provider.
    pub async fn configure(
        &self,
        provider: Arc<dyn PurchaseProvider>,
        config: &StoreConfig,
    ) -> Result<()> {
        {
            let slot = self.provider.read().await;
            if slot.is_some() {
                warn!("purchase manager is already configured, keeping the existing provider");
                return Ok(());
            }
        }

        provider.configure(config).await?;

        let provider_name = provider.name().to_string();
        {
            let mut slot = self.provider.write().await;
            if slot.is_some() {
                warn!("purchase manager was configured concurrently, keeping the existing provider");
                return Ok(());
            }
            *slot = Some(provider);
            self.configured.store(true, Ordering::Release);
        }

        info!(provider = %provider_name, "purchase manager configured");
        if let Err(error) = self.refresh_state().await {
            warn!(error = %error, "initial state refresh failed");
        }
        Ok(())
    }

    /// Configure the manager with the bundled RevenueCat provider.
    #[cfg(feature = "revenuecat")]
    pub async fn configure_revenuecat(&self, config: &StoreConfig) -> Result<()> {
        let provider = Arc::new(purchasekit_revenuecat::RevenueCatProvider::new());
        self.configure(provider, config).await
    }

    /// True once a provider has been configured.
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    /// Name of the configured provider.
    pub async fn provider_name(&self) -> Option<String> {
        self.provider
            .read()
            .await
            .as_ref()
            .map(|provider| provider.name().to_string())
    }

    /// Drop the provider, configuration and cached state.
    ///
    /// Afterwards the manager behaves as if freshly created and can be
    /// configured again. An in-flight purchase or restore keeps its
    /// single-flight slot until it finishes; the slot is released by the
    /// operation that holds it, never here.
    pub async fn reset(&self) {
        *self.provider.write().await = None;
        self.configured.store(false, Ordering::Release);
        *self.cache.write().await = CachedState::default();
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Fetch products by identifier.
    pub async fn fetch_products(&self, identifiers: &[ProductId]) -> Result<Vec<Product>> {
        self.provider().await?.fetch_products(identifiers).await
    }

    /// Fetch the provider's offering groups.
    pub async fn fetch_offerings(&self) -> Result<Offerings> {
        self.provider().await?.fetch_offerings().await
    }

    // ========================================================================
    // Purchasing
    // ========================================================================

    /// Run one purchase attempt for `product`.
    ///
    /// Exactly one `purchase_started` analytics event and exactly one
    /// terminal purchase event are emitted per attempt that reaches the
    /// provider; attempts rejected before that (unconfigured manager,
    /// purchase already in flight) emit nothing. A successful purchase
    /// refreshes the entitlement cache before returning.
    ///
    /// Cancellation and pending payments are outcomes, not errors: the
    /// returned [`PurchaseOutcome`] says how the attempt ended, and `Err` is
    /// reserved for failures such as an unknown product or a transport
    /// breakdown.
    pub async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome> {
        let provider = self.provider().await?;
        let Some(_guard) = FlightGuard::acquire(&self.purchasing) else {
            return Err(StoreError::purchase_failed(
                "another purchase is already in flight",
            ));
        };

        self.emit(PurchaseEvent::PurchaseStarted {
            product_id: product.id.clone(),
        })
        .await;

        let outcome = match provider.purchase(product).await {
            Ok(outcome) => outcome,
            Err(error) => {
                self.emit(PurchaseEvent::PurchaseFailed {
                    product_id: product.id.clone(),
                    message: error.to_string(),
                })
                .await;
                return Err(error);
            }
        };

        match &outcome {
            PurchaseOutcome::Success(transaction) => {
                // The backend may omit price data on the transaction; the
                // catalog price stands in so the event always carries one.
                self.emit(PurchaseEvent::PurchaseCompleted {
                    product_id: transaction.product_id.clone(),
                    price: transaction.price.or(Some(product.price)),
                    currency_code: transaction
                        .currency_code
                        .clone()
                        .or_else(|| Some(product.currency_code.clone())),
                    transaction_id: transaction.id.clone(),
                })
                .await;
                if let Err(error) = self.refresh_state().await {
                    warn!(error = %error, "state refresh after purchase failed");
                }
            }
            PurchaseOutcome::Cancelled => {
                self.emit(PurchaseEvent::PurchaseCancelled {
                    product_id: product.id.clone(),
                })
                .await;
            }
            PurchaseOutcome::Pending | PurchaseOutcome::RequiresAction(_) => {
                self.emit(PurchaseEvent::PurchasePending {
                    product_id: product.id.clone(),
                })
                .await;
            }
            PurchaseOutcome::Unknown => {
                self.emit(PurchaseEvent::PurchaseFailed {
                    product_id: product.id.clone(),
                    message: "purchase ended without a terminal store outcome".to_string(),
                })
                .await;
            }
        }
        Ok(outcome)
    }

    /// Replay the user's historical transactions and refresh the cache.
    ///
    /// The cache refresh happens before the `restore_completed` event, so a
    /// sink reacting to that event already sees the restored entitlements.
    pub async fn restore_purchases(&self) -> Result<()> {
        let provider = self.provider().await?;
        let Some(_guard) = FlightGuard::acquire(&self.restoring) else {
            return Err(StoreError::purchase_failed(
                "another restore is already in flight",
            ));
        };

        self.emit(PurchaseEvent::RestoreStarted).await;

        if let Err(error) = provider.restore_purchases().await {
            self.emit(PurchaseEvent::RestoreFailed {
                message: error.to_string(),
            })
            .await;
            return Err(error);
        }

        if let Err(error) = self.refresh_state().await {
            warn!(error = %error, "state refresh after restore failed");
        }
        self.emit(PurchaseEvent::RestoreCompleted).await;
        Ok(())
    }

    /// Reconcile local store state with the backend, without replaying
    /// history and without analytics events.
    pub async fn sync_purchases(&self) -> Result<()> {
        let provider = self.provider().await?;
        provider.sync_purchases().await?;
        if let Err(error) = self.refresh_state().await {
            warn!(error = %error, "state refresh after sync failed");
        }
        Ok(())
    }

    /// True while a purchase attempt holds the single-flight slot.
    pub fn is_purchasing(&self) -> bool {
        self.purchasing.load(Ordering::Acquire)
    }

    /// True while a restore holds the single-flight slot.
    pub fn is_restoring(&self) -> bool {
        self.restoring.load(Ordering::Acquire)
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Switch to a known user (`Some`) or a fresh anonymous one (`None`).
    ///
    /// The cache baseline is cleared before the refresh so the switch never
    /// emits subscription lifecycle events for the previous user.
    pub async fn identify(&self, user_id: Option<&str>) -> Result<()> {
        let provider = self.provider().await?;
        provider.identify(user_id).await?;
        self.rebase_cache().await;
        Ok(())
    }

    /// Log the current user out, switching to a fresh anonymous identity.
    pub async fn log_out(&self) -> Result<()> {
        let provider = self.provider().await?;
        provider.log_out().await?;
        self.rebase_cache().await;
        Ok(())
    }

    // ========================================================================
    // Entitlements and cached state
    // ========================================================================

    /// Re-query the provider and swap the cache, emitting at most one
    /// subscription lifecycle event when the status transitioned.
    pub async fn refresh_state(&self) -> Result<()> {
        let provider = self.provider().await?;
        let entitlements = provider.current_entitlements().await;
        let status = provider.subscription_status().await;

        let event = {
            let mut cache = self.cache.write().await;
            let event = transition_event(&cache.subscription_status, &status);
            cache.entitlements = entitlements;
            cache.subscription_status = status;
            event
        };
        if let Some(event) = event {
            self.emit(event).await;
        }
        Ok(())
    }

    /// True when the cached entitlements contain an active one with this id.
    pub async fn has_entitlement(&self, entitlement_id: &str) -> bool {
        self.cache
            .read()
            .await
            .entitlements
            .iter()
            .any(|entitlement| entitlement.id == entitlement_id && entitlement.is_active)
    }

    /// Cached entitlements, active or not.
    pub async fn current_entitlements(&self) -> Vec<Entitlement> {
        self.cache.read().await.entitlements.clone()
    }

    /// True when any cached entitlement is active.
    pub async fn has_active_entitlements(&self) -> bool {
        self.cache
            .read()
            .await
            .entitlements
            .iter()
            .any(|entitlement| entitlement.is_active)
    }

    /// Cached subscription status.
    pub async fn subscription_status(&self) -> Option<SubscriptionStatus> {
        self.cache.read().await.subscription_status.clone()
    }

    /// True when the cached status reports an active subscription.
    pub async fn is_subscribed(&self) -> bool {
        self.cache
            .read()
            .await
            .subscription_status
            .as_ref()
            .map_or(false, |status| status.is_subscribed)
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    /// Record that a product was shown to the user.
    pub async fn track_product_viewed(&self, product: &Product) {
        self.emit(PurchaseEvent::ProductViewed {
            product_id: product.id.clone(),
        })
        .await;
    }

    /// Record that a paywall was shown to the user.
    pub async fn track_paywall_viewed(&self) {
        self.emit(PurchaseEvent::PaywallViewed).await;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn provider(&self) -> Result<Arc<dyn PurchaseProvider>> {
        self.provider
            .read()
            .await
            .clone()
            .ok_or(StoreError::NotConfigured)
    }

    async fn emit(&self, event: PurchaseEvent) {
        let sink = Arc::clone(&*self.analytics.read().await);
        sink.track(&event);
    }

    /// Clear the cache baseline and refresh without lifecycle events, used
    /// when the identity changes and diffing against the old user would lie.
    async fn rebase_cache(&self) {
        *self.cache.write().await = CachedState::default();
        if let Err(error) = self.refresh_state().await {
            warn!(error = %error, "state refresh after identity change failed");
        }
    }
}

impl Default for PurchaseManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Diff two subscription status snapshots into at most one lifecycle event.
///
/// Renewal is checked first (expiration moved strictly later while staying
/// subscribed), then cancellation (auto-renew turned off), then expiry
/// (subscribed to not subscribed). Becoming subscribed for the first time is
/// the purchase flow's story, not a transition, and a `None` on either side
/// means "unknown", which never counts as a transition.
fn transition_event(
    previous: &Option<SubscriptionStatus>,
    next: &Option<SubscriptionStatus>,
) -> Option<PurchaseEvent> {
    let (Some(previous), Some(next)) = (previous, next) else {
        return None;
    };

    if previous.is_subscribed && next.is_subscribed {
        if let (Some(old_expiry), Some(new_expiry)) =
            (previous.expiration_date, next.expiration_date)
        {
            if new_expiry > old_expiry {
                return Some(PurchaseEvent::SubscriptionRenewed {
                    product_id: next.active_product_id.clone(),
                });
            }
        }
        if previous.will_renew && !next.will_renew {
            return Some(PurchaseEvent::SubscriptionCancelled {
                product_id: next.active_product_id.clone(),
            });
        }
        return None;
    }
    if previous.is_subscribed && !next.is_subscribed {
        return Some(PurchaseEvent::SubscriptionExpired {
            product_id: previous.active_product_id.clone(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn subscribed(days_left: i64, will_renew: bool) -> SubscriptionStatus {
        SubscriptionStatus {
            is_subscribed: true,
            active_product_id: Some(ProductId::from("pro_monthly")),
            expiration_date: Some(Utc::now() + Duration::days(days_left)),
            will_renew,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_transition_without_baseline() {
        assert!(transition_event(&None, &Some(subscribed(30, true))).is_none());
        assert!(transition_event(&None, &None).is_none());
    }

    #[test]
    fn test_first_subscription_is_not_a_transition() {
        let previous = Some(SubscriptionStatus::not_subscribed());
        let next = Some(subscribed(30, true));
        assert!(transition_event(&previous, &next).is_none());
    }

    #[test]
    fn test_renewal_detected_on_later_expiration() {
        let previous = Some(subscribed(3, true));
        let next = Some(subscribed(33, true));
        assert!(matches!(
            transition_event(&previous, &next),
            Some(PurchaseEvent::SubscriptionRenewed { .. })
        ));
    }

    #[test]
    fn test_cancellation_detected_on_renewal_flag_drop() {
        let previous = Some(subscribed(30, true));
        let mut later = subscribed(30, false);
        later.expiration_date = previous.as_ref().unwrap().expiration_date;
        let next = Some(later);
        assert!(matches!(
            transition_event(&previous, &next),
            Some(PurchaseEvent::SubscriptionCancelled { .. })
        ));
    }

    #[test]
    fn test_renewal_outranks_cancellation() {
        // Expiration moved later and auto-renew flipped off in the same
        // refresh: only the renewal is reported.
        let previous = Some(subscribed(3, true));
        let next = Some(subscribed(33, false));
        assert!(matches!(
            transition_event(&previous, &next),
            Some(PurchaseEvent::SubscriptionRenewed { .. })
        ));
    }

    #[test]
    fn test_expiry_detected() {
        let previous = Some(subscribed(3, false));
        let next = Some(SubscriptionStatus::not_subscribed());
        let event = transition_event(&previous, &next);
        match event {
            Some(PurchaseEvent::SubscriptionExpired { product_id }) => {
                assert_eq!(product_id, Some(ProductId::from("pro_monthly")));
            }
            other => panic!("expected expiry event, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_next_status_is_not_expiry() {
        let previous = Some(subscribed(3, true));
        assert!(transition_event(&previous, &None).is_none());
    }

    #[test]
    fn test_unchanged_status_is_silent() {
        let status = subscribed(30, true);
        assert!(transition_event(&Some(status.clone()), &Some(status)).is_none());
    }
}
