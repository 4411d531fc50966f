//! The boundary trait between the adapter and the RevenueCat backend.

use async_trait::async_trait;

use crate::api::{
    RcOfferingsResponse, RcPurchaseResponse, RcResult, RcStoreProduct, RcSubscriber,
};

/// Operations the adapter needs from a RevenueCat backend.
///
/// The production implementation is [`crate::client::RevenueCatRestClient`];
/// tests script [`crate::testing::MockRevenueCatSdk`] instead. Identity is
/// not stored here: the current `app_user_id` is owned by the provider and
/// passed into every call that needs one.
#[async_trait]
pub trait RevenueCatSdk: Send + Sync {
    /// Fetch (creating on first sight) the subscriber for `app_user_id`.
    async fn log_in(&self, app_user_id: &str) -> RcResult<RcSubscriber>;

    /// Look up store products by identifier. Unknown identifiers are
    /// silently absent from the result.
    async fn get_products(&self, identifiers: &[String]) -> RcResult<Vec<RcStoreProduct>>;

    /// Fetch the offering configuration for `app_user_id`.
    async fn get_offerings(&self, app_user_id: &str) -> RcResult<RcOfferingsResponse>;

    /// Attempt to buy `product` on behalf of `app_user_id`.
    async fn purchase(
        &self,
        app_user_id: &str,
        product: &RcStoreProduct,
    ) -> RcResult<RcPurchaseResponse>;

    /// Replay historical store transactions onto `app_user_id`.
    async fn restore_purchases(&self, app_user_id: &str) -> RcResult<RcSubscriber>;

    /// Reconcile local store state with the backend without replaying
    /// historical transactions.
    async fn sync_purchases(&self, app_user_id: &str) -> RcResult<RcSubscriber>;

    /// Fetch the current subscriber snapshot without side effects.
    async fn get_customer_info(&self, app_user_id: &str) -> RcResult<RcSubscriber>;
}
