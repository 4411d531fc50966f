//! Scriptable in-memory SDK for tests.
//!
//! [`MockRevenueCatSdk`] holds one shared subscriber that tests shape
//! directly, a product catalog, and a FIFO script of purchase results.
//! Every operation records what it was called with so assertions can check
//! the adapter's side of the conversation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::{
    RcEntitlementInfo, RcError, RcOfferingsResponse, RcPurchaseResponse, RcResult,
    RcStoreProduct, RcStoreTransaction, RcSubscriber, RcSubscriptionInfo,
};
use crate::sdk::RevenueCatSdk;

#[derive(Default)]
struct MockState {
    products: Vec<RcStoreProduct>,
    subscriber: RcSubscriber,
    offerings: RcOfferingsResponse,
    purchase_script: VecDeque<RcResult<RcPurchaseResponse>>,
    log_in_error: Option<RcError>,
    products_error: Option<RcError>,
    offerings_error: Option<RcError>,
    restore_error: Option<RcError>,
    sync_error: Option<RcError>,
    customer_info_error: Option<RcError>,
    last_logged_in: Option<String>,
    last_requested_ids: Vec<String>,
    last_purchased_product: Option<String>,
}

/// Mock backend with scripted responses and call recording.
#[derive(Default)]
pub struct MockRevenueCatSdk {
    state: Mutex<MockState>,
    log_in_calls: AtomicUsize,
    get_products_calls: AtomicUsize,
    get_offerings_calls: AtomicUsize,
    purchase_calls: AtomicUsize,
    restore_calls: AtomicUsize,
    sync_calls: AtomicUsize,
    customer_info_calls: AtomicUsize,
}

impl MockRevenueCatSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the product catalog.
    pub fn with_products(self, products: Vec<RcStoreProduct>) -> Self {
        self.state_mut().products = products;
        self
    }

    /// Replace the shared subscriber snapshot.
    pub fn set_subscriber(&self, subscriber: RcSubscriber) {
        self.state_mut().subscriber = subscriber;
    }

    /// Grant an entitlement on the shared subscriber, wiring up the matching
    /// subscription entry.
    pub fn grant_entitlement(
        &self,
        entitlement_id: &str,
        product_id: &str,
        expires: Option<DateTime<Utc>>,
    ) {
        let mut state = self.state_mut();
        state.subscriber.entitlements.insert(
            entitlement_id.to_string(),
            RcEntitlementInfo {
                expires_date: expires,
                purchase_date: Some(Utc::now()),
                product_identifier: Some(product_id.to_string()),
                grace_period_expires_date: None,
            },
        );
        state.subscriber.subscriptions.insert(
            product_id.to_string(),
            RcSubscriptionInfo {
                expires_date: expires,
                purchase_date: Some(Utc::now()),
                period_type: "normal".to_string(),
                ..Default::default()
            },
        );
    }

    /// Drop every entitlement and subscription from the shared subscriber.
    pub fn clear_entitlements(&self) {
        let mut state = self.state_mut();
        state.subscriber.entitlements.clear();
        state.subscriber.subscriptions.clear();
    }

    pub fn set_offerings(&self, offerings: RcOfferingsResponse) {
        self.state_mut().offerings = offerings;
    }

    /// Queue the result of the next unscripted-by-default purchase call.
    pub fn script_purchase(&self, result: RcResult<RcPurchaseResponse>) {
        self.state_mut().purchase_script.push_back(result);
    }

    /// A settled purchase response for `product`, with a fresh transaction id.
    pub fn success_response(product: &RcStoreProduct) -> RcPurchaseResponse {
        RcPurchaseResponse {
            transaction: Some(RcStoreTransaction {
                transaction_id: format!("txn-{}", Uuid::new_v4().simple()),
                original_transaction_id: None,
                product_id: product.identifier.clone(),
                purchase_date: Utc::now(),
                expires_date: None,
                price: Some(product.price),
                currency_code: Some(product.currency_code.clone()),
            }),
            subscriber: None,
            user_cancelled: false,
        }
    }

    pub fn set_log_in_error(&self, error: Option<RcError>) {
        self.state_mut().log_in_error = error;
    }

    pub fn set_products_error(&self, error: Option<RcError>) {
        self.state_mut().products_error = error;
    }

    pub fn set_offerings_error(&self, error: Option<RcError>) {
        self.state_mut().offerings_error = error;
    }

    pub fn set_restore_error(&self, error: Option<RcError>) {
        self.state_mut().restore_error = error;
    }

    pub fn set_sync_error(&self, error: Option<RcError>) {
        self.state_mut().sync_error = error;
    }

    pub fn set_customer_info_error(&self, error: Option<RcError>) {
        self.state_mut().customer_info_error = error;
    }

    pub fn log_in_calls(&self) -> usize {
        self.log_in_calls.load(Ordering::SeqCst)
    }

    pub fn get_products_calls(&self) -> usize {
        self.get_products_calls.load(Ordering::SeqCst)
    }

    pub fn get_offerings_calls(&self) -> usize {
        self.get_offerings_calls.load(Ordering::SeqCst)
    }

    pub fn purchase_calls(&self) -> usize {
        self.purchase_calls.load(Ordering::SeqCst)
    }

    pub fn restore_calls(&self) -> usize {
        self.restore_calls.load(Ordering::SeqCst)
    }

    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    pub fn customer_info_calls(&self) -> usize {
        self.customer_info_calls.load(Ordering::SeqCst)
    }

    /// The identity passed to the most recent `log_in`.
    pub fn last_logged_in_user(&self) -> Option<String> {
        self.state_mut().last_logged_in.clone()
    }

    /// The identifiers passed to the most recent `get_products`.
    pub fn last_requested_product_ids(&self) -> Vec<String> {
        self.state_mut().last_requested_ids.clone()
    }

    /// The product passed to the most recent `purchase`.
    pub fn last_purchased_product_id(&self) -> Option<String> {
        self.state_mut().last_purchased_product.clone()
    }

    fn state_mut(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RevenueCatSdk for MockRevenueCatSdk {
    async fn log_in(&self, app_user_id: &str) -> RcResult<RcSubscriber> {
        self.log_in_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state_mut();
        if let Some(error) = state.log_in_error.clone() {
            return Err(error);
        }
        state.last_logged_in = Some(app_user_id.to_string());
        state.subscriber.original_app_user_id = app_user_id.to_string();
        Ok(state.subscriber.clone())
    }

    async fn get_products(&self, identifiers: &[String]) -> RcResult<Vec<RcStoreProduct>> {
        self.get_products_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state_mut();
        if let Some(error) = state.products_error.clone() {
            return Err(error);
        }
        state.last_requested_ids = identifiers.to_vec();
        Ok(state
            .products
            .iter()
            .filter(|product| identifiers.contains(&product.identifier))
            .cloned()
            .collect())
    }

    async fn get_offerings(&self, _app_user_id: &str) -> RcResult<RcOfferingsResponse> {
        self.get_offerings_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state_mut();
        if let Some(error) = state.offerings_error.clone() {
            return Err(error);
        }
        Ok(state.offerings.clone())
    }

    async fn purchase(
        &self,
        _app_user_id: &str,
        product: &RcStoreProduct,
    ) -> RcResult<RcPurchaseResponse> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state_mut();
        state.last_purchased_product = Some(product.identifier.clone());
        let result = state
            .purchase_script
            .pop_front()
            .unwrap_or_else(|| Ok(Self::success_response(product)));
        // A response carrying a subscriber snapshot updates the shared one,
        // the same way the live backend returns post-purchase state.
        if let Ok(response) = &result {
            if let Some(subscriber) = &response.subscriber {
                state.subscriber = subscriber.clone();
            }
        }
        result
    }

    async fn restore_purchases(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state_mut();
        if let Some(error) = state.restore_error.clone() {
            return Err(error);
        }
        Ok(state.subscriber.clone())
    }

    async fn sync_purchases(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state_mut();
        if let Some(error) = state.sync_error.clone() {
            return Err(error);
        }
        Ok(state.subscriber.clone())
    }

    async fn get_customer_info(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        self.customer_info_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state_mut();
        if let Some(error) = state.customer_info_error.clone() {
            return Err(error);
        }
        Ok(state.subscriber.clone())
    }
}
