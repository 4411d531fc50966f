//! [`PurchaseProvider`] implementation backed by RevenueCat.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use purchasekit_lib::{
    Entitlement, Offerings, Product, ProductId, PurchaseOutcome, PurchaseProvider, Result,
    StoreConfig, StoreError, SubscriptionStatus,
};

use crate::api::RcStoreProduct;
use crate::client::{RevenueCatClientConfig, RevenueCatRestClient};
use crate::mapping;
use crate::sdk::RevenueCatSdk;

/// Prefix RevenueCat uses for generated anonymous identities.
const ANONYMOUS_ID_PREFIX: &str = "$RCAnonymousID:";

fn anonymous_app_user_id() -> String {
    format!("{ANONYMOUS_ID_PREFIX}{}", Uuid::new_v4().simple())
}

#[derive(Default)]
struct ProviderState {
    sdk: Option<Arc<dyn RevenueCatSdk>>,
    config: Option<StoreConfig>,
    app_user_id: String,
}

/// RevenueCat-backed purchase provider.
///
/// Holds the current backend session (SDK, configuration, identity) behind a
/// lock that is never held across a backend call. Construction is cheap and
/// does no I/O: the backend is first contacted by
/// [`configure`](PurchaseProvider::configure), and until that succeeds the
/// provider reports itself unconfigured.
pub struct RevenueCatProvider {
    state: RwLock<ProviderState>,
}

impl RevenueCatProvider {
    /// Provider that will build a REST client from the store configuration.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ProviderState::default()),
        }
    }

    /// Provider running against an injected SDK, used for custom backends
    /// and tests.
    pub fn with_sdk(sdk: Arc<dyn RevenueCatSdk>) -> Self {
        Self {
            state: RwLock::new(ProviderState {
                sdk: Some(sdk),
                ..Default::default()
            }),
        }
    }

    /// Identity the provider is currently operating as, once configured.
    pub fn current_app_user_id(&self) -> Option<String> {
        let state = self.state();
        state.config.as_ref()?;
        Some(state.app_user_id.clone())
    }

    fn state(&self) -> RwLockReadGuard<'_, ProviderState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ProviderState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot the active session, failing when unconfigured.
    fn session(&self) -> Result<(Arc<dyn RevenueCatSdk>, String, StoreConfig)> {
        let state = self.state();
        match (&state.sdk, &state.config) {
            (Some(sdk), Some(config)) => {
                Ok((Arc::clone(sdk), state.app_user_id.clone(), config.clone()))
            }
            _ => Err(StoreError::NotConfigured),
        }
    }

    async fn switch_identity(&self, target: String) -> Result<()> {
        let (sdk, _, _) = self.session()?;
        sdk.log_in(&target)
            .await
            .map_err(mapping::store_error_from_rc)?;
        self.state_mut().app_user_id = target;
        Ok(())
    }

    /// Find the backend product for a purchase: first through the attached
    /// handle, then by re-resolving the identifier against the catalog.
    async fn resolve_native_product(
        &self,
        sdk: &Arc<dyn RevenueCatSdk>,
        product: &Product,
    ) -> Result<RcStoreProduct> {
        if let Some(native) = product
            .backend_handle
            .as_ref()
            .and_then(|handle| handle.downcast_ref::<RcStoreProduct>())
        {
            return Ok(native.clone());
        }
        debug!(product = %product.id, "product carries no usable handle, re-resolving");
        let wanted = vec![product.id.as_str().to_string()];
        let wire = sdk
            .get_products(&wanted)
            .await
            .map_err(mapping::store_error_from_rc)?;
        wire.into_iter()
            .find(|rc| rc.identifier == product.id.as_str())
            .ok_or_else(|| StoreError::ProductNotFound(product.id.to_string()))
    }
}

impl Default for RevenueCatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurchaseProvider for RevenueCatProvider {
    fn name(&self) -> &str {
        "revenuecat"
    }

    async fn configure(&self, config: &StoreConfig) -> Result<()> {
        config.validate()?;

        let (existing_sdk, already_configured) = {
            let state = self.state();
            (state.sdk.clone(), state.config.is_some())
        };
        if already_configured {
            warn!("provider is already configured, keeping the existing configuration");
            return Ok(());
        }

        let sdk = match existing_sdk {
            Some(sdk) => sdk,
            None => {
                let client =
                    RevenueCatRestClient::new(RevenueCatClientConfig::from_store_config(config))
                        .map_err(mapping::store_error_from_rc)?;
                Arc::new(client) as Arc<dyn RevenueCatSdk>
            }
        };

        let app_user_id = config
            .app_user_id
            .clone()
            .unwrap_or_else(anonymous_app_user_id);
        sdk.log_in(&app_user_id)
            .await
            .map_err(mapping::store_error_from_rc)?;

        let mut state = self.state_mut();
        if state.config.is_some() {
            warn!("provider was configured concurrently, keeping the existing configuration");
            return Ok(());
        }
        state.sdk = Some(sdk);
        state.config = Some(config.clone());
        state.app_user_id = app_user_id;
        info!(app_user_id = %state.app_user_id, "RevenueCat provider configured");
        Ok(())
    }

    async fn identify(&self, user_id: Option<&str>) -> Result<()> {
        let target = match user_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            Some(_) => {
                return Err(StoreError::unknown("app user id must not be blank"));
            }
            None => anonymous_app_user_id(),
        };
        self.switch_identity(target).await
    }

    async fn log_out(&self) -> Result<()> {
        self.switch_identity(anonymous_app_user_id()).await
    }

    async fn fetch_products(&self, identifiers: &[ProductId]) -> Result<Vec<Product>> {
        let (sdk, _, config) = self.session()?;

        let mut seen = HashSet::new();
        let unique: Vec<String> = identifiers
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .map(|id| id.as_str().to_string())
            .collect();
        if config.debug_logging {
            debug!(requested = unique.len(), "fetching products");
        }

        let wire = sdk
            .get_products(&unique)
            .await
            .map_err(mapping::store_error_from_rc)?;
        let products: Vec<Product> = wire.iter().map(mapping::product_from_rc).collect();

        if products.is_empty() {
            return Err(StoreError::FetchProductsFailed(format!(
                "none of the {} requested product identifiers resolved",
                unique.len()
            )));
        }
        if products.len() < unique.len() {
            warn!(
                requested = unique.len(),
                resolved = products.len(),
                "some product identifiers did not resolve"
            );
        }
        Ok(products)
    }

    async fn fetch_offerings(&self) -> Result<Offerings> {
        let (sdk, app_user_id, config) = self.session()?;
        if config.debug_logging {
            debug!("fetching offerings");
        }

        let response = sdk
            .get_offerings(&app_user_id)
            .await
            .map_err(mapping::store_error_from_rc)?;

        let mut seen = HashSet::new();
        let wanted: Vec<String> = response
            .offerings
            .iter()
            .flat_map(|offering| &offering.packages)
            .map(|package| package.platform_product_identifier.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let mut catalog: HashMap<String, Product> = HashMap::new();
        if !wanted.is_empty() {
            let wire = sdk
                .get_products(&wanted)
                .await
                .map_err(mapping::store_error_from_rc)?;
            for rc in &wire {
                catalog.insert(rc.identifier.clone(), mapping::product_from_rc(rc));
            }
        }

        let mut offerings = Offerings::new();
        for offering in &response.offerings {
            let mut products = Vec::new();
            for package in &offering.packages {
                match catalog.get(&package.platform_product_identifier) {
                    Some(product) => products.push(product.clone()),
                    None => warn!(
                        offering = %offering.identifier,
                        product = %package.platform_product_identifier,
                        "offering references a product the catalog does not know"
                    ),
                }
            }
            offerings = offerings.with_offering(offering.identifier.clone(), products);
        }
        if let Some(current) = response.current_offering_id {
            offerings = offerings.with_current_offering(current);
        }
        Ok(offerings)
    }

    async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome> {
        let (sdk, app_user_id, config) = self.session()?;
        let native = self.resolve_native_product(&sdk, product).await?;

        if config.debug_logging {
            debug!(product = %product.id, "starting purchase");
        }
        match sdk.purchase(&app_user_id, &native).await {
            Ok(response) => Ok(mapping::outcome_from_purchase_response(&response)),
            Err(error) => Ok(mapping::outcome_from_rc_error(error)),
        }
    }

    async fn restore_purchases(&self) -> Result<()> {
        let (sdk, app_user_id, _) = self.session()?;
        sdk.restore_purchases(&app_user_id)
            .await
            .map(|_| ())
            .map_err(mapping::store_error_from_rc)
    }

    async fn sync_purchases(&self) -> Result<()> {
        let (sdk, app_user_id, _) = self.session()?;
        sdk.sync_purchases(&app_user_id)
            .await
            .map(|_| ())
            .map_err(mapping::store_error_from_rc)
    }

    async fn has_entitlement(&self, entitlement_id: &str) -> bool {
        self.current_entitlements()
            .await
            .iter()
            .any(|entitlement| entitlement.id == entitlement_id && entitlement.is_active)
    }

    async fn current_entitlements(&self) -> Vec<Entitlement> {
        let Ok((sdk, app_user_id, _)) = self.session() else {
            warn!("entitlement query before configuration, returning none");
            return Vec::new();
        };
        match sdk.get_customer_info(&app_user_id).await {
            Ok(subscriber) => mapping::entitlements_from_subscriber(&subscriber, Utc::now()),
            Err(error) => {
                warn!(error = %error, "entitlement query failed, returning none");
                Vec::new()
            }
        }
    }

    async fn subscription_status(&self) -> Option<SubscriptionStatus> {
        let Ok((sdk, app_user_id, config)) = self.session() else {
            warn!("subscription status query before configuration");
            return None;
        };
        match sdk.get_customer_info(&app_user_id).await {
            Ok(subscriber) => Some(mapping::status_from_subscriber(
                &subscriber,
                &config.entitlement_ids,
                Utc::now(),
            )),
            Err(error) => {
                warn!(error = %error, "subscription status query failed");
                None
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.state().config.is_some()
    }
}
