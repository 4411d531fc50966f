//! REST client for the RevenueCat API.
//!
//! Only compiled against `reqwest` when the `http-backend` feature is
//! enabled; without it every call returns [`RcError::Unimplemented`] so the
//! crate still builds for consumers that inject their own SDK.

#[cfg(feature = "http-backend")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "http-backend")]
use serde::de::DeserializeOwned;
#[cfg(feature = "http-backend")]
use serde::Serialize;

use purchasekit_lib::{BackendApiVersion, StoreConfig};

#[cfg(feature = "http-backend")]
use crate::api::{RcProductsResponse, RcPurchaseRequest, RcSubscriberResponse};
use crate::api::{
    RcError, RcErrorBody, RcOfferingsResponse, RcPurchaseResponse, RcResult, RcStoreProduct,
    RcSubscriber, RC_CODE_INVALID_RECEIPT,
};
use crate::sdk::RevenueCatSdk;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.revenuecat.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backoff hint attached to rate-limit errors when the backend supplies none.
const DEFAULT_RETRY_AFTER_MS: u64 = 5_000;

/// Connection settings for [`RevenueCatRestClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueCatClientConfig {
    /// Base URL of the API, without a trailing path.
    pub api_url: String,
    /// Secret API key sent as a bearer token.
    pub api_key: String,
    /// Path prefix selecting the backend API generation.
    pub api_version: BackendApiVersion,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RevenueCatClientConfig {
    /// Production configuration for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            api_version: BackendApiVersion::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Derive client settings from a store configuration.
    pub fn from_store_config(config: &StoreConfig) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Point the client at a different endpoint (proxy or test server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// [`RevenueCatSdk`] implementation backed by the REST API.
pub struct RevenueCatRestClient {
    config: RevenueCatClientConfig,
    #[cfg(feature = "http-backend")]
    client: reqwest::Client,
}

impl RevenueCatRestClient {
    /// Create a new client.
    #[cfg(feature = "http-backend")]
    pub fn new(config: RevenueCatClientConfig) -> RcResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RcError::Unknown(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a new client (no-op stub without the `http-backend` feature).
    #[cfg(not(feature = "http-backend"))]
    pub fn new(config: RevenueCatClientConfig) -> RcResult<Self> {
        Ok(Self { config })
    }

    /// Connection settings this client was built with.
    pub fn config(&self) -> &RevenueCatClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn subscriber_path(&self, app_user_id: &str) -> String {
        format!(
            "/{}/subscribers/{}",
            self.config.api_version.as_str(),
            app_user_id
        )
    }

    #[cfg(feature = "http-backend")]
    async fn get<T: DeserializeOwned>(&self, path: &str) -> RcResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;
        Self::handle_response(response).await
    }

    #[cfg(feature = "http-backend")]
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> RcResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;
        Self::handle_response(response).await
    }

    #[cfg(feature = "http-backend")]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> RcResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status_error(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| RcError::Decode(e.to_string()))
    }

    fn map_status_error(status: u16, body: &str) -> RcError {
        let parsed: RcErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .unwrap_or_else(|| format!("HTTP {status} with no error detail"));
        match status {
            401 | 403 => RcError::InvalidCredentials(message),
            404 => RcError::NotFound(message),
            400 if parsed.code == Some(RC_CODE_INVALID_RECEIPT) => RcError::InvalidReceipt(message),
            429 => RcError::RateLimited {
                retry_after_ms: DEFAULT_RETRY_AFTER_MS,
            },
            500..=599 => RcError::StoreProblem(message),
            _ => RcError::Http { status, message },
        }
    }

    #[cfg(feature = "http-backend")]
    fn map_reqwest_error(e: reqwest::Error) -> RcError {
        if e.is_timeout() {
            RcError::Timeout(e.to_string())
        } else if e.is_connect() {
            RcError::Network(format!("connection failed: {e}"))
        } else {
            RcError::Network(e.to_string())
        }
    }
}

#[cfg(feature = "http-backend")]
#[async_trait]
impl RevenueCatSdk for RevenueCatRestClient {
    async fn log_in(&self, app_user_id: &str) -> RcResult<RcSubscriber> {
        let response: RcSubscriberResponse = self.get(&self.subscriber_path(app_user_id)).await?;
        Ok(response.subscriber)
    }

    async fn get_products(&self, identifiers: &[String]) -> RcResult<Vec<RcStoreProduct>> {
        let path = format!(
            "/{}/products?ids={}",
            self.config.api_version.as_str(),
            identifiers.join(",")
        );
        let response: RcProductsResponse = self.get(&path).await?;
        Ok(response.products)
    }

    async fn get_offerings(&self, app_user_id: &str) -> RcResult<RcOfferingsResponse> {
        let path = format!("{}/offerings", self.subscriber_path(app_user_id));
        self.get(&path).await
    }

    async fn purchase(
        &self,
        app_user_id: &str,
        product: &RcStoreProduct,
    ) -> RcResult<RcPurchaseResponse> {
        let path = format!("{}/purchases", self.subscriber_path(app_user_id));
        let body = RcPurchaseRequest {
            product_id: product.identifier.clone(),
            price: product.price,
            currency_code: product.currency_code.clone(),
        };
        self.post(&path, &body).await
    }

    async fn restore_purchases(&self, app_user_id: &str) -> RcResult<RcSubscriber> {
        let path = format!("{}/restore", self.subscriber_path(app_user_id));
        let response: RcSubscriberResponse = self.post(&path, &serde_json::json!({})).await?;
        Ok(response.subscriber)
    }

    async fn sync_purchases(&self, app_user_id: &str) -> RcResult<RcSubscriber> {
        let path = format!("{}/sync", self.subscriber_path(app_user_id));
        let response: RcSubscriberResponse = self.post(&path, &serde_json::json!({})).await?;
        Ok(response.subscriber)
    }

    async fn get_customer_info(&self, app_user_id: &str) -> RcResult<RcSubscriber> {
        let response: RcSubscriberResponse = self.get(&self.subscriber_path(app_user_id)).await?;
        Ok(response.subscriber)
    }
}

#[cfg(not(feature = "http-backend"))]
#[async_trait]
impl RevenueCatSdk for RevenueCatRestClient {
    async fn log_in(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn get_products(&self, _identifiers: &[String]) -> RcResult<Vec<RcStoreProduct>> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn get_offerings(&self, _app_user_id: &str) -> RcResult<RcOfferingsResponse> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn purchase(
        &self,
        _app_user_id: &str,
        _product: &RcStoreProduct,
    ) -> RcResult<RcPurchaseResponse> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn restore_purchases(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn sync_purchases(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }

    async fn get_customer_info(&self, _app_user_id: &str) -> RcResult<RcSubscriber> {
        Err(RcError::Unimplemented("http-backend feature is disabled"))
    }
}
