//! RevenueCat provider adapter for PurchaseKit.
//!
//! [`RevenueCatProvider`] implements
//! [`PurchaseProvider`](purchasekit_lib::PurchaseProvider) on top of a
//! [`RevenueCatSdk`] backend: by default the bundled REST client (behind the
//! `http-backend` feature), or any injected implementation. All RevenueCat
//! wire shapes stay inside this crate; callers only ever see the domain
//! types from `purchasekit-lib`.
//!
//! # Example
//!
//! ```no_run
//! use purchasekit_lib::{PurchaseProvider, StoreConfig};
//! use purchasekit_revenuecat::RevenueCatProvider;
//!
//! # async fn demo() -> purchasekit_lib::Result<()> {
//! let provider = RevenueCatProvider::new();
//! provider
//!     .configure(&StoreConfig::new("public_sdk_key").with_app_user_id("user-1"))
//!     .await?;
//!
//! let products = provider.fetch_products(&["pro_monthly".into()]).await?;
//! let outcome = provider.purchase(&products[0]).await?;
//! println!("purchase ended as {outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
mod mapping;
pub mod provider;
pub mod sdk;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::{
    RevenueCatClientConfig, RevenueCatRestClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS,
};
pub use provider::RevenueCatProvider;
pub use sdk::RevenueCatSdk;
#[cfg(any(test, feature = "test-utils"))]
pub use testing::MockRevenueCatSdk;
