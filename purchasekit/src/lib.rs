//! PurchaseKit: a provider-agnostic facade over in-app purchase backends.
//!
//! Apps talk to one [`PurchaseManager`]; the commercial subscription backend
//! sits behind the [`PurchaseProvider`] trait and can be swapped without
//! touching call sites. The bundled RevenueCat adapter (the `revenuecat`
//! feature, on by default) is the production provider.
//!
//! # Quickstart
//!
//! ```no_run
//! use purchasekit::{PurchaseManager, PurchaseOutcome, StoreConfig};
//!
//! # async fn demo() -> purchasekit::Result<()> {
//! let manager = PurchaseManager::new();
//! manager
//!     .configure_revenuecat(
//!         &StoreConfig::new("public_sdk_key")
//!             .with_app_user_id("user-1")
//!             .with_entitlement_ids(["premium"]),
//!     )
//!     .await?;
//!
//! let products = manager.fetch_products(&["pro_monthly".into()]).await?;
//! match manager.purchase(&products[0]).await? {
//!     PurchaseOutcome::Success(transaction) => {
//!         println!("bought {} ({})", transaction.product_id, transaction.id);
//!     }
//!     PurchaseOutcome::Cancelled => println!("user backed out"),
//!     other => println!("purchase ended as {other:?}"),
//! }
//!
//! if manager.has_entitlement("premium").await {
//!     // unlock the good stuff
//! }
//! # Ok(())
//! # }
//! ```

pub mod manager;

pub use manager::PurchaseManager;

pub use purchasekit_lib::{
    AnalyticsSink, BackendApiVersion, BackendHandle, Entitlement, EntitlementPeriodType,
    IntroductoryOffer, LogAnalyticsSink, Offerings, PaymentMode, PeriodUnit, Product, ProductId,
    ProductKind, PurchaseEvent, PurchaseOutcome, PurchaseProvider, Result, StoreConfig,
    StoreError, StoreErrorCode, SubscriptionPeriod, SubscriptionStatus, Transaction,
};

/// The bundled RevenueCat provider adapter.
#[cfg(feature = "revenuecat")]
pub use purchasekit_revenuecat as revenuecat;
