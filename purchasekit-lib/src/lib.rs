//! Core contracts for PurchaseKit.
//!
//! Everything the facade and the provider adapters share lives here: the
//! domain model, the provider capability trait, the analytics pipeline,
//! store configuration, and the closed error taxonomy. The crate performs
//! no I/O itself; concrete backends implement [`PurchaseProvider`] in their
//! own crates and the consumer-facing `purchasekit` crate orchestrates them.
//!
//! # Example
//!
//! ```rust
//! use purchasekit_lib::{Product, ProductKind, StoreError};
//! use rust_decimal::Decimal;
//!
//! let product = Product::new(
//!     "pro_monthly",
//!     "Pro Monthly",
//!     "Full access, billed monthly",
//!     Decimal::new(999, 2),
//!     "$9.99",
//!     "USD",
//!     ProductKind::AutoRenewableSubscription,
//! );
//! assert!(product.is_subscription());
//!
//! // Retryability is derived from the error kind alone.
//! assert!(StoreError::network("offline").is_retryable());
//! assert!(!StoreError::UserCancelled.is_retryable());
//! ```

pub mod analytics;
pub mod config;
pub mod errors;
pub mod model;
pub mod provider;

pub use analytics::{AnalyticsSink, LogAnalyticsSink, PurchaseEvent};
pub use config::{BackendApiVersion, StoreConfig};
pub use errors::{Result, StoreError, StoreErrorCode};
pub use model::{
    BackendHandle, Entitlement, EntitlementPeriodType, IntroductoryOffer, Offerings, PaymentMode,
    PeriodUnit, Product, ProductId, ProductKind, PurchaseOutcome, SubscriptionPeriod,
    SubscriptionStatus, Transaction,
};
pub use provider::PurchaseProvider;
