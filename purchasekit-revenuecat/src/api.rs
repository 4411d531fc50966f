//! Wire types for the RevenueCat backend.
//!
//! These structs mirror the JSON shapes the RevenueCat API returns. They are
//! deliberately kept separate from the domain model in `purchasekit-lib`:
//! nothing outside this crate should ever see a `Rc*` type. The translation
//! into domain types lives in [`crate::mapping`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result alias for backend calls.
pub type RcResult<T> = std::result::Result<T, RcError>;

// ============================================================================
// Catalog
// ============================================================================

/// A product as the RevenueCat backend describes it.
///
/// `subscription_period` and the introductory-offer period use ISO 8601
/// duration strings (`"P1M"`, `"P1Y"`, `"P3D"`), which is how RevenueCat
/// encodes billing periods on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcStoreProduct {
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub price_string: Option<String>,
    #[serde(default)]
    pub currency_code: String,
    /// `"subscription"`, `"non_renewing_subscription"`, `"consumable"` or
    /// `"non_consumable"`. Unknown values are tolerated and mapped to the
    /// closest domain kind.
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub subscription_period: Option<String>,
    #[serde(default)]
    pub introductory_price: Option<RcIntroPrice>,
}

/// Introductory pricing attached to a subscription product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcIntroPrice {
    pub price: Decimal,
    #[serde(default)]
    pub period: Option<String>,
    /// `"free_trial"`, `"pay_up_front"` or `"pay_as_you_go"`.
    #[serde(default)]
    pub payment_mode: Option<String>,
}

/// Response body for a product catalog query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcProductsResponse {
    #[serde(default)]
    pub products: Vec<RcStoreProduct>,
}

// ============================================================================
// Subscriber
// ============================================================================

/// Envelope around the subscriber object, as returned by
/// `GET /v1/subscribers/{app_user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcSubscriberResponse {
    #[serde(default)]
    pub request_date: Option<DateTime<Utc>>,
    pub subscriber: RcSubscriber,
}

/// The backend's view of one app user: entitlements keyed by entitlement
/// identifier and subscriptions keyed by product identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcSubscriber {
    #[serde(default)]
    pub original_app_user_id: String,
    #[serde(default)]
    pub management_url: Option<String>,
    #[serde(default)]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entitlements: HashMap<String, RcEntitlementInfo>,
    #[serde(default)]
    pub subscriptions: HashMap<String, RcSubscriptionInfo>,
}

/// One entitlement entry on a subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcEntitlementInfo {
    /// `None` means the entitlement never expires (lifetime access).
    #[serde(default)]
    pub expires_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product_identifier: Option<String>,
    #[serde(default)]
    pub grace_period_expires_date: Option<DateTime<Utc>>,
}

/// One subscription entry on a subscriber.
///
/// Renewal intent is not a wire field; it is derived from
/// `unsubscribe_detected_at`, which the backend sets as soon as the user
/// turns auto-renew off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcSubscriptionInfo {
    #[serde(default)]
    pub expires_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_purchase_date: Option<DateTime<Utc>>,
    /// `"normal"`, `"trial"` or `"intro"`. Unknown values map to normal.
    #[serde(default)]
    pub period_type: String,
    /// Originating store, e.g. `"app_store"`, `"play_store"`, `"stripe"` or
    /// `"promotional"` for entitlements granted without a purchase.
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub unsubscribe_detected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub billing_issues_detected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub grace_period_expires_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_sandbox: Option<bool>,
}

// ============================================================================
// Offerings
// ============================================================================

/// Response body for `GET /v1/subscribers/{app_user_id}/offerings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcOfferingsResponse {
    #[serde(default)]
    pub current_offering_id: Option<String>,
    #[serde(default)]
    pub offerings: Vec<RcOffering>,
}

/// A named group of packages configured on the RevenueCat dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcOffering {
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub packages: Vec<RcPackage>,
}

/// A package inside an offering, pointing at a store product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcPackage {
    pub identifier: String,
    pub platform_product_identifier: String,
}

// ============================================================================
// Purchases
// ============================================================================

/// Request body for a purchase call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcPurchaseRequest {
    pub product_id: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency_code: String,
}

/// A completed store transaction as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcStoreTransaction {
    pub transaction_id: String,
    #[serde(default)]
    pub original_transaction_id: Option<String>,
    pub product_id: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub expires_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Response body of a purchase call.
///
/// A missing `transaction` with `user_cancelled` unset means the backend
/// accepted the request but could not confirm the transaction; callers treat
/// that as an indeterminate outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcPurchaseResponse {
    #[serde(default)]
    pub transaction: Option<RcStoreTransaction>,
    /// Updated subscriber snapshot, when the backend includes one.
    #[serde(default)]
    pub subscriber: Option<RcSubscriber>,
    #[serde(default)]
    pub user_cancelled: bool,
}

/// Error body the RevenueCat API attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RcErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Backend error code for a rejected receipt.
pub(crate) const RC_CODE_INVALID_RECEIPT: i64 = 7103;

/// Errors surfaced by a [`crate::sdk::RevenueCatSdk`] implementation.
///
/// Purchase-flow signals (`PurchaseCancelled`, `PaymentPending`,
/// `PurchaseNotAllowed`) are errors at this layer but are translated into
/// purchase outcomes, not failures, one level up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RcError {
    /// The API key was rejected (HTTP 401/403).
    #[error("invalid API credentials: {0}")]
    InvalidCredentials(String),

    /// The user abandoned the purchase flow.
    #[error("purchase cancelled by user")]
    PurchaseCancelled,

    /// The purchase needs out-of-band approval before it settles.
    #[error("payment is pending approval")]
    PaymentPending,

    /// Purchasing is blocked on this account or device.
    #[error("purchase not allowed: {0}")]
    PurchaseNotAllowed(String),

    /// The store receipt failed verification.
    #[error("receipt verification failed: {0}")]
    InvalidReceipt(String),

    /// The underlying store could not complete the operation.
    #[error("store problem: {0}")]
    StoreProblem(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Too many requests (HTTP 429).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Could not reach the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend did not answer in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Unexpected HTTP status outside the mapped ranges.
    #[error("unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    /// The crate was built without the feature this call requires.
    #[error("operation not available: {0}")]
    Unimplemented(&'static str),

    /// Anything the backend reported that has no closer variant.
    #[error("backend error: {0}")]
    Unknown(String),
}
