//! Error types for store operations.
//!
//! Two channels exist for reporting what happened during a purchase flow:
//! expected outcomes travel as [`PurchaseOutcome`](crate::model::PurchaseOutcome)
//! variants and are never errors, while exceptional conditions surface as
//! [`StoreError`]. Every error kind carries a static retryability
//! classification and an optional recovery suggestion so a UI can react
//! without inspecting message strings.

use thiserror::Error;

/// Convenience alias used across all PurchaseKit crates.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error codes for FFI and mobile integration.
///
/// Codes are grouped by concern: 1xxx configuration, 2xxx catalog,
/// 3xxx purchase, 4xxx entitlement, 5xxx transport, 9999 unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StoreErrorCode {
    /// Store used before configuration succeeded
    NotConfigured = 1000,
    /// API key missing or rejected
    InvalidApiKey = 1001,
    /// Product identifier unknown to the backend
    ProductNotFound = 2000,
    /// Product fetch resolved nothing
    FetchProductsFailed = 2001,
    /// Purchase failed outright
    PurchaseFailed = 3000,
    /// User cancelled the flow
    UserCancelled = 3001,
    /// Payment awaiting external approval
    PaymentPending = 3002,
    /// Account or device may not purchase
    PurchaseNotAllowed = 3003,
    /// Entitlement could not be verified
    EntitlementVerificationFailed = 4000,
    /// Network layer error
    NetworkError = 5000,
    /// Operation timed out
    Timeout = 5001,
    /// Anything else
    Unknown = 9999,
}

/// Comprehensive error type for store operations.
///
/// The set of kinds is closed: adapters translate backend-specific failures
/// into one of these and the facade propagates them unchanged, without
/// adding wrapping layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An operation was invoked before `configure` succeeded.
    #[error("purchases are not configured; call configure first")]
    NotConfigured,

    /// The configured API key is blank or was rejected by the backend.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    /// The backend does not know the requested product identifier.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A product fetch resolved none of the requested identifiers.
    #[error("failed to fetch products: {0}")]
    FetchProductsFailed(String),

    /// The purchase failed before reaching a terminal store outcome.
    #[error("purchase failed: {0}")]
    PurchaseFailed(String),

    /// The user cancelled the operation.
    #[error("cancelled by the user")]
    UserCancelled,

    /// The payment needs approval outside the app before it can settle.
    #[error("payment is pending external approval")]
    PaymentPending,

    /// The account or device is not allowed to make purchases.
    #[error("this account is not allowed to make purchases")]
    PurchaseNotAllowed,

    /// The backend could not verify an entitlement it reported.
    #[error("entitlement verification failed: {0}")]
    EntitlementVerificationFailed(String),

    /// A network-layer failure talking to the backend.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend did not answer within its deadline.
    #[error("{0} timed out")]
    Timeout(String),

    /// An error the taxonomy has no better kind for.
    #[error("unknown store error: {0}")]
    Unknown(String),
}

impl StoreError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> StoreErrorCode {
        match self {
            Self::NotConfigured => StoreErrorCode::NotConfigured,
            Self::InvalidApiKey(_) => StoreErrorCode::InvalidApiKey,
            Self::ProductNotFound(_) => StoreErrorCode::ProductNotFound,
            Self::FetchProductsFailed(_) => StoreErrorCode::FetchProductsFailed,
            Self::PurchaseFailed(_) => StoreErrorCode::PurchaseFailed,
            Self::UserCancelled => StoreErrorCode::UserCancelled,
            Self::PaymentPending => StoreErrorCode::PaymentPending,
            Self::PurchaseNotAllowed => StoreErrorCode::PurchaseNotAllowed,
            Self::EntitlementVerificationFailed(_) => StoreErrorCode::EntitlementVerificationFailed,
            Self::NetworkError(_) => StoreErrorCode::NetworkError,
            Self::Timeout(_) => StoreErrorCode::Timeout,
            Self::Unknown(_) => StoreErrorCode::Unknown,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only transport-level kinds are retryable; configuration problems and
    /// user cancellation are not, and retrying them just repeats the failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout(_))
    }

    /// A short human-readable hint the UI may show next to the failure.
    ///
    /// Derived from the kind alone; `None` where no action helps.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured => Some("Initialize the store before making purchases."),
            Self::InvalidApiKey(_) => Some("Check the API key in the store configuration."),
            Self::ProductNotFound(_) => {
                Some("Verify the product identifier exists in the store dashboard.")
            }
            Self::FetchProductsFailed(_) => {
                Some("Verify the product identifiers and try again later.")
            }
            Self::PurchaseFailed(_) => Some("Try the purchase again."),
            Self::UserCancelled => None,
            Self::PaymentPending => Some("The purchase is awaiting approval; check back later."),
            Self::PurchaseNotAllowed => {
                Some("Purchases are restricted on this device or account.")
            }
            Self::EntitlementVerificationFailed(_) => {
                Some("Restore purchases or contact support.")
            }
            Self::NetworkError(_) | Self::Timeout(_) => {
                Some("Check your internet connection and try again.")
            }
            Self::Unknown(_) => None,
        }
    }

    /// Create a network error from any displayable cause.
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::NetworkError(err.to_string())
    }

    /// Create a timeout error naming the operation that stalled.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout(operation.into())
    }

    /// Create a purchase failure with a reason.
    pub fn purchase_failed(reason: impl Into<String>) -> Self {
        Self::PurchaseFailed(reason.into())
    }

    /// Create an unknown error from any displayable cause.
    pub fn unknown(err: impl std::fmt::Display) -> Self {
        Self::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::NotConfigured.code(), StoreErrorCode::NotConfigured);
        assert_eq!(
            StoreError::network("connection refused").code(),
            StoreErrorCode::NetworkError
        );
        assert_eq!(StoreErrorCode::Unknown as i32, 9999);
    }

    #[test]
    fn test_retryability_classification() {
        assert!(StoreError::network("dns failure").is_retryable());
        assert!(StoreError::timeout("fetch products").is_retryable());

        assert!(!StoreError::NotConfigured.is_retryable());
        assert!(!StoreError::UserCancelled.is_retryable());
        assert!(!StoreError::InvalidApiKey("blank".into()).is_retryable());
        assert!(!StoreError::purchase_failed("declined").is_retryable());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = StoreError::network("offline");
        assert_eq!(
            err.recovery_suggestion(),
            Some("Check your internet connection and try again.")
        );

        // Cancellation needs no recovery hint.
        assert_eq!(StoreError::UserCancelled.recovery_suggestion(), None);
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::ProductNotFound("pro_monthly".to_string());
        assert!(err.to_string().contains("product not found"));
        assert!(err.to_string().contains("pro_monthly"));

        let err = StoreError::timeout("restore");
        assert_eq!(err.to_string(), "restore timed out");
    }
}
