//! Product catalog types.

use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::handle::BackendHandle;

/// Unique product identifier as configured in the store dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of thing a product is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Can be bought repeatedly and is used up (coins, credits).
    Consumable,
    /// Bought once, owned forever (lifetime unlock).
    NonConsumable,
    /// Subscription that renews until cancelled.
    AutoRenewableSubscription,
    /// Subscription for a fixed period with no automatic renewal.
    NonRenewingSubscription,
}

impl ProductKind {
    /// Get the kind as a stable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumable => "consumable",
            Self::NonConsumable => "non_consumable",
            Self::AutoRenewableSubscription => "auto_renewable_subscription",
            Self::NonRenewingSubscription => "non_renewing_subscription",
        }
    }

    /// True for either subscription kind.
    pub fn is_subscription(&self) -> bool {
        matches!(
            self,
            Self::AutoRenewableSubscription | Self::NonRenewingSubscription
        )
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar unit of a subscription period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        };
        f.write_str(unit)
    }
}

/// Length of one subscription billing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPeriod {
    /// Number of units per cycle.
    pub value: u32,
    /// Calendar unit.
    pub unit: PeriodUnit,
}

impl SubscriptionPeriod {
    /// Create a period of `value` × `unit`.
    pub fn new(value: u32, unit: PeriodUnit) -> Self {
        Self { value, unit }
    }

    /// One week.
    pub fn weekly() -> Self {
        Self::new(1, PeriodUnit::Week)
    }

    /// One month.
    pub fn monthly() -> Self {
        Self::new(1, PeriodUnit::Month)
    }

    /// One year.
    pub fn yearly() -> Self {
        Self::new(1, PeriodUnit::Year)
    }
}

impl fmt::Display for SubscriptionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.value, self.unit)
        }
    }
}

/// How an introductory offer is paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Free for the offer period.
    FreeTrial,
    /// Discounted price charged each billing cycle of the offer.
    PayAsYouGo,
    /// Discounted price charged once up front.
    PayUpFront,
}

/// Introductory pricing attached to a subscription product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntroductoryOffer {
    /// Offer price; zero for free trials.
    pub price: Decimal,
    /// How long the offer lasts.
    pub period: SubscriptionPeriod,
    /// Payment mode for the offer.
    pub payment_mode: PaymentMode,
}

impl IntroductoryOffer {
    /// Create an introductory offer.
    pub fn new(price: Decimal, period: SubscriptionPeriod, payment_mode: PaymentMode) -> Self {
        Self {
            price,
            period,
            payment_mode,
        }
    }

    /// True when the offer is a free trial.
    pub fn is_free_trial(&self) -> bool {
        self.payment_mode == PaymentMode::FreeTrial
    }
}

/// A purchasable product as reported by the backend catalog.
///
/// Equality and hashing consider the identifier only: a product refetched
/// with updated pricing still compares equal to its cached predecessor, so
/// caches stay coherent across price changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Localized display name.
    pub display_name: String,
    /// Localized description.
    pub description: String,
    /// Decimal price in `currency_code`.
    pub price: Decimal,
    /// Localized, pre-formatted price string for display.
    pub display_price: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// What kind of product this is.
    pub kind: ProductKind,
    /// Billing cycle; present for subscription kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_period: Option<SubscriptionPeriod>,
    /// Introductory pricing, when the backend offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introductory_offer: Option<IntroductoryOffer>,
    /// Adapter-owned token for the original backend object; opaque outside
    /// the adapter that created it.
    #[serde(skip)]
    pub backend_handle: Option<BackendHandle>,
}

impl Product {
    /// Create a product with the required fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<ProductId>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        display_price: impl Into<String>,
        currency_code: impl Into<String>,
        kind: ProductKind,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            price,
            display_price: display_price.into(),
            currency_code: currency_code.into(),
            kind,
            subscription_period: None,
            introductory_offer: None,
            backend_handle: None,
        }
    }

    /// Set the billing cycle.
    pub fn with_subscription_period(mut self, period: SubscriptionPeriod) -> Self {
        self.subscription_period = Some(period);
        self
    }

    /// Set the introductory offer.
    pub fn with_introductory_offer(mut self, offer: IntroductoryOffer) -> Self {
        self.introductory_offer = Some(offer);
        self
    }

    /// Attach the adapter-owned backend token.
    pub fn with_backend_handle(mut self, handle: BackendHandle) -> Self {
        self.backend_handle = Some(handle);
        self
    }

    /// True for either subscription kind.
    pub fn is_subscription(&self) -> bool {
        self.kind.is_subscription()
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product(id: &str, price: Decimal) -> Product {
        Product::new(
            id,
            "Pro Monthly",
            "Full access, billed monthly",
            price,
            "$9.99",
            "USD",
            ProductKind::AutoRenewableSubscription,
        )
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let a = test_product("pro_monthly", dec!(9.99));
        let b = test_product("pro_monthly", dec!(14.99));
        let c = test_product("pro_yearly", dec!(9.99));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_follows_equality() {
        let mut set = std::collections::HashSet::new();
        set.insert(test_product("pro_monthly", dec!(9.99)));
        set.insert(test_product("pro_monthly", dec!(14.99)));
        set.insert(test_product("pro_yearly", dec!(89.99)));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_builder_and_kind_helpers() {
        let product = test_product("pro_monthly", dec!(9.99))
            .with_subscription_period(SubscriptionPeriod::monthly())
            .with_introductory_offer(IntroductoryOffer::new(
                dec!(0),
                SubscriptionPeriod::weekly(),
                PaymentMode::FreeTrial,
            ));

        assert!(product.is_subscription());
        assert_eq!(product.subscription_period.unwrap().to_string(), "1 month");
        assert!(product.introductory_offer.unwrap().is_free_trial());
        assert!(!ProductKind::Consumable.is_subscription());
    }

    #[test]
    fn test_backend_handle_not_serialized() {
        let product =
            test_product("pro_monthly", dec!(9.99)).with_backend_handle(BackendHandle::new(7u32));

        let json = serde_json::to_string(&product).unwrap();
        assert!(!json.contains("backend_handle"));

        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert!(parsed.backend_handle.is_none());
        assert_eq!(parsed, product);
    }

    #[test]
    fn test_period_display() {
        assert_eq!(SubscriptionPeriod::new(3, PeriodUnit::Day).to_string(), "3 days");
        assert_eq!(SubscriptionPeriod::yearly().to_string(), "1 year");
    }
}
