//! Purchase transaction record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// Record of one settled store transaction.
///
/// Created only as the by-product of a successful purchase or restore and
/// immutable from then on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Backend transaction identifier.
    pub id: String,
    /// Product this transaction bought.
    pub product_id: ProductId,
    /// Identifier of the first transaction in a renewal chain, when this
    /// one is a renewal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    /// When the purchase settled.
    pub purchase_date: DateTime<Utc>,
    /// When the purchased access lapses; absent for non-expiring products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// True when this record came back through a restore rather than a
    /// fresh payment.
    #[serde(default)]
    pub is_restored: bool,
    /// Price captured at purchase time, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Currency of `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

impl Transaction {
    /// Create a transaction record.
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<ProductId>,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            original_transaction_id: None,
            purchase_date,
            expiration_date: None,
            is_restored: false,
            price: None,
            currency_code: None,
        }
    }

    /// Link this transaction to the first one of its renewal chain.
    pub fn with_original_transaction_id(mut self, original: impl Into<String>) -> Self {
        self.original_transaction_id = Some(original.into());
        self
    }

    /// Set the expiration date.
    pub fn with_expiration_date(mut self, expires: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expires);
        self
    }

    /// Mark whether this record came back through a restore.
    pub fn with_restored(mut self, restored: bool) -> Self {
        self.is_restored = restored;
        self
    }

    /// Record the price paid.
    pub fn with_price(mut self, price: Decimal, currency_code: impl Into<String>) -> Self {
        self.price = Some(price);
        self.currency_code = Some(currency_code.into());
        self
    }

    /// True when the purchased access has already lapsed.
    pub fn is_expired(&self) -> bool {
        self.expiration_date
            .map_or(false, |expires| expires <= Utc::now())
    }

    /// True when this transaction renews an earlier one.
    pub fn is_renewal(&self) -> bool {
        self.original_transaction_id
            .as_deref()
            .map_or(false, |original| original != self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_renewal_linking() {
        let first = Transaction::new("txn-1", "pro_monthly", Utc::now());
        assert!(!first.is_renewal());

        let renewal = Transaction::new("txn-2", "pro_monthly", Utc::now())
            .with_original_transaction_id("txn-1");
        assert!(renewal.is_renewal());

        // Some backends echo the transaction's own id as the original.
        let echoed = Transaction::new("txn-1", "pro_monthly", Utc::now())
            .with_original_transaction_id("txn-1");
        assert!(!echoed.is_renewal());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();

        let live = Transaction::new("txn-1", "pro_monthly", now)
            .with_expiration_date(now + Duration::days(30));
        assert!(!live.is_expired());

        let lapsed = Transaction::new("txn-2", "pro_monthly", now - Duration::days(60))
            .with_expiration_date(now - Duration::days(30));
        assert!(lapsed.is_expired());

        let lifetime = Transaction::new("txn-3", "lifetime", now);
        assert!(!lifetime.is_expired());
    }

    #[test]
    fn test_captured_price_round_trips() {
        let txn = Transaction::new("txn-1", "pro_monthly", Utc::now())
            .with_price(dec!(9.99), "USD")
            .with_restored(true);

        let json = serde_json::to_string(&txn).unwrap();
        let parsed: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, txn);
        assert!(parsed.is_restored);
        assert_eq!(parsed.price, Some(dec!(9.99)));
        assert_eq!(parsed.currency_code.as_deref(), Some("USD"));
    }
}
