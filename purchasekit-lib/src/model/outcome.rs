//! Purchase attempt outcomes.

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Terminal outcome of one purchase attempt.
///
/// These are expected results, not errors: a cancellation or a pending
/// approval is a normal way for a purchase to end, and providers must
/// return the matching variant rather than an `Err`. Exactly one variant
/// holds per attempt and only [`Success`](Self::Success) carries a
/// transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    /// The purchase settled; the transaction records what was bought.
    Success(Transaction),
    /// The user backed out of the payment flow.
    Cancelled,
    /// The payment needs approval outside the app (for example a guardian
    /// confirming the purchase); it may settle later.
    Pending,
    /// The user must act before the store will take payment; the message
    /// says what the store asked for.
    RequiresAction(String),
    /// The backend finished without reporting a usable outcome.
    Unknown,
}

impl PurchaseOutcome {
    /// True for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// True for the cancelled variant.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The settled transaction, when the attempt succeeded.
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Success(transaction) => Some(transaction),
            _ => None,
        }
    }

    /// Consume the outcome and keep the transaction, when present.
    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            Self::Success(transaction) => Some(transaction),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_only_success_carries_a_transaction() {
        let txn = Transaction::new("txn-1", "pro_monthly", Utc::now());
        let success = PurchaseOutcome::Success(txn.clone());

        assert!(success.is_success());
        assert_eq!(success.transaction(), Some(&txn));
        assert_eq!(success.into_transaction(), Some(txn));

        for outcome in [
            PurchaseOutcome::Cancelled,
            PurchaseOutcome::Pending,
            PurchaseOutcome::RequiresAction("verify payment method".into()),
            PurchaseOutcome::Unknown,
        ] {
            assert!(!outcome.is_success());
            assert!(outcome.transaction().is_none());
        }
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&PurchaseOutcome::Cancelled).unwrap();
        assert_eq!(json, r#"{"status":"cancelled"}"#);

        let parsed: PurchaseOutcome =
            serde_json::from_str(r#"{"status":"requires_action","data":"confirm in store"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            PurchaseOutcome::RequiresAction("confirm in store".into())
        );
    }
}
