//! Entitlement types.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// Which pricing phase an entitlement is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPeriodType {
    /// Regular paid period.
    Normal,
    /// Free trial period.
    Trial,
    /// Introductory pricing period.
    Intro,
    /// Granted through a promotional offer.
    Promotional,
}

impl fmt::Display for EntitlementPeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::Trial => "trial",
            Self::Intro => "intro",
            Self::Promotional => "promotional",
        };
        f.write_str(label)
    }
}

/// An access right the user holds, decoupled from the product that granted
/// it; several products can grant the same entitlement id.
///
/// Equality and hashing consider the identifier only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entitlement {
    /// Entitlement key as configured in the store dashboard.
    pub id: String,
    /// Whether the entitlement currently grants access.
    pub is_active: bool,
    /// Product whose purchase granted this entitlement, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// When access lapses; absent for lifetime entitlements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Whether the granting subscription will auto-renew.
    #[serde(default)]
    pub will_renew: bool,
    /// Current pricing phase.
    pub period_type: EntitlementPeriodType,
}

impl Entitlement {
    /// Create an entitlement in the normal period.
    pub fn new(id: impl Into<String>, is_active: bool) -> Self {
        Self {
            id: id.into(),
            is_active,
            product_id: None,
            expiration_date: None,
            will_renew: false,
            period_type: EntitlementPeriodType::Normal,
        }
    }

    /// Set the granting product.
    pub fn with_product_id(mut self, product_id: impl Into<ProductId>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Set the expiration date.
    pub fn with_expiration_date(mut self, expires: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expires);
        self
    }

    /// Set the auto-renew flag.
    pub fn with_will_renew(mut self, will_renew: bool) -> Self {
        self.will_renew = will_renew;
        self
    }

    /// Set the pricing phase.
    pub fn with_period_type(mut self, period_type: EntitlementPeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    /// True while the entitlement is in a trial or introductory phase.
    pub fn is_in_offer_period(&self) -> bool {
        matches!(
            self.period_type,
            EntitlementPeriodType::Trial | EntitlementPeriodType::Intro
        )
    }
}

impl PartialEq for Entitlement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entitlement {}

impl Hash for Entitlement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
