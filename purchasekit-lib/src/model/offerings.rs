//! Offering groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Backend-organized named groups of products, e.g. the product set behind
/// one paywall.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offerings {
    /// Products per offering key.
    pub entries: HashMap<String, Vec<Product>>,
    /// Key of the offering the backend currently features, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_offering: Option<String>,
}

impl Offerings {
    /// Create an empty offering set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an offering.
    pub fn with_offering(mut self, key: impl Into<String>, products: Vec<Product>) -> Self {
        self.entries.insert(key.into(), products);
        self
    }

    /// Mark the currently featured offering.
    pub fn with_current_offering(mut self, key: impl Into<String>) -> Self {
        self.current_offering = Some(key.into());
        self
    }

    /// Products of a named offering.
    pub fn get(&self, key: &str) -> Option<&[Product]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Products of the currently featured offering.
    pub fn current(&self) -> Option<&[Product]> {
        self.current_offering
            .as_deref()
            .and_then(|key| self.get(key))
    }

    /// True when no offerings are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of offerings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductKind;
    use rust_decimal_macros::dec;

    fn product(id: &str) -> Product {
        Product::new(
            id,
            id,
            "",
            dec!(9.99),
            "$9.99",
            "USD",
            ProductKind::AutoRenewableSubscription,
        )
    }

    #[test]
    fn test_current_offering_lookup() {
        let offerings = Offerings::new()
            .with_offering("default", vec![product("pro_monthly"), product("pro_yearly")])
            .with_offering("sale", vec![product("pro_yearly_discounted")])
            .with_current_offering("sale");

        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings.current().map(<[Product]>::len), Some(1));
        assert_eq!(offerings.get("default").map(<[Product]>::len), Some(2));
        assert!(offerings.get("missing").is_none());
    }

    #[test]
    fn test_dangling_current_offering() {
        let offerings = Offerings::new()
            .with_offering("default", vec![product("pro_monthly")])
            .with_current_offering("removed");

        assert!(offerings.current().is_none());
        assert!(!offerings.is_empty());
    }
}
