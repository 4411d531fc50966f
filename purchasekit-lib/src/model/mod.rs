//! Domain model: pure data types with invariants, no I/O.
//!
//! Two equality rules matter here and differ from plain derives:
//! [`Product`] and [`Entitlement`] compare and hash by identifier only, so
//! a refetch with changed pricing or flags still matches cached values.

mod entitlement;
mod handle;
mod offerings;
mod outcome;
mod product;
mod status;
mod transaction;

pub use entitlement::{Entitlement, EntitlementPeriodType};
pub use handle::BackendHandle;
pub use offerings::Offerings;
pub use outcome::PurchaseOutcome;
pub use product::{
    IntroductoryOffer, PaymentMode, PeriodUnit, Product, ProductId, ProductKind,
    SubscriptionPeriod,
};
pub use status::SubscriptionStatus;
pub use transaction::Transaction;
