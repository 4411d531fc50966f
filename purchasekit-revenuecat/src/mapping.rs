//! Translation between RevenueCat wire types and the PurchaseKit domain
//! model.
//!
//! Unknown wire values never fail the mapping: string enums degrade to the
//! closest domain case and malformed period strings drop the period. The
//! one place errors split into two channels is the purchase flow, where
//! cancellation, pending payment and not-allowed signals become
//! [`PurchaseOutcome`] variants instead of errors.

use chrono::{DateTime, Utc};
use tracing::warn;

use purchasekit_lib::{
    BackendHandle, Entitlement, EntitlementPeriodType, PaymentMode, PeriodUnit, Product,
    ProductId, ProductKind, PurchaseOutcome, StoreError, SubscriptionPeriod, SubscriptionStatus,
    Transaction,
};

use crate::api::{
    RcEntitlementInfo, RcError, RcPurchaseResponse, RcStoreProduct, RcStoreTransaction,
    RcSubscriber, RcSubscriptionInfo,
};

/// Store tag RevenueCat uses for entitlements granted without a purchase.
const PROMOTIONAL_STORE: &str = "promotional";

// ============================================================================
// Catalog mapping
// ============================================================================

/// Parse an ISO 8601 duration like `"P1M"` or `"P3D"` into a billing period.
///
/// Returns `None` for anything that is not `P<count><D|W|M|Y>` with a
/// positive count; callers treat that as "no period known".
pub(crate) fn parse_iso_period(value: &str) -> Option<SubscriptionPeriod> {
    let rest = value.strip_prefix('P')?;
    // The unit is the last char; split by its UTF-8 width so a multi-byte
    // tail cannot slice mid-character.
    let unit = rest.chars().next_back()?;
    let digits = &rest[..rest.len() - unit.len_utf8()];
    let count: u32 = digits.parse().ok()?;
    if count == 0 {
        return None;
    }
    let unit = match unit {
        'D' => PeriodUnit::Day,
        'W' => PeriodUnit::Week,
        'M' => PeriodUnit::Month,
        'Y' => PeriodUnit::Year,
        _ => return None,
    };
    Some(SubscriptionPeriod::new(count, unit))
}

fn product_kind_from_rc(product_type: &str, has_period: bool) -> ProductKind {
    match product_type {
        "subscription" | "auto_renewable_subscription" => ProductKind::AutoRenewableSubscription,
        "non_renewing_subscription" => ProductKind::NonRenewingSubscription,
        "consumable" => ProductKind::Consumable,
        "non_consumable" => ProductKind::NonConsumable,
        other => {
            // Degrade unknown types to the closest kind the period hints at.
            warn!(product_type = other, "unknown product type from backend");
            if has_period {
                ProductKind::AutoRenewableSubscription
            } else {
                ProductKind::NonConsumable
            }
        }
    }
}

fn payment_mode_from_rc(mode: &str) -> PaymentMode {
    match mode {
        "free_trial" => PaymentMode::FreeTrial,
        "pay_up_front" => PaymentMode::PayUpFront,
        "pay_as_you_go" => PaymentMode::PayAsYouGo,
        other => {
            warn!(payment_mode = other, "unknown payment mode from backend");
            PaymentMode::PayAsYouGo
        }
    }
}

/// Map a backend product to the domain model, keeping the wire object
/// attached as an opaque handle for later purchase calls.
pub(crate) fn product_from_rc(rc: &RcStoreProduct) -> Product {
    let period = rc
        .subscription_period
        .as_deref()
        .and_then(parse_iso_period);
    let kind = product_kind_from_rc(&rc.product_type, period.is_some());
    let display_price = rc
        .price_string
        .clone()
        .unwrap_or_else(|| format!("{} {}", rc.price, rc.currency_code));

    let mut product = Product::new(
        rc.identifier.as_str(),
        rc.title.clone(),
        rc.description.clone(),
        rc.price,
        display_price,
        rc.currency_code.clone(),
        kind,
    )
    .with_backend_handle(BackendHandle::new(rc.clone()));

    if let Some(period) = period {
        product = product.with_subscription_period(period);
    }
    if let Some(intro) = &rc.introductory_price {
        let mode = intro
            .payment_mode
            .as_deref()
            .map_or(PaymentMode::PayAsYouGo, payment_mode_from_rc);
        if let Some(period) = intro.period.as_deref().and_then(parse_iso_period) {
            product = product.with_introductory_offer(purchasekit_lib::IntroductoryOffer::new(
                intro.price,
                period,
                mode,
            ));
        }
    }
    product
}

// ============================================================================
// Subscriber mapping
// ============================================================================

fn entitlement_is_active(info: &RcEntitlementInfo, now: DateTime<Utc>) -> bool {
    match info.expires_date {
        None => true,
        Some(expires) if expires > now => true,
        // Lapsed, but a billing grace period can keep access alive.
        Some(_) => info
            .grace_period_expires_date
            .map_or(false, |grace| grace > now),
    }
}

fn subscription_for<'a>(
    subscriber: &'a RcSubscriber,
    info: &RcEntitlementInfo,
) -> Option<&'a RcSubscriptionInfo> {
    info.product_identifier
        .as_deref()
        .and_then(|product_id| subscriber.subscriptions.get(product_id))
}

fn will_renew(info: &RcEntitlementInfo, subscription: Option<&RcSubscriptionInfo>) -> bool {
    info.expires_date.is_some()
        && subscription.map_or(false, |sub| {
            sub.unsubscribe_detected_at.is_none()
                && sub.store.as_deref() != Some(PROMOTIONAL_STORE)
        })
}

fn period_type_from_rc(subscription: Option<&RcSubscriptionInfo>) -> EntitlementPeriodType {
    let Some(sub) = subscription else {
        return EntitlementPeriodType::Normal;
    };
    if sub.store.as_deref() == Some(PROMOTIONAL_STORE) {
        return EntitlementPeriodType::Promotional;
    }
    match sub.period_type.as_str() {
        "normal" | "" => EntitlementPeriodType::Normal,
        "trial" => EntitlementPeriodType::Trial,
        "intro" => EntitlementPeriodType::Intro,
        other => {
            warn!(period_type = other, "unknown period type from backend");
            EntitlementPeriodType::Normal
        }
    }
}

/// Map every entitlement on the subscriber, active or not, sorted by id so
/// output is stable across the backend's unordered maps.
pub(crate) fn entitlements_from_subscriber(
    subscriber: &RcSubscriber,
    now: DateTime<Utc>,
) -> Vec<Entitlement> {
    let mut entitlements: Vec<Entitlement> = subscriber
        .entitlements
        .iter()
        .map(|(id, info)| {
            let subscription = subscription_for(subscriber, info);
            let is_active = entitlement_is_active(info, now);
            let mut entitlement = Entitlement::new(id.clone(), is_active)
                .with_will_renew(is_active && will_renew(info, subscription))
                .with_period_type(period_type_from_rc(subscription));
            if let Some(product_id) = &info.product_identifier {
                entitlement = entitlement.with_product_id(product_id.as_str());
            }
            if let Some(expires) = info.expires_date {
                entitlement = entitlement.with_expiration_date(expires);
            }
            entitlement
        })
        .collect();
    entitlements.sort_by(|a, b| a.id.cmp(&b.id));
    entitlements
}

/// Derive the aggregate subscription status from a subscriber snapshot.
///
/// When `tracked` is non-empty only those entitlement ids count towards the
/// subscribed state; an empty list means every entitlement counts. Among
/// active candidates the one with the latest expiration wins, with lifetime
/// entitlements ranked above any dated one and expiration ties broken by
/// entitlement id.
pub(crate) fn status_from_subscriber(
    subscriber: &RcSubscriber,
    tracked: &[String],
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    let mut best: Option<(&String, &RcEntitlementInfo)> = None;
    for (id, info) in &subscriber.entitlements {
        if !tracked.is_empty() && !tracked.iter().any(|t| t == id) {
            continue;
        }
        if !entitlement_is_active(info, now) {
            continue;
        }
        // Ties fall back to id order so the winner never depends on map
        // iteration order.
        let outranks = match best {
            None => true,
            Some((best_id, current)) => match (info.expires_date, current.expires_date) {
                (None, Some(_)) => true,
                (Some(_), None) => false,
                (None, None) => id < best_id,
                (Some(a), Some(b)) => a > b || (a == b && id < best_id),
            },
        };
        if outranks {
            best = Some((id, info));
        }
    }

    let Some((_, info)) = best else {
        return SubscriptionStatus::not_subscribed();
    };
    let subscription = subscription_for(subscriber, info);

    SubscriptionStatus {
        is_subscribed: true,
        active_product_id: info.product_identifier.clone().map(ProductId::from),
        expiration_date: info.expires_date,
        will_renew: will_renew(info, subscription),
        is_in_billing_retry: subscription
            .map_or(false, |sub| sub.billing_issues_detected_at.is_some()),
        is_in_grace_period: subscription
            .and_then(|sub| sub.grace_period_expires_date)
            .map_or(false, |grace| grace > now),
        management_url: subscriber.management_url.clone(),
    }
}

// ============================================================================
// Purchase mapping
// ============================================================================

/// Map a backend transaction record.
pub(crate) fn transaction_from_rc(rc: &RcStoreTransaction, restored: bool) -> Transaction {
    let mut transaction = Transaction::new(
        rc.transaction_id.clone(),
        rc.product_id.as_str(),
        rc.purchase_date,
    )
    .with_restored(restored);
    if let Some(original) = &rc.original_transaction_id {
        transaction = transaction.with_original_transaction_id(original.clone());
    }
    if let Some(expires) = rc.expires_date {
        transaction = transaction.with_expiration_date(expires);
    }
    if let Some(price) = rc.price {
        transaction =
            transaction.with_price(price, rc.currency_code.clone().unwrap_or_default());
    }
    transaction
}

/// Translate a successful purchase response into an outcome.
pub(crate) fn outcome_from_purchase_response(response: &RcPurchaseResponse) -> PurchaseOutcome {
    if response.user_cancelled {
        return PurchaseOutcome::Cancelled;
    }
    match &response.transaction {
        Some(transaction) => PurchaseOutcome::Success(transaction_from_rc(transaction, false)),
        None => {
            warn!("purchase response carried no transaction and no cancellation");
            PurchaseOutcome::Unknown
        }
    }
}

/// Translate a purchase-time backend error into an outcome.
///
/// Cancellation, pending payment and not-allowed are expected ends of a
/// purchase flow and must not surface as errors. Everything else becomes the
/// indeterminate outcome; the caller still gets a log line naming the cause.
pub(crate) fn outcome_from_rc_error(error: RcError) -> PurchaseOutcome {
    match error {
        RcError::PurchaseCancelled => PurchaseOutcome::Cancelled,
        RcError::PaymentPending => PurchaseOutcome::Pending,
        RcError::PurchaseNotAllowed(reason) => PurchaseOutcome::RequiresAction(reason),
        other => {
            warn!(error = %other, "purchase failed without a terminal store outcome");
            PurchaseOutcome::Unknown
        }
    }
}

/// Translate backend errors for every operation except purchase.
pub(crate) fn store_error_from_rc(error: RcError) -> StoreError {
    match error {
        RcError::InvalidCredentials(message) => StoreError::InvalidApiKey(message),
        RcError::PurchaseCancelled => StoreError::UserCancelled,
        RcError::PaymentPending => StoreError::PaymentPending,
        RcError::PurchaseNotAllowed(_) => StoreError::PurchaseNotAllowed,
        RcError::InvalidReceipt(message) => StoreError::EntitlementVerificationFailed(message),
        RcError::Network(message) => StoreError::NetworkError(message),
        RcError::RateLimited { retry_after_ms } => {
            StoreError::NetworkError(format!("rate limited, retry after {retry_after_ms}ms"))
        }
        RcError::Timeout(_) => StoreError::timeout("RevenueCat API request"),
        other => StoreError::unknown(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use crate::api::RcIntroPrice;

    fn rc_product(identifier: &str, product_type: &str, period: Option<&str>) -> RcStoreProduct {
        RcStoreProduct {
            identifier: identifier.to_string(),
            title: "Pro Monthly".to_string(),
            description: "Full access".to_string(),
            price: dec!(9.99),
            price_string: Some("$9.99".to_string()),
            currency_code: "USD".to_string(),
            product_type: product_type.to_string(),
            subscription_period: period.map(str::to_string),
            introductory_price: None,
        }
    }

    fn subscriber_with(
        entitlement_id: &str,
        product_id: &str,
        expires: Option<DateTime<Utc>>,
        subscription: RcSubscriptionInfo,
    ) -> RcSubscriber {
        let mut subscriber = RcSubscriber::default();
        subscriber.entitlements.insert(
            entitlement_id.to_string(),
            RcEntitlementInfo {
                expires_date: expires,
                product_identifier: Some(product_id.to_string()),
                ..Default::default()
            },
        );
        subscriber
            .subscriptions
            .insert(product_id.to_string(), subscription);
        subscriber
    }

    #[test]
    fn test_iso_period_parsing() {
        assert_eq!(parse_iso_period("P1M"), Some(SubscriptionPeriod::monthly()));
        assert_eq!(parse_iso_period("P1Y"), Some(SubscriptionPeriod::yearly()));
        assert_eq!(
            parse_iso_period("P14D"),
            Some(SubscriptionPeriod::new(14, PeriodUnit::Day))
        );
        assert_eq!(
            parse_iso_period("P2W"),
            Some(SubscriptionPeriod::new(2, PeriodUnit::Week))
        );

        assert_eq!(parse_iso_period(""), None);
        assert_eq!(parse_iso_period("P"), None);
        assert_eq!(parse_iso_period("P0M"), None);
        assert_eq!(parse_iso_period("1M"), None);
        assert_eq!(parse_iso_period("P1X"), None);
        assert_eq!(parse_iso_period("PT1H"), None);
        // Multi-byte units must be rejected, not sliced mid-character.
        assert_eq!(parse_iso_period("P1µ"), None);
        assert_eq!(parse_iso_period("P3年"), None);
    }

    #[test]
    fn test_multibyte_period_unit_drops_the_period() {
        let product = product_from_rc(&rc_product("pro_monthly", "subscription", Some("P1µ")));
        assert!(product.subscription_period.is_none());

        let mut rc = rc_product("pro_monthly", "subscription", Some("P1M"));
        rc.introductory_price = Some(RcIntroPrice {
            price: dec!(0),
            period: Some("P1µ".to_string()),
            payment_mode: Some("free_trial".to_string()),
        });
        assert!(product_from_rc(&rc).introductory_offer.is_none());
    }

    #[test]
    fn test_product_mapping_attaches_handle() {
        let rc = rc_product("pro_monthly", "subscription", Some("P1M"));
        let product = product_from_rc(&rc);

        assert_eq!(product.id.as_str(), "pro_monthly");
        assert_eq!(product.kind, ProductKind::AutoRenewableSubscription);
        assert_eq!(product.display_price, "$9.99");
        assert_eq!(product.subscription_period, Some(SubscriptionPeriod::monthly()));

        let handle = product.backend_handle.as_ref().unwrap();
        assert_eq!(handle.downcast_ref::<RcStoreProduct>(), Some(&rc));
    }

    #[test]
    fn test_unknown_product_type_degrades_by_period() {
        let with_period = product_from_rc(&rc_product("a", "prepaid", Some("P1M")));
        assert_eq!(with_period.kind, ProductKind::AutoRenewableSubscription);

        let without_period = product_from_rc(&rc_product("b", "prepaid", None));
        assert_eq!(without_period.kind, ProductKind::NonConsumable);
    }

    #[test]
    fn test_intro_offer_mapping() {
        let mut rc = rc_product("pro_monthly", "subscription", Some("P1M"));
        rc.introductory_price = Some(RcIntroPrice {
            price: dec!(0),
            period: Some("P1W".to_string()),
            payment_mode: Some("free_trial".to_string()),
        });
        let product = product_from_rc(&rc);
        let offer = product.introductory_offer.unwrap();
        assert!(offer.is_free_trial());
        assert_eq!(offer.period, SubscriptionPeriod::weekly());

        // A garbled offer period drops the offer rather than failing.
        let mut rc = rc_product("pro_monthly", "subscription", Some("P1M"));
        rc.introductory_price = Some(RcIntroPrice {
            price: dec!(0),
            period: Some("forever".to_string()),
            payment_mode: Some("free_trial".to_string()),
        });
        assert!(product_from_rc(&rc).introductory_offer.is_none());
    }

    #[test]
    fn test_unknown_payment_mode_degrades() {
        assert_eq!(payment_mode_from_rc("installments"), PaymentMode::PayAsYouGo);
        assert_eq!(payment_mode_from_rc("pay_up_front"), PaymentMode::PayUpFront);
    }

    #[test]
    fn test_entitlement_mapping() {
        let now = Utc::now();
        let expires = now + Duration::days(30);
        let subscriber = subscriber_with(
            "premium",
            "pro_monthly",
            Some(expires),
            RcSubscriptionInfo {
                expires_date: Some(expires),
                period_type: "trial".to_string(),
                ..Default::default()
            },
        );

        let entitlements = entitlements_from_subscriber(&subscriber, now);
        assert_eq!(entitlements.len(), 1);
        let premium = &entitlements[0];
        assert_eq!(premium.id, "premium");
        assert!(premium.is_active);
        assert!(premium.will_renew);
        assert_eq!(premium.period_type, EntitlementPeriodType::Trial);
        assert_eq!(premium.expiration_date, Some(expires));
        assert_eq!(premium.product_id.as_ref().map(ProductId::as_str), Some("pro_monthly"));
    }

    #[test]
    fn test_expired_entitlement_is_inactive_but_listed() {
        let now = Utc::now();
        let subscriber = subscriber_with(
            "premium",
            "pro_monthly",
            Some(now - Duration::days(1)),
            RcSubscriptionInfo::default(),
        );

        let entitlements = entitlements_from_subscriber(&subscriber, now);
        assert_eq!(entitlements.len(), 1);
        assert!(!entitlements[0].is_active);
        assert!(!entitlements[0].will_renew);
    }

    #[test]
    fn test_grace_period_keeps_entitlement_active() {
        let now = Utc::now();
        let mut subscriber = subscriber_with(
            "premium",
            "pro_monthly",
            Some(now - Duration::hours(2)),
            RcSubscriptionInfo {
                billing_issues_detected_at: Some(now - Duration::hours(2)),
                grace_period_expires_date: Some(now + Duration::days(14)),
                ..Default::default()
            },
        );
        if let Some(info) = subscriber.entitlements.get_mut("premium") {
            info.grace_period_expires_date = Some(now + Duration::days(14));
        }

        let entitlements = entitlements_from_subscriber(&subscriber, now);
        assert!(entitlements[0].is_active);

        let status = status_from_subscriber(&subscriber, &[], now);
        assert!(status.is_subscribed);
        assert!(status.is_in_billing_retry);
        assert!(status.is_in_grace_period);
        assert!(status.needs_billing_attention());
    }

    #[test]
    fn test_promotional_store_overrides_period_type() {
        let now = Utc::now();
        let subscriber = subscriber_with(
            "premium",
            "rc_promo_premium",
            Some(now + Duration::days(7)),
            RcSubscriptionInfo {
                store: Some("promotional".to_string()),
                period_type: "normal".to_string(),
                ..Default::default()
            },
        );

        let entitlements = entitlements_from_subscriber(&subscriber, now);
        assert_eq!(entitlements[0].period_type, EntitlementPeriodType::Promotional);
        // Promotional grants never renew on their own.
        assert!(!entitlements[0].will_renew);
    }

    #[test]
    fn test_status_prefers_latest_expiration() {
        let now = Utc::now();
        let near = now + Duration::days(3);
        let far = now + Duration::days(300);

        let mut subscriber = RcSubscriber::default();
        for (entitlement, product, expires) in
            [("plus", "plus_monthly", near), ("premium", "pro_yearly", far)]
        {
            subscriber.entitlements.insert(
                entitlement.to_string(),
                RcEntitlementInfo {
                    expires_date: Some(expires),
                    product_identifier: Some(product.to_string()),
                    ..Default::default()
                },
            );
            subscriber.subscriptions.insert(
                product.to_string(),
                RcSubscriptionInfo {
                    expires_date: Some(expires),
                    ..Default::default()
                },
            );
        }

        let status = status_from_subscriber(&subscriber, &[], now);
        assert!(status.is_subscribed);
        assert_eq!(
            status.active_product_id.as_ref().map(ProductId::as_str),
            Some("pro_yearly")
        );
        assert_eq!(status.expiration_date, Some(far));
        assert!(status.will_renew);

        // Restricting the tracked set flips the winner.
        let tracked = vec!["plus".to_string()];
        let status = status_from_subscriber(&subscriber, &tracked, now);
        assert_eq!(
            status.active_product_id.as_ref().map(ProductId::as_str),
            Some("plus_monthly")
        );

        // Tracking an id the user lacks means not subscribed.
        let tracked = vec!["enterprise".to_string()];
        let status = status_from_subscriber(&subscriber, &tracked, now);
        assert!(!status.is_subscribed);
    }

    #[test]
    fn test_status_breaks_expiration_ties_by_entitlement_id() {
        let now = Utc::now();
        let expires = now + Duration::days(30);

        let mut subscriber = RcSubscriber::default();
        for (entitlement, product) in [("premium", "pro_yearly"), ("plus", "plus_monthly")] {
            subscriber.entitlements.insert(
                entitlement.to_string(),
                RcEntitlementInfo {
                    expires_date: Some(expires),
                    product_identifier: Some(product.to_string()),
                    ..Default::default()
                },
            );
        }

        // Identical expirations resolve by id order, whatever order the
        // map happens to iterate in.
        let status = status_from_subscriber(&subscriber, &[], now);
        assert_eq!(
            status.active_product_id.as_ref().map(ProductId::as_str),
            Some("plus_monthly")
        );
        assert_eq!(status.expiration_date, Some(expires));
    }

    #[test]
    fn test_lifetime_outranks_dated_expiration() {
        let now = Utc::now();
        let mut subscriber = subscriber_with(
            "premium",
            "pro_yearly",
            Some(now + Duration::days(300)),
            RcSubscriptionInfo::default(),
        );
        subscriber.entitlements.insert(
            "lifetime".to_string(),
            RcEntitlementInfo {
                expires_date: None,
                product_identifier: Some("lifetime_unlock".to_string()),
                ..Default::default()
            },
        );

        let status = status_from_subscriber(&subscriber, &[], now);
        assert_eq!(
            status.active_product_id.as_ref().map(ProductId::as_str),
            Some("lifetime_unlock")
        );
        assert!(status.expiration_date.is_none());
        assert!(!status.will_renew);
    }

    #[test]
    fn test_cancelled_subscription_keeps_access_without_renewal() {
        let now = Utc::now();
        let expires = now + Duration::days(12);
        let subscriber = subscriber_with(
            "premium",
            "pro_monthly",
            Some(expires),
            RcSubscriptionInfo {
                expires_date: Some(expires),
                unsubscribe_detected_at: Some(now - Duration::days(1)),
                ..Default::default()
            },
        );

        let status = status_from_subscriber(&subscriber, &[], now);
        assert!(status.is_subscribed);
        assert!(!status.will_renew);
    }

    #[test]
    fn test_transaction_mapping() {
        let purchase_date = Utc::now();
        let rc = RcStoreTransaction {
            transaction_id: "txn-9".to_string(),
            original_transaction_id: Some("txn-1".to_string()),
            product_id: "pro_monthly".to_string(),
            purchase_date,
            expires_date: Some(purchase_date + Duration::days(30)),
            price: Some(dec!(9.99)),
            currency_code: Some("USD".to_string()),
        };

        let transaction = transaction_from_rc(&rc, true);
        assert_eq!(transaction.id, "txn-9");
        assert!(transaction.is_restored);
        assert!(transaction.is_renewal());
        assert_eq!(transaction.price, Some(dec!(9.99)));
    }

    #[test]
    fn test_purchase_response_outcomes() {
        let cancelled = RcPurchaseResponse {
            user_cancelled: true,
            ..Default::default()
        };
        assert_eq!(outcome_from_purchase_response(&cancelled), PurchaseOutcome::Cancelled);

        let empty = RcPurchaseResponse::default();
        assert_eq!(outcome_from_purchase_response(&empty), PurchaseOutcome::Unknown);

        let settled = RcPurchaseResponse {
            transaction: Some(RcStoreTransaction {
                transaction_id: "txn-1".to_string(),
                original_transaction_id: None,
                product_id: "pro_monthly".to_string(),
                purchase_date: Utc::now(),
                expires_date: None,
                price: None,
                currency_code: None,
            }),
            ..Default::default()
        };
        let outcome = outcome_from_purchase_response(&settled);
        assert!(outcome.is_success());
        assert!(!outcome.transaction().unwrap().is_restored);
    }

    #[test]
    fn test_purchase_errors_become_outcomes() {
        assert_eq!(
            outcome_from_rc_error(RcError::PurchaseCancelled),
            PurchaseOutcome::Cancelled
        );
        assert_eq!(
            outcome_from_rc_error(RcError::PaymentPending),
            PurchaseOutcome::Pending
        );
        assert_eq!(
            outcome_from_rc_error(RcError::PurchaseNotAllowed("ask a guardian".into())),
            PurchaseOutcome::RequiresAction("ask a guardian".into())
        );
        assert_eq!(
            outcome_from_rc_error(RcError::StoreProblem("store down".into())),
            PurchaseOutcome::Unknown
        );
        assert_eq!(
            outcome_from_rc_error(RcError::Network("offline".into())),
            PurchaseOutcome::Unknown
        );
    }

    #[test]
    fn test_store_error_translation() {
        assert_eq!(
            store_error_from_rc(RcError::InvalidCredentials("bad key".into())),
            StoreError::InvalidApiKey("bad key".into())
        );
        assert_eq!(
            store_error_from_rc(RcError::Network("offline".into())),
            StoreError::NetworkError("offline".into())
        );
        assert_eq!(store_error_from_rc(RcError::PurchaseCancelled), StoreError::UserCancelled);
        assert_eq!(
            store_error_from_rc(RcError::InvalidReceipt("tampered".into())),
            StoreError::EntitlementVerificationFailed("tampered".into())
        );

        let rate_limited = store_error_from_rc(RcError::RateLimited { retry_after_ms: 5_000 });
        assert!(rate_limited.is_retryable());

        let timeout = store_error_from_rc(RcError::Timeout("deadline elapsed".into()));
        assert!(timeout.is_retryable());

        let opaque = store_error_from_rc(RcError::StoreProblem("maintenance".into()));
        assert!(matches!(opaque, StoreError::Unknown(_)));
        assert!(!opaque.is_retryable());
    }
}
