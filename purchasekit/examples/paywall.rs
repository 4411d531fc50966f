//! Paywall Walkthrough Example
//!
//! Drives a full paywall session against an in-memory RevenueCat backend:
//! configure the manager, show an offering, run a purchase and gate a
//! feature on the resulting entitlement.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;

use purchasekit::revenuecat::api::{
    RcEntitlementInfo, RcOffering, RcOfferingsResponse, RcPackage, RcStoreProduct, RcSubscriber,
    RcSubscriptionInfo,
};
use purchasekit::revenuecat::{MockRevenueCatSdk, RevenueCatProvider};
use purchasekit::{PurchaseManager, StoreConfig};

fn store_product(
    identifier: &str,
    title: &str,
    price: rust_decimal::Decimal,
    price_string: &str,
    period: &str,
) -> RcStoreProduct {
    RcStoreProduct {
        identifier: identifier.to_string(),
        title: title.to_string(),
        description: format!("{title} plan"),
        price,
        price_string: Some(price_string.to_string()),
        currency_code: "USD".to_string(),
        product_type: "subscription".to_string(),
        subscription_period: Some(period.to_string()),
        introductory_price: None,
    }
}

/// Subscriber snapshot the backend hands back once the purchase settles.
fn subscriber_with_premium(product_id: &str) -> RcSubscriber {
    let expires = Some(Utc::now() + chrono::Duration::days(30));
    let mut subscriber = RcSubscriber::default();
    subscriber.entitlements.insert(
        "premium".to_string(),
        RcEntitlementInfo {
            expires_date: expires,
            purchase_date: Some(Utc::now()),
            product_identifier: Some(product_id.to_string()),
            grace_period_expires_date: None,
        },
    );
    subscriber.subscriptions.insert(
        product_id.to_string(),
        RcSubscriptionInfo {
            expires_date: expires,
            purchase_date: Some(Utc::now()),
            period_type: "normal".to_string(),
            ..Default::default()
        },
    );
    subscriber
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== PurchaseKit Paywall Example ===\n");

    // Step 1: Stand up the backend with a catalog and an offering.
    println!("Step 1: Seeding the in-memory store backend...");
    let monthly = store_product("pro_monthly", "Pro Monthly", dec!(9.99), "$9.99", "P1M");
    let yearly = store_product("pro_yearly", "Pro Yearly", dec!(79.99), "$79.99", "P1Y");
    let sdk = Arc::new(MockRevenueCatSdk::new().with_products(vec![monthly.clone(), yearly]));
    sdk.set_offerings(RcOfferingsResponse {
        current_offering_id: Some("default".to_string()),
        offerings: vec![RcOffering {
            identifier: "default".to_string(),
            description: Some("Standard paywall".to_string()),
            packages: vec![
                RcPackage {
                    identifier: "$rc_monthly".to_string(),
                    platform_product_identifier: "pro_monthly".to_string(),
                },
                RcPackage {
                    identifier: "$rc_annual".to_string(),
                    platform_product_identifier: "pro_yearly".to_string(),
                },
            ],
        }],
    });
    let mut settled = MockRevenueCatSdk::success_response(&monthly);
    settled.subscriber = Some(subscriber_with_premium("pro_monthly"));
    sdk.script_purchase(Ok(settled));
    println!("  ✓ Two products, one offering\n");

    // Step 2: Configure the manager.
    println!("Step 2: Configuring the purchase manager...");
    let provider = Arc::new(RevenueCatProvider::with_sdk(sdk));
    let manager = PurchaseManager::new();
    let config = StoreConfig::new("appl_demo_key")
        .with_app_user_id("demo-user")
        .with_entitlement_ids(["premium"]);
    manager.configure(provider, &config).await?;
    println!("  ✓ Configured, provider: {}\n", manager.provider_name().await.unwrap());

    // Step 3: Show the paywall.
    println!("Step 3: Showing the paywall...");
    manager.track_paywall_viewed().await;
    let offerings = manager.fetch_offerings().await?;
    let products = offerings.current().unwrap_or_default();
    for product in products {
        println!("  {} at {}", product.display_name, product.display_price);
    }
    println!();

    // Step 4: Purchase the monthly plan.
    println!("Step 4: Purchasing Pro Monthly...");
    let chosen = products
        .iter()
        .find(|product| product.id.as_str() == "pro_monthly")
        .expect("monthly plan is in the offering");
    manager.track_product_viewed(chosen).await;
    let outcome = manager.purchase(chosen).await?;
    match outcome.transaction() {
        Some(transaction) => println!("  ✓ Settled as transaction {}\n", transaction.id),
        None => println!("  Purchase ended without settling: {outcome:?}\n"),
    }

    // Step 5: Gate a feature on the entitlement.
    println!("Step 5: Checking access...");
    if manager.has_entitlement("premium").await {
        println!("  ✓ Premium is unlocked");
    } else {
        println!("  ✗ Premium is still locked");
    }
    if let Some(status) = manager.subscription_status().await {
        println!(
            "  Subscribed: {}, renews: {}, expires: {:?}",
            status.is_subscribed, status.will_renew, status.expiration_date
        );
    }

    Ok(())
}
