//! Shared scaffolding for the engine integration tests.
#![allow(dead_code)]
use kasuwa_engine::{
    db_types::{NewOrder, NewOrderItem, NewPayment, Product, ShippingMethod, User, Vendor},
    events::EventProducers,
    helpers,
    test_utils::{prepare_test_env, random_db_path, seed_approved_product, seed_customer, seed_vendor},
    traits::{PaymentConfirmation, PaymentConfirmationResult, PaymentGatewayDatabase, SettledOrder},
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn setup() -> OrderFlowApi<SqliteDatabase> {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    OrderFlowApi::new(db, EventProducers::default())
}

pub async fn tear_down(mut api: OrderFlowApi<SqliteDatabase>) {
    let url = api.db().url().to_string();
    if let Err(e) = api.db_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.unwrap();
}

/// One approved vendor with two purchasable products at ₦10.00 and ₦20.00.
pub struct Storefront {
    pub customer: User,
    pub vendor_user: User,
    pub vendor: Vendor,
    pub products: Vec<Product>,
}

pub async fn seed_storefront(db: &SqliteDatabase) -> Storefront {
    let customer = seed_customer(db, "alice@example.com").await;
    let (vendor_user, vendor) = seed_vendor(db, "bayo@example.com", "Bayo Digital Goods").await;
    let ebook = seed_approved_product(db, vendor.id, "Ebook", 1000).await;
    let course = seed_approved_product(db, vendor.id, "Video course", 2000).await;
    Storefront { customer, vendor_user, vendor, products: vec![ebook, course] }
}

pub fn one_of_each(shop: &Storefront) -> NewOrder {
    let items = shop.products.iter().map(|p| NewOrderItem { product_id: p.id, quantity: 1 }).collect();
    NewOrder::new(shop.customer.id, items, ShippingMethod::Standard)
}

pub fn new_payment_for(order_id: i64, amount: ksw_common::Kobo) -> NewPayment {
    NewPayment {
        order_id,
        reference: helpers::new_payment_reference(),
        idempotency_key: format!("idem-{}", rand::random::<u64>()),
        amount,
        authorization_url: Some("https://checkout.paystack.com/abc123".to_string()),
    }
}

/// Runs the whole happy path and returns the settled order.
pub async fn place_and_pay(api: &OrderFlowApi<SqliteDatabase>, shop: &Storefront) -> SettledOrder {
    let (order, _items) = api.create_order(one_of_each(shop)).await.expect("Error creating order");
    let payment = api.initialize_payment(new_payment_for(order.id, order.total)).await.expect("Error initializing payment");
    match api.confirm_payment(&payment.reference, PaymentConfirmation::default()).await.expect("Error confirming") {
        PaymentConfirmationResult::Confirmed(settled) => *settled,
        PaymentConfirmationResult::AlreadyFinal(p) => panic!("Payment {} was unexpectedly final", p.reference),
    }
}
