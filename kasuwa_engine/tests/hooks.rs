//! End-to-end checks of the event fan-out: hooks fire after commits and see the settled data.
use std::sync::{
    atomic::{AtomicI32, AtomicI64, Ordering},
    Arc,
};

use kasuwa_engine::{
    events::{EventHandlers, EventHooks},
    test_utils::{prepare_test_env, random_db_path},
    traits::{PaymentConfirmation, PaymentGatewayDatabase},
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::runtime::Runtime;

mod support;
use support::{new_payment_for, one_of_each, seed_storefront};

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> i32 {
        self.called.load(Ordering::Relaxed)
    }
}

#[test]
fn order_created_hook_fires_per_order() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let rt = Runtime::new().unwrap();
    let event = HookCalled::default();
    let event_copy = event.clone();
    rt.block_on(async move {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let mut hooks = EventHooks::default();
        hooks.on_order_created(move |ev| {
            info!("🪝️ {}", ev.order.order_number);
            let event = event_copy.clone();
            Box::pin(async move {
                event.called();
            })
        });
        let handlers = EventHandlers::new(10, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;
        let mut api = OrderFlowApi::new(db, producers);
        let shop = seed_storefront(api.db()).await;
        let _ = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let _ = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let _ = api.db_mut().close().await;
        Sqlite::drop_database(&url).await.unwrap();
        // Give the handler a beat to drain
        tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
    });
    assert_eq!(event.count(), 2);
    info!("🪝️ test complete");
}

#[test]
fn order_paid_hook_sees_the_vendor_credits() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let rt = Runtime::new().unwrap();
    let event = HookCalled::default();
    let event_copy = event.clone();
    let credited = Arc::new(AtomicI64::new(0));
    let credited_copy = credited.clone();
    rt.block_on(async move {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let mut hooks = EventHooks::default();
        hooks.on_order_paid(move |ev| {
            info!("🪝️ order {} paid", ev.order.order_number);
            let event = event_copy.clone();
            let credited = credited_copy.clone();
            let total: i64 = ev.credits.iter().map(|c| c.amount.value()).sum();
            Box::pin(async move {
                credited.fetch_add(total, Ordering::SeqCst);
                event.called();
            })
        });
        let handlers = EventHandlers::new(10, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;
        let mut api = OrderFlowApi::new(db, producers);
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let payment = api.initialize_payment(new_payment_for(order.id, order.total)).await.unwrap();
        let _ = api.confirm_payment(&payment.reference, PaymentConfirmation::default()).await.unwrap();
        // A replayed confirmation must not fire the hook again
        let _ = api.confirm_payment(&payment.reference, PaymentConfirmation::default()).await.unwrap();
        let _ = api.db_mut().close().await;
        Sqlite::drop_database(&url).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
    });
    assert_eq!(event.count(), 1);
    assert_eq!(credited.load(Ordering::SeqCst), 3000);
    info!("🪝️ test complete");
}
