use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use kasuwa_engine::{
    db_types::{NewNotification, NotificationCategory},
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    AuthApi,
    CatalogApi,
    NotificationApi,
    OrderFlowApi,
    SqliteDatabase,
    WalletApi,
};
use log::*;
use paystack_tools::PaystackApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    middleware::HmacMiddlewareFactory,
    paystack_routes::PaystackWebhookRoute,
    routes::{
        health,
        AddToCartRoute,
        ApproveProductRoute,
        AuditWalletRoute,
        CancelOrderRoute,
        CheckTokenRoute,
        CheckoutRoute,
        CreateProductRoute,
        CreateReviewRoute,
        InitiatePaymentRoute,
        LoginRoute,
        MarkNotificationReadRoute,
        MyCartRoute,
        MyNotificationsRoute,
        MyOrdersRoute,
        MyProductsRoute,
        MyVendorProfileRoute,
        MyWalletRoute,
        MyWithdrawalsRoute,
        OrderByNumberRoute,
        ProductReviewsRoute,
        ProductRoute,
        ProductsRoute,
        RefundOrderRoute,
        RegisterRoute,
        RegisterVendorRoute,
        RequestWithdrawalRoute,
        SetProductStatusRoute,
        SetVendorStatusRoute,
        SettleWithdrawalRoute,
        UpdateRolesRoute,
        VerifyPaymentRoute,
        WalletHistoryRoute,
    },
};

/// How many events each hook channel buffers before publishers start waiting.
const EVENT_BUFFER_SIZE: usize = 50;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(
        EVENT_BUFFER_SIZE,
        notification_hooks(NotificationApi::new(db.clone()), AccountApi::new(db.clone())),
    );
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("📬️ Notification hooks started");
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let paystack_api =
        PaystackApi::new(config.paystack.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let accounts_api = AccountApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let wallet_api = WalletApi::new(db.clone(), producers.clone());
        let notification_api = NotificationApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ksw::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(wallet_api))
            .app_data(web::Data::new(notification_api))
            .app_data(web::Data::new(paystack_api.clone()))
            .app_data(web::Data::new(jwt_signer));
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .service(CheckTokenRoute::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByNumberRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(InitiatePaymentRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
            .service(MyNotificationsRoute::<SqliteDatabase>::new())
            .service(MarkNotificationReadRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(RegisterVendorRoute::<SqliteDatabase>::new())
            .service(MyVendorProfileRoute::<SqliteDatabase>::new())
            .service(MyProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(MyWalletRoute::<SqliteDatabase>::new())
            .service(WalletHistoryRoute::<SqliteDatabase>::new())
            .service(RequestWithdrawalRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new())
            .service(UpdateRolesRoute::<SqliteDatabase>::new())
            .service(SetVendorStatusRoute::<SqliteDatabase>::new())
            .service(ApproveProductRoute::<SqliteDatabase>::new())
            .service(SetProductStatusRoute::<SqliteDatabase>::new())
            .service(RefundOrderRoute::<SqliteDatabase>::new())
            .service(SettleWithdrawalRoute::<SqliteDatabase>::new())
            .service(AuditWalletRoute::<SqliteDatabase>::new());
        // Webhook deliveries are authenticated by signature, not by token
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(config.paystack.secret_key.clone(), config.webhook_checks))
            .service(PaystackWebhookRoute::<SqliteDatabase, SqliteDatabase>::new());
        app.service(health)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductRoute::<SqliteDatabase>::new())
            .service(ProductReviewsRoute::<SqliteDatabase>::new())
            .service(api_scope)
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Wires in-app notification writes onto the engine's event channels. Hook failures are logged
/// and swallowed; a notification that cannot be stored must never affect the money path.
pub fn notification_hooks(api: NotificationApi<SqliteDatabase>, accounts: AccountApi<SqliteDatabase>) -> EventHooks {
    let mut hooks = EventHooks::default();
    let notifications = api.clone();
    hooks.on_order_created(move |ev| {
        let api = notifications.clone();
        let accounts = accounts.clone();
        Box::pin(async move {
            let note = NewNotification::new(
                ev.order.user_id,
                NotificationCategory::Order,
                "Order placed",
                format!("Order {} was created. Total: {}", ev.order.order_number, ev.order.total),
            );
            if let Err(e) = api.notify(note).await {
                warn!("📬️ Could not store order-created notification. {e}");
            }
            for vendor_id in ev.vendor_ids() {
                let vendor = match accounts.vendor_by_id(vendor_id).await {
                    Ok(Some(v)) => v,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("📬️ Could not look up vendor {vendor_id} for order notification. {e}");
                        continue;
                    },
                };
                let note = NewNotification::new(
                    vendor.user_id,
                    NotificationCategory::Order,
                    "New order received",
                    format!("Order {} includes items from your store.", ev.order.order_number),
                );
                if let Err(e) = api.notify(note).await {
                    warn!("📬️ Could not store vendor order notification. {e}");
                }
            }
        })
    });
    let notifications = api.clone();
    hooks.on_order_paid(move |ev| {
        let api = notifications.clone();
        Box::pin(async move {
            let note = NewNotification::new(
                ev.order.user_id,
                NotificationCategory::Payment,
                "Payment received",
                format!("Payment for order {} was received. Your downloads are ready.", ev.order.order_number),
            );
            if let Err(e) = api.notify(note).await {
                warn!("📬️ Could not store payment notification. {e}");
            }
            for credit in &ev.credits {
                let note = NewNotification::new(
                    credit.user_id,
                    NotificationCategory::Wallet,
                    "You made a sale",
                    format!("{} was credited to your wallet for order {}", credit.amount, ev.order.order_number),
                );
                if let Err(e) = api.notify(note).await {
                    warn!("📬️ Could not store sale notification for vendor user {}. {e}", credit.user_id);
                }
            }
        })
    });
    let notifications = api.clone();
    hooks.on_order_annulled(move |ev| {
        let api = notifications.clone();
        Box::pin(async move {
            let note = NewNotification::new(
                ev.order.user_id,
                NotificationCategory::Order,
                "Order cancelled",
                format!("Order {} was cancelled: {}", ev.order.order_number, ev.reason),
            );
            if let Err(e) = api.notify(note).await {
                warn!("📬️ Could not store cancellation notification. {e}");
            }
        })
    });
    let notifications = api.clone();
    hooks.on_order_refunded(move |ev| {
        let api = notifications.clone();
        Box::pin(async move {
            let note = NewNotification::new(
                ev.order.user_id,
                NotificationCategory::Payment,
                "Order refunded",
                format!("Order {} was refunded. {} is on its way back to you.", ev.order.order_number, ev.payment.amount),
            );
            if let Err(e) = api.notify(note).await {
                warn!("📬️ Could not store refund notification. {e}");
            }
        })
    });
    let notifications = api;
    hooks.on_withdrawal_settled(move |ev| {
        let api = notifications.clone();
        Box::pin(async move {
            let (title, message) = if ev.success {
                ("Withdrawal paid out", format!("{} was transferred to your bank account.", ev.withdrawal.amount))
            } else {
                let reason = ev.withdrawal.failure_reason.as_deref().unwrap_or("Transfer failed");
                ("Withdrawal failed", format!("Withdrawal {} failed: {reason}", ev.withdrawal.reference))
            };
            let note = NewNotification::new(ev.withdrawal.user_id, NotificationCategory::Wallet, title, message);
            if let Err(e) = api.notify(note).await {
                warn!("📬️ Could not store withdrawal notification. {e}");
            }
        })
    });
    hooks
}
