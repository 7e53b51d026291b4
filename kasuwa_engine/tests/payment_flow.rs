use kasuwa_engine::{
    db_types::{OrderPaymentStatus, OrderStatusType, PaymentStatus},
    traits::{
        AccountManagement,
        CatalogManagement,
        PaymentConfirmation,
        PaymentConfirmationResult,
        PaymentGatewayError,
        WalletManagement,
    },
};
use ksw_common::Kobo;
use tokio::runtime::Runtime;

mod support;
use support::{new_payment_for, one_of_each, place_and_pay, seed_storefront, setup, tear_down};

#[test]
fn a_confirmed_payment_delivers_and_credits() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        // Something in the cart, so we can check that paying clears it
        api.db().add_cart_item(shop.customer.id, shop.products[0].id, 1).await.expect("Error seeding cart");

        let settled = place_and_pay(&api, &shop).await;
        assert_eq!(settled.order.status, OrderStatusType::Delivered);
        assert_eq!(settled.order.payment_status, OrderPaymentStatus::Paid);
        assert!(settled.order.delivered_at.is_some());
        assert_eq!(settled.order.payment_reference.as_deref(), Some(settled.payment.reference.as_str()));
        assert_eq!(settled.payment.status, PaymentStatus::Success);
        assert!(settled.payment.paid_at.is_some());

        // One vendor, credited with the full subtotal. Tax and shipping are not earnings.
        assert_eq!(settled.credits.len(), 1);
        assert_eq!(settled.credits[0].user_id, shop.vendor_user.id);
        assert_eq!(settled.credits[0].amount, Kobo::from(3000));
        let wallet = api.db().fetch_wallet_for_user(shop.vendor_user.id).await.unwrap().expect("No wallet");
        assert_eq!(wallet.available_balance, Kobo::from(3000));
        assert_eq!(wallet.total_earnings, Kobo::from(3000));
        assert_eq!(wallet.this_month, Kobo::from(3000));
        let audit = api.db().audit_wallet(shop.vendor_user.id).await.expect("Error auditing wallet");
        assert!(audit.is_consistent());

        // Sold counts tick over and the buyer's cart is gone
        let product = api.db().fetch_product(shop.products[0].id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 1);
        let cart = api.db().cart_for_user(shop.customer.id).await.unwrap();
        assert!(cart.is_empty());
        tear_down(api).await;
    });
}

#[test]
fn confirming_twice_credits_once() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = place_and_pay(&api, &shop).await;
        // Webhook arrives after the client already verified
        let result = api
            .confirm_payment(&settled.payment.reference, PaymentConfirmation::default())
            .await
            .expect("Error confirming");
        match result {
            PaymentConfirmationResult::AlreadyFinal(p) => assert_eq!(p.status, PaymentStatus::Success),
            PaymentConfirmationResult::Confirmed(_) => panic!("Second confirmation must not re-settle"),
        }
        let wallet = api.db().fetch_wallet_for_user(shop.vendor_user.id).await.unwrap().unwrap();
        assert_eq!(wallet.available_balance, Kobo::from(3000));
        let product = api.db().fetch_product(shop.products[0].id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 1);
        tear_down(api).await;
    });
}

#[test]
fn payment_initialization_is_idempotent() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let mut first = new_payment_for(order.id, order.total);
        first.idempotency_key = "retry-me".to_string();
        let mut second = new_payment_for(order.id, order.total);
        second.idempotency_key = "retry-me".to_string();
        let p1 = api.initialize_payment(first).await.expect("Error initializing payment");
        let p2 = api.initialize_payment(second).await.expect("Error replaying payment init");
        assert_eq!(p1.id, p2.id);
        assert_eq!(p1.reference, p2.reference);
        assert_eq!(api.db().fetch_payments_for_order(order.id).await.unwrap().len(), 1);
        // Initializing a payment confirms the order
        let order = api.db().fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatusType::Confirmed);
        tear_down(api).await;
    });
}

#[test]
fn a_failed_charge_leaves_the_order_payable() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let p1 = api.initialize_payment(new_payment_for(order.id, order.total)).await.unwrap();
        let failed = api.fail_payment(&p1.reference, "Declined by issuer").await.expect("Error failing payment");
        assert_eq!(failed.status, PaymentStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("Declined by issuer"));

        // A failed payment cannot be confirmed later
        let result = api.confirm_payment(&p1.reference, PaymentConfirmation::default()).await.unwrap();
        assert!(matches!(result, PaymentConfirmationResult::AlreadyFinal(p) if p.status == PaymentStatus::Failed));

        // ... but a fresh attempt still settles the order
        let p2 = api.initialize_payment(new_payment_for(order.id, order.total)).await.unwrap();
        let result = api.confirm_payment(&p2.reference, PaymentConfirmation::default()).await.unwrap();
        assert!(matches!(result, PaymentConfirmationResult::Confirmed(_)));
        tear_down(api).await;
    });
}

#[test]
fn refunds_reverse_the_order_but_not_the_wallet() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = place_and_pay(&api, &shop).await;
        let (order, payment) =
            api.refund_order(&settled.order.order_number, "RFD-test123").await.expect("Error refunding");
        assert_eq!(order.status, OrderStatusType::Refunded);
        assert_eq!(order.payment_status, OrderPaymentStatus::Refunded);
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.refund_reference.as_deref(), Some("RFD-test123"));
        assert_eq!(payment.refund_amount, Some(payment.amount));
        assert!(payment.refunded_at.is_some());
        // Refunds come out of the platform's pocket. Vendor books stay as they were.
        let wallet = api.db().fetch_wallet_for_user(shop.vendor_user.id).await.unwrap().unwrap();
        assert_eq!(wallet.available_balance, Kobo::from(3000));
        let audit = api.db().audit_wallet(shop.vendor_user.id).await.unwrap();
        assert!(audit.is_consistent());
        tear_down(api).await;
    });
}

#[test]
fn only_delivered_orders_can_be_refunded() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let err = api
            .refund_order(&order.order_number, "RFD-early")
            .await
            .expect_err("Unpaid order should not be refundable");
        assert!(matches!(err, PaymentGatewayError::InvalidStatusChange { .. }));
        tear_down(api).await;
    });
}

#[test]
fn confirming_an_unknown_reference_is_an_error() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let err = api
            .confirm_payment("PSK-doesnotexist", PaymentConfirmation::default())
            .await
            .expect_err("Unknown reference should error");
        assert!(matches!(err, PaymentGatewayError::PaymentNotFound(_)));
        tear_down(api).await;
    });
}
