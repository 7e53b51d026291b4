use kasuwa_engine::{
    db_types::{NewOrder, NewOrderItem, OrderPaymentStatus, OrderStatusType, ShippingMethod},
    traits::PaymentGatewayError,
};
use ksw_common::Kobo;
use tokio::runtime::Runtime;

mod support;
use support::{one_of_each, seed_storefront, setup, tear_down};

#[test]
fn pricing_a_standard_order() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, items) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        assert!(order.order_number.as_str().starts_with("KSW-"));
        assert_eq!(order.status, OrderStatusType::Pending);
        assert_eq!(order.payment_status, OrderPaymentStatus::Pending);
        assert_eq!(order.subtotal, Kobo::from(3000));
        assert_eq!(order.tax, Kobo::from(225));
        assert_eq!(order.shipping_fee, Kobo::from(0));
        assert_eq!(order.total, Kobo::from(3225));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.vendor_id == shop.vendor.id));
        tear_down(api).await;
    });
}

#[test]
fn express_shipping_adds_flat_fee() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let items = vec![NewOrderItem { product_id: shop.products[0].id, quantity: 2 }];
        let order = NewOrder::new(shop.customer.id, items, ShippingMethod::Express);
        let (order, _) = api.create_order(order).await.expect("Error creating order");
        assert_eq!(order.subtotal, Kobo::from(2000));
        assert_eq!(order.tax, Kobo::from(150));
        assert_eq!(order.shipping_fee, Kobo::from(2500));
        assert_eq!(order.total, Kobo::from(4650));
        tear_down(api).await;
    });
}

#[test]
fn empty_orders_are_rejected() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let order = NewOrder::new(shop.customer.id, vec![], ShippingMethod::Standard);
        let err = api.create_order(order).await.expect_err("Empty order should be rejected");
        assert!(matches!(err, PaymentGatewayError::EmptyOrder));
        tear_down(api).await;
    });
}

#[test]
fn zero_quantities_are_rejected() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let items = vec![NewOrderItem { product_id: shop.products[0].id, quantity: 0 }];
        let order = NewOrder::new(shop.customer.id, items, ShippingMethod::Standard);
        let err = api.create_order(order).await.expect_err("Zero quantity should be rejected");
        assert!(matches!(err, PaymentGatewayError::InvalidQuantity));
        tear_down(api).await;
    });
}

#[test]
fn unapproved_products_cannot_be_ordered() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        use kasuwa_engine::{db_types::NewProduct, traits::CatalogManagement};
        let unapproved = api
            .db()
            .create_product(NewProduct::new(shop.vendor.id, "Draft product", Kobo::from(500)))
            .await
            .expect("Error creating product");
        let items = vec![NewOrderItem { product_id: unapproved.id, quantity: 1 }];
        let order = NewOrder::new(shop.customer.id, items, ShippingMethod::Standard);
        let err = api.create_order(order).await.expect_err("Unapproved product should be rejected");
        assert!(matches!(err, PaymentGatewayError::ProductNotPurchasable(id) if id == unapproved.id));
        tear_down(api).await;
    });
}

#[test]
fn duplicate_product_lines_are_merged() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let items = vec![
            NewOrderItem { product_id: shop.products[0].id, quantity: 1 },
            NewOrderItem { product_id: shop.products[0].id, quantity: 2 },
        ];
        let order = NewOrder::new(shop.customer.id, items, ShippingMethod::Standard);
        let (order, items) = api.create_order(order).await.expect("Error creating order");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(order.subtotal, Kobo::from(3000));
        tear_down(api).await;
    });
}

#[test]
fn pending_orders_can_be_cancelled() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(one_of_each(&shop)).await.expect("Error creating order");
        let cancelled = api.cancel_order(&order.order_number, "changed my mind").await.expect("Error cancelling");
        assert_eq!(cancelled.status, OrderStatusType::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));
        assert!(cancelled.cancelled_at.is_some());
        tear_down(api).await;
    });
}

#[test]
fn delivered_orders_cannot_be_cancelled() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = support::place_and_pay(&api, &shop).await;
        let err = api
            .cancel_order(&settled.order.order_number, "too late")
            .await
            .expect_err("Delivered order should not be cancellable");
        assert!(matches!(err, PaymentGatewayError::InvalidStatusChange { .. }));
        tear_down(api).await;
    });
}

#[test]
fn cancelling_a_missing_order_is_an_error() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let err = api
            .cancel_order(&"KSW-nope-0000".into(), "ghost")
            .await
            .expect_err("Missing order should not be cancellable");
        assert!(matches!(err, PaymentGatewayError::OrderNotFound(_)));
        tear_down(api).await;
    });
}
