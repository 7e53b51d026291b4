use kasuwa_engine::{
    db_types::{NewNotification, NewReview, NotificationCategory, ProductStatus},
    traits::{CatalogApiError, CatalogManagement, NotificationManagement},
};
use tokio::runtime::Runtime;

mod support;
use support::{place_and_pay, seed_storefront, setup, tear_down};

fn review_of(product_id: i64, user_id: i64, order_id: i64, rating: i64) -> NewReview {
    NewReview { product_id, user_id, order_id, rating, comment: Some("Solid material".to_string()) }
}

#[test]
fn buyers_can_review_delivered_products() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = place_and_pay(&api, &shop).await;
        let review = review_of(shop.products[0].id, shop.customer.id, settled.order.id, 5);
        let stored = api.db().create_review(review).await.expect("Error creating review");
        assert_eq!(stored.rating, 5);
        let reviews = api.db().fetch_reviews_for_product(shop.products[0].id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        tear_down(api).await;
    });
}

#[test]
fn reviews_require_a_delivered_order() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let (order, _) = api.create_order(support::one_of_each(&shop)).await.expect("Error creating order");
        let review = review_of(shop.products[0].id, shop.customer.id, order.id, 4);
        let err = api.db().create_review(review).await.expect_err("Unpaid order should not be reviewable");
        assert!(matches!(err, CatalogApiError::ReviewNotAllowed));
        tear_down(api).await;
    });
}

#[test]
fn ratings_are_bounded() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = place_and_pay(&api, &shop).await;
        for rating in [0, 6, -1] {
            let review = review_of(shop.products[0].id, shop.customer.id, settled.order.id, rating);
            let err = api.db().create_review(review).await.expect_err("Out-of-range rating should be rejected");
            assert!(matches!(err, CatalogApiError::InvalidRating(r) if r == rating));
        }
        tear_down(api).await;
    });
}

#[test]
fn each_order_item_gets_one_review() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let settled = place_and_pay(&api, &shop).await;
        let review = review_of(shop.products[0].id, shop.customer.id, settled.order.id, 5);
        api.db().create_review(review.clone()).await.expect("Error creating review");
        let err = api.db().create_review(review).await.expect_err("Duplicate review should be rejected");
        assert!(matches!(err, CatalogApiError::DuplicateReview));
        tear_down(api).await;
    });
}

#[test]
fn deactivated_products_leave_the_storefront() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        assert_eq!(api.db().fetch_active_products().await.unwrap().len(), 2);
        api.db().set_product_status(shop.products[0].id, ProductStatus::Inactive).await.expect("Error updating");
        let active = api.db().fetch_active_products().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, shop.products[1].id);
        tear_down(api).await;
    });
}

#[test]
fn notifications_are_per_user_and_markable() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let db = api.db();
        let n1 = db
            .create_notification(NewNotification::new(
                shop.customer.id,
                NotificationCategory::Order,
                "Order placed",
                "Your order is awaiting payment",
            ))
            .await
            .expect("Error creating notification");
        db.create_notification(NewNotification::new(
            shop.vendor_user.id,
            NotificationCategory::Wallet,
            "You made a sale",
            "Your wallet has been credited",
        ))
        .await
        .unwrap();

        let unread = db.fetch_notifications_for_user(shop.customer.id, true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Order placed");

        // Users cannot mark other people's notifications
        assert_eq!(db.mark_notification_read(n1.id, shop.vendor_user.id).await.unwrap(), 0);
        assert_eq!(db.mark_notification_read(n1.id, shop.customer.id).await.unwrap(), 1);
        assert!(db.fetch_notifications_for_user(shop.customer.id, true).await.unwrap().is_empty());
        tear_down(api).await;
    });
}
