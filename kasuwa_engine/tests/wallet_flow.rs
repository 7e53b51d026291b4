use kasuwa_engine::{
    db_types::{NewOrder, NewOrderItem, NewWithdrawal, ShippingMethod, WalletEntryType, WithdrawalStatus},
    events::EventProducers,
    traits::{PaymentConfirmation, PaymentGatewayDatabase, WalletApiError, WalletManagement},
    OrderFlowApi,
    SqliteDatabase,
    WalletApi,
};
use ksw_common::Kobo;
use tokio::runtime::Runtime;

mod support;
use support::{new_payment_for, seed_storefront, setup, tear_down, Storefront};

fn withdrawal_of(user_id: i64, amount: i64) -> NewWithdrawal {
    NewWithdrawal {
        user_id,
        amount: Kobo::from(amount),
        bank_name: "Zenith Bank".to_string(),
        account_number: "0123456789".to_string(),
        account_name: "Bayo Digital Goods".to_string(),
    }
}

/// Sells the ₦20.00 course so the vendor's wallet holds exactly 2000 kobo.
async fn earn_2000(api: &OrderFlowApi<SqliteDatabase>, shop: &Storefront) {
    let items = vec![NewOrderItem { product_id: shop.products[1].id, quantity: 1 }];
    let order = NewOrder::new(shop.customer.id, items, ShippingMethod::Standard);
    let (order, _) = api.create_order(order).await.expect("Error creating order");
    let payment = api.initialize_payment(new_payment_for(order.id, order.total)).await.unwrap();
    api.confirm_payment(&payment.reference, PaymentConfirmation::default()).await.expect("Error confirming");
}

fn wallet_api(api: &OrderFlowApi<SqliteDatabase>) -> WalletApi<SqliteDatabase> {
    WalletApi::new(api.db().clone(), EventProducers::default())
}

#[test]
fn a_withdrawal_request_holds_funds() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let (wallet, withdrawal) =
            wallets.request_withdrawal(withdrawal_of(shop.vendor_user.id, 500)).await.expect("Error requesting");
        assert_eq!(wallet.available_balance, Kobo::from(1500));
        assert_eq!(wallet.pending_balance, Kobo::from(500));
        assert_eq!(wallet.total_earnings, Kobo::from(2000));
        assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
        assert!(withdrawal.reference.starts_with("WDL-"));
        let audit = wallets.audit(shop.vendor_user.id).await.expect("Error auditing");
        assert!(audit.is_consistent());
        tear_down(api).await;
    });
}

#[test]
fn finalizing_a_withdrawal_drops_the_hold() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let (_, withdrawal) = wallets.request_withdrawal(withdrawal_of(shop.vendor_user.id, 500)).await.unwrap();
        let settled = wallets.finalize_withdrawal(&withdrawal.reference).await.expect("Error finalizing");
        assert_eq!(settled.status, WithdrawalStatus::Success);
        assert!(settled.completed_at.is_some());
        let wallet = wallets.balance(shop.vendor_user.id).await.unwrap().unwrap();
        assert_eq!(wallet.available_balance, Kobo::from(1500));
        assert_eq!(wallet.pending_balance, Kobo::from(0));
        let audit = wallets.audit(shop.vendor_user.id).await.unwrap();
        assert!(audit.is_consistent());
        tear_down(api).await;
    });
}

#[test]
fn a_failed_transfer_returns_the_funds() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let (_, withdrawal) = wallets.request_withdrawal(withdrawal_of(shop.vendor_user.id, 500)).await.unwrap();
        let (wallet, failed) =
            wallets.fail_withdrawal(&withdrawal.reference, "Account name mismatch").await.expect("Error failing");
        assert_eq!(failed.status, WithdrawalStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("Account name mismatch"));
        assert_eq!(wallet.available_balance, Kobo::from(2000));
        assert_eq!(wallet.pending_balance, Kobo::from(0));
        let history = wallets.history(shop.vendor_user.id).await.unwrap();
        assert!(history.iter().any(|e| e.entry_type == WalletEntryType::WithdrawalReversal));
        let audit = wallets.audit(shop.vendor_user.id).await.unwrap();
        assert!(audit.is_consistent());
        tear_down(api).await;
    });
}

#[test]
fn withdrawals_cannot_exceed_the_available_balance() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let err = wallets
            .request_withdrawal(withdrawal_of(shop.vendor_user.id, 5000))
            .await
            .expect_err("Overdraw should be rejected");
        match err {
            WalletApiError::InsufficientFunds { requested, available } => {
                assert_eq!(requested, Kobo::from(5000));
                assert_eq!(available, Kobo::from(2000));
            },
            other => panic!("Expected InsufficientFunds, got {other}"),
        }
        // Nothing moved
        let wallet = wallets.balance(shop.vendor_user.id).await.unwrap().unwrap();
        assert_eq!(wallet.available_balance, Kobo::from(2000));
        assert_eq!(wallet.pending_balance, Kobo::from(0));
        tear_down(api).await;
    });
}

#[test]
fn withdrawal_amounts_must_be_positive() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let err = wallets
            .request_withdrawal(withdrawal_of(shop.vendor_user.id, 0))
            .await
            .expect_err("Zero withdrawal should be rejected");
        assert!(matches!(err, WalletApiError::InvalidAmount));
        tear_down(api).await;
    });
}

#[test]
fn settling_a_withdrawal_twice_is_an_error() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        earn_2000(&api, &shop).await;
        let wallets = wallet_api(&api);
        let (_, withdrawal) = wallets.request_withdrawal(withdrawal_of(shop.vendor_user.id, 500)).await.unwrap();
        wallets.finalize_withdrawal(&withdrawal.reference).await.expect("Error finalizing");
        let err = wallets
            .fail_withdrawal(&withdrawal.reference, "too late")
            .await
            .expect_err("Settled withdrawal should not fail over");
        assert!(matches!(err, WalletApiError::WithdrawalAlreadySettled { .. }));
        // The wallet is untouched by the second settlement attempt
        let wallet = wallets.balance(shop.vendor_user.id).await.unwrap().unwrap();
        assert_eq!(wallet.available_balance, Kobo::from(1500));
        assert_eq!(wallet.pending_balance, Kobo::from(0));
        tear_down(api).await;
    });
}

#[test]
fn unknown_withdrawal_references_are_an_error() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let api = setup().await;
        let shop = seed_storefront(api.db()).await;
        let _ = shop;
        let wallets = wallet_api(&api);
        let err = wallets.finalize_withdrawal("WDL-ghost").await.expect_err("Unknown reference should error");
        assert!(matches!(err, WalletApiError::WithdrawalNotFound(_)));
        tear_down(api).await;
    });
}
