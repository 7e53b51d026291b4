//! `SqliteDatabase` is a concrete implementation of a Kasuwa payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`traits`](crate::traits) module.
use std::{collections::BTreeMap, fmt::Debug};

use ksw_common::Kobo;
use log::*;
use sqlx::SqlitePool;

use super::db::{carts, new_pool, notifications, orders, payments, products, reviews, users, wallets, withdrawals};
use crate::{
    db_types::{
        CartItem,
        NewNotification,
        NewOrder,
        NewPayment,
        NewProduct,
        NewReview,
        NewUser,
        NewVendor,
        NewWithdrawal,
        Notification,
        Order,
        OrderItem,
        OrderNumber,
        Payment,
        Product,
        ProductStatus,
        Review,
        Role,
        User,
        Vendor,
        VendorStatus,
        Wallet,
        WalletEntry,
        Withdrawal,
    },
    helpers::{self, PricedLine},
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        NotificationManagement,
        PaymentConfirmation,
        PaymentConfirmationResult,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        SettledOrder,
        VendorCredit,
        WalletApiError,
        WalletAudit,
        WalletManagement,
    },
};

/// The number of fresh order numbers to try before giving up on a collision streak.
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError> {
        if order.items.is_empty() {
            return Err(PaymentGatewayError::EmptyOrder);
        }
        if order.items.iter().any(|i| i.quantity < 1) {
            return Err(PaymentGatewayError::InvalidQuantity);
        }
        let mut tx = self.pool.begin().await?;
        // Merge duplicate product lines so the (order_id, product_id) constraint holds.
        let mut quantities = BTreeMap::new();
        for item in &order.items {
            *quantities.entry(item.product_id).or_insert(0i64) += item.quantity;
        }
        let mut lines = Vec::with_capacity(quantities.len());
        for (product_id, quantity) in quantities {
            let product = products::purchasable_product(product_id, &mut tx)
                .await?
                .ok_or(PaymentGatewayError::ProductNotPurchasable(product_id))?;
            lines.push(PricedLine {
                product_id,
                vendor_id: product.vendor_id,
                unit_price: product.price,
                quantity,
                download_limit: product.download_limit,
            });
        }
        let pricing = helpers::price_order(&lines, order.shipping_method);
        let mut stored = None;
        for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = helpers::new_order_number();
            match orders::insert_order(&order_number, order.user_id, &pricing, order.shipping_method, &mut tx).await {
                Ok(o) => {
                    stored = Some(o);
                    break;
                },
                Err(e) if super::db::is_unique_violation(&e, "orders.order_number") => {
                    warn!("🗃️ Order number {order_number} collided. Trying again.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        let stored = stored.ok_or(PaymentGatewayError::OrderNumberExhausted)?;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = orders::insert_order_item(stored.id, line, &mut tx).await?;
            items.push(item);
        }
        tx.commit().await?;
        debug!("🗃️ Order {} saved with {} item(s), total {}", stored.order_number, items.len(), stored.total);
        Ok((stored, items))
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = payments::payment_by_idempotency_key(&payment.idempotency_key, &mut tx).await? {
            debug!("🗃️ Payment init replayed for key {}. Returning payment {}", payment.idempotency_key, existing.reference);
            return Ok(existing);
        }
        let order_id = payment.order_id;
        let key = payment.idempotency_key.clone();
        let reference = payment.reference.clone();
        let stored = match payments::insert_payment(payment, &mut tx).await {
            Ok(p) => p,
            Err(e) if super::db::is_unique_violation(&e, "payments.idempotency_key") => {
                // Lost a race on the idempotency key. The winner's payment is the answer.
                return payments::payment_by_idempotency_key(&key, &mut tx)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::PaymentNotFound(reference));
            },
            Err(e) if super::db::is_unique_violation(&e, "payments.reference") => {
                return Err(PaymentGatewayError::PaymentAlreadyExists(reference));
            },
            Err(e) => return Err(e.into()),
        };
        orders::mark_confirmed(order_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payment {} ({}) saved for order id {order_id}", stored.reference, stored.amount);
        Ok(stored)
    }

    async fn confirm_payment(
        &self,
        reference: &str,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentConfirmationResult, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let Some(payment) = payments::try_mark_success(reference, &confirmation, &mut tx).await? else {
            // Somebody got here first (or the payment failed). Nothing has been written.
            let payment = payments::payment_by_reference(reference, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::PaymentNotFound(reference.to_string()))?;
            debug!("🗃️ Payment {reference} is already {}. No changes made.", payment.status);
            return Ok(PaymentConfirmationResult::AlreadyFinal(payment));
        };
        let order = orders::mark_delivered(payment.order_id, &payment.reference, &mut tx).await?;
        let items = orders::items_for_order(order.id, &mut tx).await?;
        let mut earnings = BTreeMap::new();
        for item in &items {
            products::incr_sold_count(item.product_id, item.quantity, &mut tx).await?;
            *earnings.entry(item.vendor_id).or_insert(Kobo::from(0)) += item.line_total();
        }
        let note = format!("Earnings for order {}", order.order_number);
        let mut credits = Vec::with_capacity(earnings.len());
        for (vendor_id, amount) in earnings {
            let vendor = users::vendor_by_id(vendor_id, &mut tx).await?.ok_or_else(|| {
                PaymentGatewayError::DatabaseError(format!("Vendor {vendor_id} vanished mid-transaction"))
            })?;
            let wallet = wallets::credit_earnings(vendor.user_id, amount, &payment.reference, Some(&note), &mut tx)
                .await?
                .ok_or_else(|| {
                    PaymentGatewayError::DatabaseError(format!("Vendor {vendor_id} has no wallet to credit"))
                })?;
            credits.push(VendorCredit { vendor_id, wallet_id: wallet.id, user_id: vendor.user_id, amount });
        }
        carts::clear_cart(order.user_id, &mut tx).await?;
        tx.commit().await?;
        info!(
            "🗃️ Payment {reference} confirmed. Order {} delivered, {} vendor wallet(s) credited.",
            order.order_number,
            credits.len()
        );
        Ok(PaymentConfirmationResult::Confirmed(Box::new(SettledOrder { order, payment, credits })))
    }

    async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Payment, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        match payments::mark_failed(reference, reason, &mut conn).await? {
            Some(payment) => {
                debug!("🗃️ Payment {reference} marked as failed. Reason: {reason}");
                Ok(payment)
            },
            // Already final. Return the payment as-is so retries are harmless.
            None => payments::payment_by_reference(reference, &mut conn)
                .await?
                .ok_or_else(|| PaymentGatewayError::PaymentNotFound(reference.to_string())),
        }
    }

    async fn cancel_order(&self, order_number: &OrderNumber, reason: &str) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::cancel_order(order_number, reason, &mut tx).await? else {
            let order = orders::order_by_number(order_number, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_number.clone()))?;
            return Err(PaymentGatewayError::InvalidStatusChange {
                order: order_number.clone(),
                status: order.status.to_string(),
                action: "cancelled".to_string(),
            });
        };
        // If a charge slipped through before the cancellation landed, reverse it on the books.
        let settled = payments::payments_for_order(order.id, &mut tx).await?;
        for payment in settled.iter().filter(|p| p.status == crate::db_types::PaymentStatus::Success) {
            let refund_reference = helpers::new_refund_reference();
            payments::mark_refunded(payment.id, &refund_reference, &mut tx).await?;
            orders::mark_payment_status_refunded(order.id, &mut tx).await?;
            warn!("🗃️ Order {order_number} was paid before cancellation. Payment {} refunded locally.", payment.reference);
        }
        tx.commit().await?;
        Ok(order)
    }

    async fn refund_order(
        &self,
        order_number: &OrderNumber,
        refund_reference: &str,
    ) -> Result<(Order, Payment), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::order_by_number(order_number, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_number.clone()))?;
        let Some(updated) = orders::mark_refunded(order.id, &mut tx).await? else {
            return Err(PaymentGatewayError::InvalidStatusChange {
                order: order_number.clone(),
                status: order.status.to_string(),
                action: "refunded".to_string(),
            });
        };
        let paid = payments::payments_for_order(order.id, &mut tx)
            .await?
            .into_iter()
            .find(|p| p.status == crate::db_types::PaymentStatus::Success)
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(order_number.to_string()))?;
        let payment = payments::mark_refunded(paid.id, refund_reference, &mut tx).await?.ok_or_else(|| {
            PaymentGatewayError::DatabaseError(format!("Payment {} changed state mid-transaction", paid.reference))
        })?;
        tx.commit().await?;
        info!("🗃️ Order {order_number} refunded. Payment {} -> {refund_reference}", payment.reference);
        Ok((updated, payment))
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::user_by_id(user_id, &mut conn).await?)
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::user_by_email(email, &mut conn).await?)
    }

    async fn register_vendor(&self, vendor: NewVendor) -> Result<Vendor, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let user = users::user_by_id(vendor.user_id, &mut tx)
            .await?
            .ok_or(AccountApiError::UserNotFound(vendor.user_id))?;
        let stored = users::insert_vendor(vendor, &mut tx).await?;
        let roles = user.roles.with_granted(&[Role::Vendor]);
        users::set_roles(user.id, &roles, &mut tx).await?;
        if wallets::wallet_for_user(user.id, &mut tx).await?.is_none() {
            wallets::create_wallet(user.id, &mut tx).await?;
        }
        tx.commit().await?;
        info!("🗃️ User {} is now vendor {} ({})", user.id, stored.id, stored.business_name);
        Ok(stored)
    }

    async fn fetch_vendor_for_user(&self, user_id: i64) -> Result<Option<Vendor>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::vendor_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_vendor_by_id(&self, vendor_id: i64) -> Result<Option<Vendor>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::vendor_by_id(vendor_id, &mut conn).await?)
    }

    async fn update_vendor_status(&self, vendor_id: i64, status: VendorStatus) -> Result<Vendor, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let vendor = users::set_vendor_status(vendor_id, status, &mut conn)
            .await?
            .ok_or_else(|| AccountApiError::QueryError(format!("Vendor {vendor_id} does not exist")))?;
        info!("🗃️ Vendor {} ({}) is now {}", vendor.id, vendor.business_name, vendor.status);
        Ok(vendor)
    }

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_by_number(order_number, &mut conn).await?)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::items_for_order(order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::orders_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::payments_for_order(order_id, &mut conn).await?)
    }

    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::payment_by_reference(reference, &mut conn).await?)
    }

    async fn fetch_payment_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::payment_by_idempotency_key(key, &mut conn).await?)
    }

    async fn add_cart_item(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, AccountApiError> {
        if quantity < 1 {
            return Err(AccountApiError::QueryError("Cart quantities must be at least 1".to_string()));
        }
        let mut conn = self.pool.acquire().await?;
        Ok(carts::upsert_cart_item(user_id, product_id, quantity, &mut conn).await?)
    }

    async fn cart_for_user(&self, user_id: i64) -> Result<Vec<CartItem>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::cart_for_user(user_id, &mut conn).await?)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_roles_for_user(&self, user_id: i64) -> Result<Vec<Role>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::user_by_id(user_id, &mut conn).await?.ok_or(AuthApiError::UserNotFound)?;
        Ok(user.roles.roles())
    }

    async fn check_user_has_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError> {
        let held = self.fetch_roles_for_user(user_id).await?;
        let missing = roles.iter().filter(|r| !held.contains(r)).count();
        if missing > 0 {
            return Err(AuthApiError::RoleNotAllowed(missing));
        }
        Ok(())
    }

    async fn assign_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::user_by_id(user_id, &mut conn).await?.ok_or(AuthApiError::UserNotFound)?;
        let updated = user.roles.with_granted(roles);
        users::set_roles(user_id, &updated, &mut conn).await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        debug!("🔐️ Roles {roles:?} assigned to user {user_id}");
        Ok(())
    }

    async fn remove_roles(&self, user_id: i64, roles: &[Role]) -> Result<u64, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::user_by_id(user_id, &mut conn).await?.ok_or(AuthApiError::UserNotFound)?;
        let (updated, removed) = user.roles.with_revoked(roles);
        users::set_roles(user_id, &updated, &mut conn).await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        debug!("🔐️ {removed} role(s) removed from user {user_id}");
        Ok(removed)
    }
}

impl WalletManagement for SqliteDatabase {
    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, WalletApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wallets::wallet_for_user(user_id, &mut conn).await?)
    }

    async fn wallet_history(&self, user_id: i64) -> Result<Vec<WalletEntry>, WalletApiError> {
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::wallet_for_user(user_id, &mut conn).await?.ok_or(WalletApiError::WalletNotFound(user_id))?;
        Ok(wallets::entries_for_wallet(wallet.id, &mut conn).await?)
    }

    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<(Wallet, Withdrawal), WalletApiError> {
        if withdrawal.amount <= Kobo::from(0) {
            return Err(WalletApiError::InvalidAmount);
        }
        let mut tx = self.pool.begin().await?;
        let reference = helpers::new_withdrawal_reference();
        let Some(wallet) = wallets::hold_for_withdrawal(withdrawal.user_id, withdrawal.amount, &reference, &mut tx).await?
        else {
            let wallet = wallets::wallet_for_user(withdrawal.user_id, &mut tx)
                .await?
                .ok_or(WalletApiError::WalletNotFound(withdrawal.user_id))?;
            return Err(WalletApiError::InsufficientFunds {
                requested: withdrawal.amount,
                available: wallet.available_balance,
            });
        };
        let stored = withdrawals::insert_withdrawal(withdrawal, &reference, &mut tx).await?;
        tx.commit().await?;
        info!("🗃️ Withdrawal {reference} for {} requested by user {}", stored.amount, stored.user_id);
        Ok((wallet, stored))
    }

    async fn finalize_withdrawal(&self, reference: &str) -> Result<Withdrawal, WalletApiError> {
        let mut tx = self.pool.begin().await?;
        let Some(withdrawal) = withdrawals::mark_success(reference, &mut tx).await? else {
            return Err(already_settled(reference, &mut tx).await?);
        };
        wallets::settle_hold(withdrawal.user_id, withdrawal.amount, &mut tx).await?;
        tx.commit().await?;
        info!("🗃️ Withdrawal {reference} settled. {} paid out to user {}", withdrawal.amount, withdrawal.user_id);
        Ok(withdrawal)
    }

    async fn fail_withdrawal(&self, reference: &str, reason: &str) -> Result<(Wallet, Withdrawal), WalletApiError> {
        let mut tx = self.pool.begin().await?;
        let Some(withdrawal) = withdrawals::mark_failed(reference, reason, &mut tx).await? else {
            return Err(already_settled(reference, &mut tx).await?);
        };
        let wallet = wallets::release_hold(withdrawal.user_id, withdrawal.amount, reference, &mut tx)
            .await?
            .ok_or(WalletApiError::WalletNotFound(withdrawal.user_id))?;
        tx.commit().await?;
        warn!("🗃️ Withdrawal {reference} failed ({reason}). {} returned to user {}", withdrawal.amount, withdrawal.user_id);
        Ok((wallet, withdrawal))
    }

    async fn fetch_withdrawal_by_reference(&self, reference: &str) -> Result<Option<Withdrawal>, WalletApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::withdrawal_by_reference(reference, &mut conn).await?)
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, WalletApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::withdrawals_for_user(user_id, &mut conn).await?)
    }

    async fn audit_wallet(&self, user_id: i64) -> Result<WalletAudit, WalletApiError> {
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::wallet_for_user(user_id, &mut conn).await?.ok_or(WalletApiError::WalletNotFound(user_id))?;
        let ledger_total = wallets::ledger_total(wallet.id, &mut conn).await?;
        Ok(WalletAudit { wallet, ledger_total })
    }
}

/// Builds the right error for a withdrawal settlement that found no `Pending` row.
async fn already_settled(reference: &str, conn: &mut sqlx::SqliteConnection) -> Result<WalletApiError, WalletApiError> {
    let err = match withdrawals::withdrawal_by_reference(reference, conn).await? {
        Some(w) => WalletApiError::WithdrawalAlreadySettled { reference: reference.to_string(), status: w.status.to_string() },
        None => WalletApiError::WithdrawalNotFound(reference.to_string()),
    };
    Ok(err)
}

impl CatalogManagement for SqliteDatabase {
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        users::vendor_by_id(product.vendor_id, &mut conn)
            .await?
            .ok_or(CatalogApiError::VendorNotFound(product.vendor_id))?;
        let stored = products::insert_product(product, &mut conn).await?;
        debug!("🛍️ Product {} ({}) listed by vendor {}", stored.id, stored.title, stored.vendor_id);
        Ok(stored)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::product_by_id(product_id, &mut conn).await?)
    }

    async fn fetch_active_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::active_products(&mut conn).await?)
    }

    async fn fetch_products_for_vendor(&self, vendor_id: i64) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::products_for_vendor(vendor_id, &mut conn).await?)
    }

    async fn approve_product(&self, product_id: i64) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::set_approved(product_id, true, &mut conn)
            .await?
            .ok_or(CatalogApiError::ProductNotFound(product_id))?;
        info!("🛍️ Product {} ({}) approved", product.id, product.title);
        Ok(product)
    }

    async fn set_product_status(&self, product_id: i64, status: ProductStatus) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::set_status(product_id, status, &mut conn).await?.ok_or(CatalogApiError::ProductNotFound(product_id))
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, CatalogApiError> {
        if !(1..=5).contains(&review.rating) {
            return Err(CatalogApiError::InvalidRating(review.rating));
        }
        let mut tx = self.pool.begin().await?;
        let purchased =
            reviews::user_purchased_product(review.user_id, review.product_id, review.order_id, &mut tx).await?;
        if !purchased {
            return Err(CatalogApiError::ReviewNotAllowed);
        }
        let stored = reviews::insert_review(review, &mut tx).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reviews::reviews_for_product(product_id, &mut conn).await?)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::insert_notification(notification, &mut conn).await?)
    }

    async fn fetch_notifications_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::notifications_for_user(user_id, unread_only, &mut conn).await?)
    }

    async fn mark_notification_read(&self, notification_id: i64, user_id: i64) -> Result<u64, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::mark_read(notification_id, user_id, &mut conn).await?)
    }
}
