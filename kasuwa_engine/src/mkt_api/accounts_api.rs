use crate::{
    db_types::{CartItem, NewUser, NewVendor, Order, OrderItem, OrderNumber, Payment, User, Vendor, VendorStatus},
    traits::{AccountApiError, AccountManagement},
};

/// User accounts, vendor registration, carts, and read access to orders and payments.
#[derive(Debug, Clone)]
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        self.db.create_user(user).await
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_id(user_id).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_email(email).await
    }

    pub async fn register_vendor(&self, vendor: NewVendor) -> Result<Vendor, AccountApiError> {
        self.db.register_vendor(vendor).await
    }

    pub async fn vendor_for_user(&self, user_id: i64) -> Result<Option<Vendor>, AccountApiError> {
        self.db.fetch_vendor_for_user(user_id).await
    }

    pub async fn vendor_by_id(&self, vendor_id: i64) -> Result<Option<Vendor>, AccountApiError> {
        self.db.fetch_vendor_by_id(vendor_id).await
    }

    pub async fn update_vendor_status(&self, vendor_id: i64, status: VendorStatus) -> Result<Vendor, AccountApiError> {
        self.db.update_vendor_status(vendor_id, status).await
    }

    pub async fn order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_number(order_number).await
    }

    pub async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AccountApiError> {
        self.db.fetch_order_items(order_id).await
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        self.db.fetch_payments_for_order(order_id).await
    }

    pub async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, AccountApiError> {
        self.db.fetch_payment_by_reference(reference).await
    }

    pub async fn payment_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, AccountApiError> {
        self.db.fetch_payment_by_idempotency_key(key).await
    }

    pub async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, AccountApiError> {
        self.db.add_cart_item(user_id, product_id, quantity).await
    }

    pub async fn cart(&self, user_id: i64) -> Result<Vec<CartItem>, AccountApiError> {
        self.db.cart_for_user(user_id).await
    }
}
