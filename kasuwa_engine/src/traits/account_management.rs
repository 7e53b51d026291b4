use thiserror::Error;

use crate::db_types::{CartItem, NewUser, NewVendor, Order, OrderItem, OrderNumber, Payment, User, Vendor, VendorStatus};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("The requested user {0} does not exist")]
    UserNotFound(i64),
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("User {0} is already registered as a vendor")]
    VendorAlreadyRegistered(i64),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait covers users, vendor registration, carts, and read access
/// to orders and payments. The money-path mutations live on
/// [`PaymentGatewayDatabase`](crate::traits::PaymentGatewayDatabase).
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn create_user(&self, user: NewUser) -> Result<User, AccountApiError>;

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;

    /// Registers an existing user as a vendor. Grants the `Vendor` role and creates the
    /// vendor's (empty) wallet in the same transaction. The vendor starts out `Pending`.
    async fn register_vendor(&self, vendor: NewVendor) -> Result<Vendor, AccountApiError>;

    async fn fetch_vendor_for_user(&self, user_id: i64) -> Result<Option<Vendor>, AccountApiError>;

    async fn fetch_vendor_by_id(&self, vendor_id: i64) -> Result<Option<Vendor>, AccountApiError>;

    /// Admin moderation: approve or suspend a vendor.
    async fn update_vendor_status(&self, vendor_id: i64, status: VendorStatus) -> Result<Vendor, AccountApiError>;

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AccountApiError>;

    /// All orders for the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError>;

    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, AccountApiError>;

    async fn fetch_payment_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, AccountApiError>;

    /// Adds to the user's cart, merging quantities if the product is already present.
    async fn add_cart_item(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, AccountApiError>;

    async fn cart_for_user(&self, user_id: i64) -> Result<Vec<CartItem>, AccountApiError>;
}
