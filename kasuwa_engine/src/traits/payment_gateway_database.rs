use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderItem, OrderNumber, Payment},
    traits::{
        data_objects::{PaymentConfirmation, PaymentConfirmationResult},
        AccountApiError,
        AccountManagement,
    },
};

/// This trait defines the money path for backends supporting the Kasuwa payment engine:
/// order creation, the payment lifecycle, cancellation and refunds.
///
/// Every mutation here runs in a single atomic transaction. In particular, the paid
/// transition in [`confirm_payment`](Self::confirm_payment) either applies all of its side
/// effects (order delivered, sold counts, cart clear, wallet credits) or none of them.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Prices and stores a new order with its items in one transaction.
    ///
    /// Every product must be purchasable (Active and approved); one unpurchasable product
    /// rejects the whole order. Item prices are snapshotted from the live product records.
    /// Order number collisions are retried internally with a fresh number.
    ///
    /// Vendor wallets are not touched here. Crediting happens when the payment is confirmed.
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError>;

    /// Stores a new `Pending` payment row for an order and moves the order to `Confirmed`.
    ///
    /// If a payment with the same idempotency key already exists, that payment is returned
    /// unchanged and nothing is written (this also covers races on the unique key).
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError>;

    /// The single idempotent paid transition. Both the client verify path and the webhook
    /// path call this.
    ///
    /// In one transaction:
    /// * `UPDATE payments SET status = 'Success' ... WHERE reference = ? AND status = 'Pending'`.
    ///   Zero rows affected means another path already finalized this payment; the method
    ///   returns [`PaymentConfirmationResult::AlreadyFinal`] and writes nothing else.
    /// * Otherwise: the order becomes `Delivered`/`Paid` with `delivered_at` set, each item's
    ///   product `sold_count` is incremented, the buyer's cart is cleared, and each item's
    ///   vendor wallet is credited with an `OrderEarning` ledger entry.
    async fn confirm_payment(
        &self,
        reference: &str,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentConfirmationResult, PaymentGatewayError>;

    /// Marks a `Pending` payment as `Failed` with the gateway's failure reason. The order
    /// stays payable; a later payment attempt may still succeed with a new reference.
    async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Payment, PaymentGatewayError>;

    /// Cancels an order. Only `Pending` and `Confirmed` orders can be cancelled.
    ///
    /// If a payment had already succeeded (a race with the webhook), the payment is marked
    /// `Refunded` locally for the full amount; no gateway call is made in this path.
    async fn cancel_order(&self, order_number: &OrderNumber, reason: &str) -> Result<Order, PaymentGatewayError>;

    /// Applies an admin refund: the payment must be `Success`; payment and order both move to
    /// `Refunded` with the given refund reference. Vendor wallets are not debited.
    async fn refund_order(
        &self,
        order_number: &OrderNumber,
        refund_reference: &str,
    ) -> Result<(Order, Payment), PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Orders must contain at least one item")]
    EmptyOrder,
    #[error("Item quantities must be at least 1")]
    InvalidQuantity,
    #[error("Product {0} is not available for purchase")]
    ProductNotPurchasable(i64),
    #[error("Could not generate a unique order number after several attempts")]
    OrderNumberExhausted,
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("The requested payment does not exist for reference {0}")]
    PaymentNotFound(String),
    #[error("Cannot insert payment, since it already exists with reference {0}")]
    PaymentAlreadyExists(String),
    #[error("Order {order} cannot be {action} while it is {status}")]
    InvalidStatusChange { order: OrderNumber, status: String, action: String },
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
