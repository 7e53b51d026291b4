use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderItem, OrderNumber, ShippingMethod},
    helpers::{OrderPricing, PricedLine},
    traits::PaymentGatewayError,
};

/// Inserts a new order row. Collisions on the unique order number surface as a database
/// error; the caller retries with a fresh number.
pub async fn insert_order(
    order_number: &OrderNumber,
    user_id: i64,
    pricing: &OrderPricing,
    shipping_method: ShippingMethod,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO orders (order_number, user_id, subtotal, tax, shipping_fee, total, shipping_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order_number.as_str())
    .bind(user_id)
    .bind(pricing.subtotal.value())
    .bind(pricing.tax.value())
    .bind(pricing.shipping_fee.value())
    .bind(pricing.total.value())
    .bind(shipping_method.to_string())
    .fetch_one(conn)
    .await
}

pub async fn insert_order_item(
    order_id: i64,
    line: &PricedLine,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, vendor_id, unit_price, quantity, download_limit)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.vendor_id)
    .bind(line.unit_price.value())
    .bind(line.quantity)
    .bind(line.download_limit)
    .fetch_one(conn)
    .await
}

pub async fn order_by_number(
    order_number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await
}

pub async fn orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub async fn items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// Moves a `Pending` order to `Confirmed` when a payment is initialized for it. A no-op for
/// orders past `Pending` (e.g. a second payment attempt after a failed charge).
pub async fn mark_confirmed(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET status = 'Confirmed', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = 'Pending'",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// The order side of the paid transition: `Delivered`/`Paid` with `delivered_at` set.
/// Digital goods are delivered the moment payment succeeds.
pub(crate) async fn mark_delivered(
    order_id: i64,
    payment_reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET
                status = 'Delivered',
                payment_status = 'Paid',
                payment_reference = $1,
                delivered_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(payment_reference)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    order.ok_or_else(|| PaymentGatewayError::DatabaseError(format!("Order id {order_id} vanished mid-transaction")))
}

/// Cancels the order if (and only if) it is still `Pending` or `Confirmed`. Returns `None`
/// if the order was in any other state.
pub(crate) async fn cancel_order(
    order_number: &OrderNumber,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET
                status = 'Cancelled',
                cancelled_at = CURRENT_TIMESTAMP,
                cancellation_reason = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_number = $2 AND status IN ('Pending', 'Confirmed')
            RETURNING *;
        "#,
    )
    .bind(reason)
    .bind(order_number.as_str())
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("📝️ Order {} cancelled. Reason: {reason}", o.order_number);
    }
    Ok(order)
}

/// Marks the order's payment summary as refunded locally (cancellation of a paid order).
pub(crate) async fn mark_payment_status_refunded(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET payment_status = 'Refunded', updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Moves a `Delivered` order to `Refunded`. Returns `None` if the order was not `Delivered`.
pub(crate) async fn mark_refunded(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET
                status = 'Refunded',
                payment_status = 'Refunded',
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'Delivered'
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await
}
