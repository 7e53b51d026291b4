use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment},
    traits::PaymentConfirmation,
};

/// Raw insert. Unique-key violations (reference or idempotency key) surface as database
/// errors; the caller decides how to interpret them.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, reference, idempotency_key, amount, authorization_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.reference)
    .bind(payment.idempotency_key)
    .bind(payment.amount.value())
    .bind(payment.authorization_url)
    .fetch_one(conn)
    .await
}

pub async fn payment_by_reference(reference: &str, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE reference = $1").bind(reference).fetch_optional(conn).await
}

pub async fn payment_by_idempotency_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE idempotency_key = $1").bind(key).fetch_optional(conn).await
}

pub async fn payments_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// The conditional update at the heart of the idempotent paid transition. Returns the
/// updated payment if this call won the `Pending -> Success` race, and `None` if the payment
/// was already in a final state (in which case nothing was written).
pub(crate) async fn try_mark_success(
    reference: &str,
    confirmation: &PaymentConfirmation,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Success',
                channel = $1,
                gateway_response = $2,
                paid_at = COALESCE($3, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $4 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(confirmation.channel.clone())
    .bind(confirmation.gateway_response.clone())
    .bind(confirmation.paid_at)
    .bind(reference)
    .fetch_optional(conn)
    .await
}

/// Marks a `Pending` payment as failed. Returns `None` if the payment was not pending.
pub(crate) async fn mark_failed(
    reference: &str,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Failed',
                failure_reason = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(reason)
    .bind(reference)
    .fetch_optional(conn)
    .await
}

/// Marks a `Success` payment as refunded. Returns `None` if the payment was not `Success`.
pub(crate) async fn mark_refunded(
    payment_id: i64,
    refund_reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Refunded',
                refund_reference = $1,
                refund_amount = amount,
                refunded_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'Success'
            RETURNING *;
        "#,
    )
    .bind(refund_reference)
    .bind(payment_id)
    .fetch_optional(conn)
    .await
}
