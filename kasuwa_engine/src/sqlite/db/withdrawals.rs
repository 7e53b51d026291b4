use sqlx::SqliteConnection;

use crate::db_types::{NewWithdrawal, Withdrawal};

pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO withdrawals (user_id, reference, amount, bank_name, account_number, account_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(withdrawal.user_id)
    .bind(reference)
    .bind(withdrawal.amount.value())
    .bind(withdrawal.bank_name)
    .bind(withdrawal.account_number)
    .bind(withdrawal.account_name)
    .fetch_one(conn)
    .await
}

pub async fn withdrawal_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Withdrawal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM withdrawals WHERE reference = $1").bind(reference).fetch_optional(conn).await
}

pub async fn withdrawals_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

/// Settles a `Pending` withdrawal as paid out. Returns `None` if it was not pending.
pub(crate) async fn mark_success(reference: &str, conn: &mut SqliteConnection) -> Result<Option<Withdrawal>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE withdrawals SET
                status = 'Success',
                completed_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(reference)
    .fetch_optional(conn)
    .await
}

/// Marks a `Pending` withdrawal as failed. Returns `None` if it was not pending.
pub(crate) async fn mark_failed(
    reference: &str,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Withdrawal>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE withdrawals SET
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
