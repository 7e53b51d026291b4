use ksw_common::Kobo;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Wallet, WalletEntry, WalletEntryType};

pub async fn create_wallet(user_id: i64, conn: &mut SqliteConnection) -> Result<Wallet, sqlx::Error> {
    sqlx::query_as("INSERT INTO wallets (user_id) VALUES ($1) RETURNING *").bind(user_id).fetch_one(conn).await
}

pub async fn wallet_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Wallet>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM wallets WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn insert_entry(
    wallet_id: i64,
    entry_type: WalletEntryType,
    amount: Kobo,
    reference: &str,
    note: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<WalletEntry, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO wallet_entries (wallet_id, entry_type, amount, reference, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(wallet_id)
    .bind(entry_type.to_string())
    .bind(amount.value())
    .bind(reference)
    .bind(note)
    .fetch_one(conn)
    .await
}

pub async fn entries_for_wallet(wallet_id: i64, conn: &mut SqliteConnection) -> Result<Vec<WalletEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM wallet_entries WHERE wallet_id = $1 ORDER BY id DESC")
        .bind(wallet_id)
        .fetch_all(conn)
        .await
}

/// The sum of every ledger entry for the wallet. Must equal `available_balance` at all times.
pub async fn ledger_total(wallet_id: i64, conn: &mut SqliteConnection) -> Result<Kobo, sqlx::Error> {
    let total: (i64,) = sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM wallet_entries WHERE wallet_id = $1")
        .bind(wallet_id)
        .fetch_one(conn)
        .await?;
    Ok(Kobo::from(total.0))
}

/// Credits a vendor's wallet for an order earning. The balance update and the matching ledger
/// entry happen on the same connection, so callers run this inside the paid transaction.
pub(crate) async fn credit_earnings(
    user_id: i64,
    amount: Kobo,
    reference: &str,
    note: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, sqlx::Error> {
    let wallet: Option<Wallet> = sqlx::query_as(
        r#"
            UPDATE wallets SET
                available_balance = available_balance + $1,
                total_earnings = total_earnings + $1,
                this_month = this_month + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(wallet) = wallet else {
        return Ok(None);
    };
    insert_entry(wallet.id, WalletEntryType::OrderEarning, amount, reference, note, conn).await?;
    debug!("🗃️ Credited {amount} to wallet {} ({reference})", wallet.id);
    Ok(Some(wallet))
}

/// Moves `amount` from available to pending, but only if the available balance covers it.
/// Returns `None` on insufficient funds (nothing is written in that case).
pub(crate) async fn hold_for_withdrawal(
    user_id: i64,
    amount: Kobo,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, sqlx::Error> {
    let wallet: Option<Wallet> = sqlx::query_as(
        r#"
            UPDATE wallets SET
                available_balance = available_balance - $1,
                pending_balance = pending_balance + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2 AND available_balance >= $1
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(wallet) = wallet else {
        return Ok(None);
    };
    insert_entry(wallet.id, WalletEntryType::WithdrawalHold, -amount, reference, None, conn).await?;
    Ok(Some(wallet))
}

/// Clears the pending hold after a successful payout. The money has left the platform, so
/// nothing returns to the available balance.
pub(crate) async fn settle_hold(user_id: i64, amount: Kobo, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            UPDATE wallets SET
                pending_balance = pending_balance - $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2;
        "#,
    )
    .bind(amount.value())
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns a failed withdrawal's hold to the available balance, with a reversal ledger entry.
pub(crate) async fn release_hold(
    user_id: i64,
    amount: Kobo,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, sqlx::Error> {
    let wallet: Option<Wallet> = sqlx::query_as(
        r#"
            UPDATE wallets SET
                pending_balance = pending_balance - $1,
                available_balance = available_balance + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(wallet) = wallet else {
        return Ok(None);
    };
    insert_entry(wallet.id, WalletEntryType::WithdrawalReversal, amount, reference, None, conn).await?;
    Ok(Some(wallet))
}
