use ksw_common::Kobo;
use thiserror::Error;

use crate::{
    db_types::{NewWithdrawal, Wallet, WalletEntry, Withdrawal},
    traits::data_objects::WalletAudit,
};

#[derive(Debug, Clone, Error)]
pub enum WalletApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No wallet exists for user {0}")]
    WalletNotFound(i64),
    #[error("Withdrawal amounts must be positive")]
    InvalidAmount,
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Kobo, available: Kobo },
    #[error("The requested withdrawal does not exist for reference {0}")]
    WithdrawalNotFound(String),
    #[error("Withdrawal {reference} is already {status}")]
    WithdrawalAlreadySettled { reference: String, status: String },
}

impl From<sqlx::Error> for WalletApiError {
    fn from(e: sqlx::Error) -> Self {
        WalletApiError::DatabaseError(e.to_string())
    }
}

/// Vendor wallets and the two-phase withdrawal flow.
///
/// A withdrawal request places a *hold*: the amount moves from the available balance to the
/// pending balance with a negative `WithdrawalHold` ledger entry. When the gateway transfer
/// settles, the hold is either finalized (pending drops) or released (funds return to the
/// available balance with a `WithdrawalReversal` entry). The available balance is at all
/// times equal to the sum of the wallet's ledger entries.
#[allow(async_fn_in_trait)]
pub trait WalletManagement {
    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, WalletApiError>;

    /// The wallet's ledger, newest first.
    async fn wallet_history(&self, user_id: i64) -> Result<Vec<WalletEntry>, WalletApiError>;

    /// Atomically holds the amount and stores a `Pending` withdrawal. Fails without touching
    /// the wallet if the amount is non-positive or exceeds the available balance.
    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<(Wallet, Withdrawal), WalletApiError>;

    /// Settles a successful transfer: drops the pending hold and marks the withdrawal
    /// `Success` with `completed_at`.
    async fn finalize_withdrawal(&self, reference: &str) -> Result<Withdrawal, WalletApiError>;

    /// Unwinds a failed transfer: the held amount returns to the available balance with a
    /// `WithdrawalReversal` entry, and the withdrawal is marked `Failed` with the reason.
    async fn fail_withdrawal(&self, reference: &str, reason: &str) -> Result<(Wallet, Withdrawal), WalletApiError>;

    async fn fetch_withdrawal_by_reference(&self, reference: &str) -> Result<Option<Withdrawal>, WalletApiError>;

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, WalletApiError>;

    /// Recomputes the ledger sum for the wallet so callers can check it against the stored
    /// available balance.
    async fn audit_wallet(&self, user_id: i64) -> Result<WalletAudit, WalletApiError>;
}
