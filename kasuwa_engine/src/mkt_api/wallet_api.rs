use log::*;

use crate::{
    db_types::{NewWithdrawal, Wallet, WalletEntry, Withdrawal},
    events::{EventProducers, WithdrawalSettledEvent},
    traits::{WalletApiError, WalletAudit, WalletManagement},
};

/// Vendor wallets and withdrawals. Settlements (success or failure) are announced on the
/// `WithdrawalSettled` channel.
pub struct WalletApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> WalletApi<B>
where B: WalletManagement
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub async fn balance(&self, user_id: i64) -> Result<Option<Wallet>, WalletApiError> {
        self.db.fetch_wallet_for_user(user_id).await
    }

    pub async fn history(&self, user_id: i64) -> Result<Vec<WalletEntry>, WalletApiError> {
        self.db.wallet_history(user_id).await
    }

    /// Places the hold and stores the `Pending` withdrawal.
    pub async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<(Wallet, Withdrawal), WalletApiError> {
        let (wallet, withdrawal) = self.db.request_withdrawal(withdrawal).await?;
        debug!("💸️ Withdrawal {} requested. Available balance is now {}", withdrawal.reference, wallet.available_balance);
        Ok((wallet, withdrawal))
    }

    pub async fn finalize_withdrawal(&self, reference: &str) -> Result<Withdrawal, WalletApiError> {
        let withdrawal = self.db.finalize_withdrawal(reference).await?;
        let event = WithdrawalSettledEvent { withdrawal: withdrawal.clone(), success: true };
        for producer in &self.producers.withdrawal_settled_producer {
            producer.publish_event(event.clone()).await;
        }
        Ok(withdrawal)
    }

    pub async fn fail_withdrawal(&self, reference: &str, reason: &str) -> Result<(Wallet, Withdrawal), WalletApiError> {
        let (wallet, withdrawal) = self.db.fail_withdrawal(reference, reason).await?;
        let event = WithdrawalSettledEvent { withdrawal: withdrawal.clone(), success: false };
        for producer in &self.producers.withdrawal_settled_producer {
            producer.publish_event(event.clone()).await;
        }
        Ok((wallet, withdrawal))
    }

    pub async fn withdrawal_by_reference(&self, reference: &str) -> Result<Option<Withdrawal>, WalletApiError> {
        self.db.fetch_withdrawal_by_reference(reference).await
    }

    pub async fn withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, WalletApiError> {
        self.db.fetch_withdrawals_for_user(user_id).await
    }

    /// Recomputes the ledger sum so callers can check the wallet's books.
    pub async fn audit(&self, user_id: i64) -> Result<WalletAudit, WalletApiError> {
        let audit = self.db.audit_wallet(user_id).await?;
        if !audit.is_consistent() {
            error!(
                "💸️ Wallet {} is inconsistent! Available balance is {} but the ledger sums to {}",
                audit.wallet.id, audit.wallet.available_balance, audit.ledger_total
            );
        }
        Ok(audit)
    }
}
