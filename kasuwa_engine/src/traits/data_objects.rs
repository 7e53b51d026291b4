use chrono::{DateTime, Utc};
use ksw_common::Kobo;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, Payment, Wallet};

/// The gateway-confirmed details applied to a payment when it transitions to `Success`.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfirmation {
    pub channel: Option<String>,
    pub gateway_response: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// The outcome of [`confirm_payment`](crate::traits::PaymentGatewayDatabase::confirm_payment).
///
/// `AlreadyFinal` means another confirmation path (client verify or webhook) won the race, or
/// the payment had previously failed. It carries the payment as it stands and guarantees that
/// no state was modified.
#[derive(Debug, Clone)]
pub enum PaymentConfirmationResult {
    Confirmed(Box<SettledOrder>),
    AlreadyFinal(Payment),
}

/// Everything that happened inside the atomic paid transition.
#[derive(Debug, Clone)]
pub struct SettledOrder {
    pub order: Order,
    pub payment: Payment,
    pub credits: Vec<VendorCredit>,
}

/// A single vendor wallet credit made during the paid transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCredit {
    pub vendor_id: i64,
    pub wallet_id: i64,
    pub user_id: i64,
    pub amount: Kobo,
}

/// The result of reconciling a wallet's balance against its ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAudit {
    pub wallet: Wallet,
    pub ledger_total: Kobo,
}

impl WalletAudit {
    pub fn is_consistent(&self) -> bool {
        self.wallet.available_balance == self.ledger_total
    }
}
