//! A thin client for the parts of the Paystack REST API that the payment server uses:
//! initializing transactions, verifying them by reference, and requesting refunds,
//! plus the webhook payload types and the HMAC-SHA512 signature check that guards them.

mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{
    ChargeEventData,
    InitializeTransactionRequest,
    InitializedTransaction,
    RefundData,
    TransactionData,
    TransferEventData,
    WebhookEvent,
    WebhookEventKind,
};
pub use error::PaystackApiError;
pub use helpers::{sign_payload, verify_signature};
