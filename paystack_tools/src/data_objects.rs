use chrono::{DateTime, Utc};
use ksw_common::Kobo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every Paystack response is wrapped in this envelope. `status` is the API-level
/// success flag, not the transaction status.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransactionRequest {
    pub email: String,
    /// Amount in kobo. Paystack interprets the integer in the currency's minor unit.
    pub amount: Kobo,
    pub reference: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The `data` object of `GET /transaction/verify/:reference` and of `charge.*` webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    pub id: Option<u64>,
    pub status: String,
    pub reference: String,
    pub amount: Kobo,
    pub gateway_response: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub currency: Option<String>,
}

impl TransactionData {
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    /// Transaction reference to refund.
    pub transaction: String,
    /// Amount in kobo. Omitted for a full refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Kobo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundData {
    pub id: u64,
    pub status: String,
    pub amount: Kobo,
    pub currency: Option<String>,
}

pub type ChargeEventData = TransactionData;

/// The `data` object of `transfer.*` webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferEventData {
    pub reference: String,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub amount: Option<Kobo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    ChargeSuccess,
    ChargeFailed,
    TransferSuccess,
    TransferFailed,
    RefundProcessed,
    Other,
}

/// A raw webhook delivery. `data` stays untyped until the event kind is known.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: Value,
}

impl WebhookEvent {
    pub fn kind(&self) -> WebhookEventKind {
        match self.event.as_str() {
            "charge.success" => WebhookEventKind::ChargeSuccess,
            "charge.failed" => WebhookEventKind::ChargeFailed,
            "transfer.success" => WebhookEventKind::TransferSuccess,
            "transfer.failed" | "transfer.reversed" => WebhookEventKind::TransferFailed,
            "refund.processed" => WebhookEventKind::RefundProcessed,
            _ => WebhookEventKind::Other,
        }
    }

    pub fn charge_data(&self) -> Result<ChargeEventData, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    pub fn transfer_data(&self) -> Result<TransferEventData, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_charge_success_event() {
        let payload = r#"{
            "event": "charge.success",
            "data": {
                "id": 302961,
                "status": "success",
                "reference": "PSK-lvq3n2-8kfz",
                "amount": 322500,
                "gateway_response": "Approved",
                "paid_at": "2024-05-01T10:03:22.000Z",
                "channel": "card",
                "currency": "NGN"
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::ChargeSuccess);
        let data = event.charge_data().unwrap();
        assert!(data.is_successful());
        assert_eq!(data.reference, "PSK-lvq3n2-8kfz");
        assert_eq!(data.amount, Kobo::from(322_500));
        assert_eq!(data.channel.as_deref(), Some("card"));
    }

    #[test]
    fn parse_transfer_failed_event() {
        let payload = r#"{
            "event": "transfer.failed",
            "data": {
                "reference": "WDL-lvq8zz-77ab",
                "status": "failed",
                "reason": "Insufficient balance on gateway account",
                "amount": 150000
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::TransferFailed);
        let data = event.transfer_data().unwrap();
        assert_eq!(data.reference, "WDL-lvq8zz-77ab");
        assert_eq!(data.amount, Some(Kobo::from(150_000)));
    }

    #[test]
    fn unknown_events_are_other() {
        let payload = r#"{"event": "subscription.create", "data": {}}"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::Other);
    }
}
