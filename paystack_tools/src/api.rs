use std::sync::Arc;

use ksw_common::{Kobo, NAIRA_CURRENCY_CODE};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::PaystackConfig,
    data_objects::{ApiEnvelope, InitializeTransactionRequest, InitializedTransaction, RefundData, RefundRequest, TransactionData},
    PaystackApiError,
};

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            let envelope =
                response.json::<ApiEnvelope<T>>().await.map_err(|e| PaystackApiError::JsonError(e.to_string()))?;
            if !envelope.status {
                return Err(PaystackApiError::GatewayDeclined(envelope.message));
            }
            envelope.data.ok_or(PaystackApiError::JsonError("Response envelope carried no data".to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
            Err(PaystackApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Register a pending transaction with Paystack and get the checkout URL the
    /// customer must be redirected to.
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount: Kobo,
        reference: &str,
        metadata: Option<Value>,
    ) -> Result<InitializedTransaction, PaystackApiError> {
        let body = InitializeTransactionRequest {
            email: email.to_string(),
            amount,
            reference: reference.to_string(),
            currency: NAIRA_CURRENCY_CODE.to_string(),
            callback_url: None,
            metadata,
        };
        debug!("Initializing transaction {reference} for {amount}");
        let result = self
            .rest_query::<InitializedTransaction, InitializeTransactionRequest>(
                Method::POST,
                "/transaction/initialize",
                Some(body),
            )
            .await?;
        info!("Initialized transaction {reference}");
        Ok(result)
    }

    /// Ask Paystack for the authoritative state of a transaction.
    pub async fn verify_transaction(&self, reference: &str) -> Result<TransactionData, PaystackApiError> {
        let path = format!("/transaction/verify/{reference}");
        debug!("Verifying transaction {reference}");
        let result = self.rest_query::<TransactionData, ()>(Method::GET, &path, None).await?;
        info!("Verified transaction {reference}. Gateway status: {}", result.status);
        Ok(result)
    }

    pub async fn refund_transaction(&self, reference: &str, amount: Option<Kobo>) -> Result<RefundData, PaystackApiError> {
        let body = RefundRequest { transaction: reference.to_string(), amount };
        debug!("Requesting refund for transaction {reference}");
        let result = self.rest_query::<RefundData, RefundRequest>(Method::POST, "/refund", Some(body)).await?;
        info!("Refund for {reference} accepted by gateway. Status: {}", result.status);
        Ok(result)
    }
}
