//! Paystack webhook handling.
//!
//! Paystack delivers `charge.*` and `transfer.*` events to a single endpoint. The HMAC
//! middleware has already verified the `x-paystack-signature` header by the time the handler
//! runs, so the payload can be trusted to have come from the gateway.
//!
//! Webhooks race against the client-driven verify endpoint. Both funnel into the same
//! idempotent transitions on the backend, so a replayed or already-applied event is a no-op
//! and still gets a 200 response. Paystack retries deliveries that do not return 2xx, which is
//! exactly what we want for transient backend failures.
use actix_web::{web, HttpResponse};
use kasuwa_engine::{
    traits::{PaymentConfirmation, PaymentConfirmationResult, PaymentGatewayDatabase, WalletManagement},
    OrderFlowApi,
    WalletApi,
};
use log::*;
use paystack_tools::{ChargeEventData, TransferEventData, WebhookEvent, WebhookEventKind};

use crate::{data_objects::JsonResponse, errors::ServerError, route};

route!(paystack_webhook => Post "/paystack" impl PaymentGatewayDatabase, WalletManagement);
pub async fn paystack_webhook<B, W>(
    body: web::Json<WebhookEvent>,
    orders: web::Data<OrderFlowApi<B>>,
    wallets: web::Data<WalletApi<W>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    W: WalletManagement,
{
    let event = body.into_inner();
    debug!("🪝️ Received Paystack webhook: {}", event.event);
    match dispatch_event(event, orders.as_ref(), wallets.as_ref()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(JsonResponse::success("ok"))),
        // Backend trouble is worth a retry from Paystack's side
        Err(e @ (ServerError::BackendError(_) | ServerError::IOError(_))) => Err(e),
        // Anything else would fail identically on every redelivery, so acknowledge it
        Err(e) => {
            warn!("🪝️ Webhook handling failed permanently: {e}");
            Ok(HttpResponse::Ok().json(JsonResponse::failure(e.to_string())))
        },
    }
}

async fn dispatch_event<B, W>(
    event: WebhookEvent,
    orders: &OrderFlowApi<B>,
    wallets: &WalletApi<W>,
) -> Result<(), ServerError>
where
    B: PaymentGatewayDatabase,
    W: WalletManagement,
{
    match event.kind() {
        WebhookEventKind::ChargeSuccess => {
            let data = charge_data(&event)?;
            handle_charge_success(data, orders).await?;
        },
        WebhookEventKind::ChargeFailed => {
            let data = charge_data(&event)?;
            let reason = data.gateway_response.unwrap_or_else(|| "Charge failed".to_string());
            orders.fail_payment(&data.reference, &reason).await?;
            info!("🪝️ Payment {} marked as failed: {reason}", data.reference);
        },
        WebhookEventKind::TransferSuccess => {
            let data = transfer_data(&event)?;
            let withdrawal = wallets.finalize_withdrawal(&data.reference).await?;
            info!("🪝️ Withdrawal {} settled. {} paid out.", withdrawal.reference, withdrawal.amount);
        },
        WebhookEventKind::TransferFailed => {
            let data = transfer_data(&event)?;
            let reason = data.reason.unwrap_or_else(|| "Transfer failed".to_string());
            let (_, withdrawal) = wallets.fail_withdrawal(&data.reference, &reason).await?;
            warn!("🪝️ Withdrawal {} failed: {reason}. Hold released.", withdrawal.reference);
        },
        WebhookEventKind::RefundProcessed => {
            // Refunds are driven by the admin endpoint; the webhook is informational.
            info!("🪝️ Refund processed notification received");
        },
        WebhookEventKind::Other => {
            debug!("🪝️ Ignoring unhandled Paystack event: {}", event.event);
        },
    }
    Ok(())
}

async fn handle_charge_success<B: PaymentGatewayDatabase>(
    data: ChargeEventData,
    orders: &OrderFlowApi<B>,
) -> Result<(), ServerError> {
    let reference = data.reference.clone();
    let confirmation = PaymentConfirmation {
        channel: data.channel,
        gateway_response: data.gateway_response,
        paid_at: data.paid_at,
    };
    match orders.confirm_payment(&reference, confirmation).await? {
        PaymentConfirmationResult::Confirmed(settled) => {
            info!("🪝️ Order {} settled via webhook for payment {reference}", settled.order.order_number);
        },
        PaymentConfirmationResult::AlreadyFinal(payment) => {
            debug!("🪝️ Payment {reference} was already {}. Webhook replay ignored.", payment.status);
        },
    }
    Ok(())
}

fn charge_data(event: &WebhookEvent) -> Result<ChargeEventData, ServerError> {
    event.charge_data().map_err(|e| {
        warn!("🪝️ Could not deserialize charge event data. {e}");
        ServerError::CouldNotDeserializePayload
    })
}

fn transfer_data(event: &WebhookEvent) -> Result<TransferEventData, ServerError> {
    event.transfer_data().map_err(|e| {
        warn!("🪝️ Could not deserialize transfer event data. {e}");
        ServerError::CouldNotDeserializePayload
    })
}
