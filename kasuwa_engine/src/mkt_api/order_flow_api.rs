use log::*;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderItem, OrderNumber, Payment},
    events::{EventProducers, OrderAnnulledEvent, OrderCreatedEvent, OrderPaidEvent, OrderRefundedEvent},
    traits::{PaymentConfirmation, PaymentConfirmationResult, PaymentGatewayDatabase, PaymentGatewayError},
};

/// `OrderFlowApi` drives the main order lifecycle: creation, payment, cancellation and
/// refunds. Each successful state change is announced on the corresponding event channel,
/// after the database transaction has committed.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: std::fmt::Debug> std::fmt::Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    /// Prices and stores a new order. Emits an `OrderCreated` event on success.
    pub async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError> {
        let (order, items) = self.db.create_order(order).await?;
        debug!("🔄️ Order {} created for user {}. Total: {}", order.order_number, order.user_id, order.total);
        let event = OrderCreatedEvent::new(order.clone(), items.clone());
        for producer in &self.producers.order_created_producer {
            producer.publish_event(event.clone()).await;
        }
        Ok((order, items))
    }

    /// Stores a `Pending` payment against the order and moves it to `Confirmed`. Replays with
    /// the same idempotency key return the original payment without touching the database.
    pub async fn initialize_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError> {
        let payment = self.db.insert_payment(payment).await?;
        debug!("🔄️ Payment {} initialized for order id {}", payment.reference, payment.order_id);
        Ok(payment)
    }

    /// The idempotent paid transition. On a fresh confirmation, the settled order (with its
    /// vendor credits) comes back and an `OrderPaid` event goes out. If the payment was
    /// already final, the result says so and nothing is emitted.
    pub async fn confirm_payment(
        &self,
        reference: &str,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentConfirmationResult, PaymentGatewayError> {
        let result = self.db.confirm_payment(reference, confirmation).await?;
        if let PaymentConfirmationResult::Confirmed(settled) = &result {
            info!("🔄️ Order {} paid via {}", settled.order.order_number, settled.payment.reference);
            let event = OrderPaidEvent {
                order: settled.order.clone(),
                payment: settled.payment.clone(),
                credits: settled.credits.clone(),
            };
            for producer in &self.producers.order_paid_producer {
                producer.publish_event(event.clone()).await;
            }
        }
        Ok(result)
    }

    /// Records a gateway-declined charge. The order remains payable.
    pub async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Payment, PaymentGatewayError> {
        let payment = self.db.fail_payment(reference, reason).await?;
        debug!("🔄️ Payment {reference} failed: {reason}");
        Ok(payment)
    }

    /// Cancels a `Pending` or `Confirmed` order and emits an `OrderAnnulled` event.
    pub async fn cancel_order(&self, order_number: &OrderNumber, reason: &str) -> Result<Order, PaymentGatewayError> {
        let order = self.db.cancel_order(order_number, reason).await?;
        info!("🔄️ Order {order_number} cancelled");
        let event = OrderAnnulledEvent { order: order.clone(), reason: reason.to_string() };
        for producer in &self.producers.order_annulled_producer {
            producer.publish_event(event.clone()).await;
        }
        Ok(order)
    }

    /// Applies an admin refund to a delivered order and emits an `OrderRefunded` event.
    pub async fn refund_order(
        &self,
        order_number: &OrderNumber,
        refund_reference: &str,
    ) -> Result<(Order, Payment), PaymentGatewayError> {
        let (order, payment) = self.db.refund_order(order_number, refund_reference).await?;
        info!("🔄️ Order {order_number} refunded");
        let event = OrderRefundedEvent { order: order.clone(), payment: payment.clone() };
        for producer in &self.producers.order_refunded_producer {
            producer.publish_event(event.clone()).await;
        }
        Ok((order, payment))
    }
}
