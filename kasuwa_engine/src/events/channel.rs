//! The channel plumbing underneath the event hooks.
//!
//! Each event type gets its own mpsc channel. The consuming side wraps a single async
//! callback; the producing side is a cheap clonable handle that the APIs hold on to. Handlers
//! run as spawned tasks so a slow notification write never blocks the receive loop, and the
//! loop drains all in-flight handlers before shutting down.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Consumes events until every producer has been dropped, then waits for any handlers
    /// that are still running.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Without this, our own sender would keep the channel open forever
        drop(self.sender);
        let mut inflight = JoinSet::new();
        while let Some(event) = self.listener.recv().await {
            trace!("📬️ Dispatching event");
            let handler = Arc::clone(&self.handler);
            inflight.spawn(async move {
                (handler)(event).await;
            });
        }
        debug!("📬️ All producers gone. Draining {} in-flight handler(s)", inflight.len());
        while let Some(result) = inflight.join_next().await {
            if let Err(e) = result {
                warn!("📬️ An event handler task failed: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::Utc;
    use ksw_common::Kobo;

    use super::*;
    use crate::{
        db_types::{Withdrawal, WithdrawalStatus},
        events::WithdrawalSettledEvent,
    };

    fn settled(amount: i64, success: bool) -> WithdrawalSettledEvent {
        let status = if success { WithdrawalStatus::Success } else { WithdrawalStatus::Failed };
        let withdrawal = Withdrawal {
            id: 1,
            user_id: 42,
            reference: format!("WDL-{amount}"),
            amount: Kobo::from(amount),
            status,
            bank_name: "Zenith Bank".to_string(),
            account_number: "0123456789".to_string(),
            account_name: "Bayo Digital Goods".to_string(),
            failure_reason: (!success).then(|| "Transfer failed".to_string()),
            completed_at: success.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        WithdrawalSettledEvent { withdrawal, success }
    }

    #[tokio::test]
    async fn slow_handlers_finish_before_shutdown() {
        let _ = env_logger::try_init();
        let paid_out = Arc::new(AtomicI64::new(0));
        let tally = paid_out.clone();
        let handler: Handler<WithdrawalSettledEvent> = Arc::new(move |ev: WithdrawalSettledEvent| {
            let tally = tally.clone();
            Box::pin(async move {
                // Slow enough that the handler outlives the producers
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                if ev.success {
                    tally.fetch_add(ev.withdrawal.amount.value(), Ordering::SeqCst);
                }
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(2, handler);
        let producer_a = event_handler.subscribe();
        let producer_b = event_handler.subscribe();
        tokio::spawn(async move {
            producer_a.publish_event(settled(50_000, true)).await;
            producer_a.publish_event(settled(25_000, false)).await;
        });
        tokio::spawn(async move {
            producer_b.publish_event(settled(150_000, true)).await;
        });

        event_handler.start_handler().await;
        // Failed transfers restore the hold and pay nothing out
        assert_eq!(paid_out.load(Ordering::SeqCst), 200_000);
    }
}
