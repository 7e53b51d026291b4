use crate::{
    db_types::{Order, OrderItem, Payment, Withdrawal},
    traits::VendorCredit,
};

#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }

    /// The distinct vendors with items in this order.
    pub fn vendor_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.items.iter().map(|i| i.vendor_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub payment: Payment,
    pub credits: Vec<VendorCredit>,
}

/// An order was cancelled by the buyer or an admin.
#[derive(Debug, Clone)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct OrderRefundedEvent {
    pub order: Order,
    pub payment: Payment,
}

/// A withdrawal's gateway transfer settled, successfully or not.
#[derive(Debug, Clone)]
pub struct WithdrawalSettledEvent {
    pub withdrawal: Withdrawal,
    pub success: bool,
}
