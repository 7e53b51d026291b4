mod pricing;
mod references;

pub use pricing::{price_order, shipping_fee, tax_on, OrderPricing, PricedLine, TAX_RATE_PERMILLE};
pub use references::{new_order_number, new_payment_reference, new_refund_reference, new_withdrawal_reference};
