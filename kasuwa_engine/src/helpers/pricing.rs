//! Order pricing rules.
//!
//! Tax is 7.5% of the subtotal, computed in integer kobo (floor). Shipping is a flat fee per
//! method. The order total is always `subtotal + tax + shipping_fee`.
use ksw_common::Kobo;

use crate::db_types::ShippingMethod;

/// VAT rate in permille (75 = 7.5%).
pub const TAX_RATE_PERMILLE: i64 = 75;

pub fn tax_on(subtotal: Kobo) -> Kobo {
    Kobo::from(subtotal.value() * TAX_RATE_PERMILLE / 1000)
}

pub fn shipping_fee(method: ShippingMethod) -> Kobo {
    let fee = match method {
        ShippingMethod::Standard => 0,
        ShippingMethod::Express => 2500,
        ShippingMethod::SameDay => 5000,
    };
    Kobo::from(fee)
}

/// A priced order line, built from a live product read at order time.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: i64,
    pub vendor_id: i64,
    pub unit_price: Kobo,
    pub quantity: i64,
    pub download_limit: i64,
}

impl PricedLine {
    pub fn line_total(&self) -> Kobo {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub subtotal: Kobo,
    pub tax: Kobo,
    pub shipping_fee: Kobo,
    pub total: Kobo,
}

pub fn price_order(lines: &[PricedLine], method: ShippingMethod) -> OrderPricing {
    let subtotal: Kobo = lines.iter().map(PricedLine::line_total).sum();
    let tax = tax_on(subtotal);
    let shipping = shipping_fee(method);
    OrderPricing { subtotal, tax, shipping_fee: shipping, total: subtotal + tax + shipping }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(product_id: i64, unit_price: i64, quantity: i64) -> PricedLine {
        PricedLine { product_id, vendor_id: 1, unit_price: Kobo::from(unit_price), quantity, download_limit: 5 }
    }

    #[test]
    fn tax_is_floor_of_7_5_percent() {
        assert_eq!(tax_on(Kobo::from(3000)), Kobo::from(225));
        assert_eq!(tax_on(Kobo::from(1000)), Kobo::from(75));
        // 7.5% of 13 kobo is 0.975 kobo, which floors to 0
        assert_eq!(tax_on(Kobo::from(13)), Kobo::from(0));
    }

    #[test]
    fn shipping_table() {
        assert_eq!(shipping_fee(ShippingMethod::Standard), Kobo::from(0));
        assert_eq!(shipping_fee(ShippingMethod::Express), Kobo::from(2500));
        assert_eq!(shipping_fee(ShippingMethod::SameDay), Kobo::from(5000));
    }

    #[test]
    fn two_item_standard_order() {
        let lines = [line(1, 1000, 1), line(2, 2000, 1)];
        let pricing = price_order(&lines, ShippingMethod::Standard);
        assert_eq!(pricing.subtotal, Kobo::from(3000));
        assert_eq!(pricing.tax, Kobo::from(225));
        assert_eq!(pricing.shipping_fee, Kobo::from(0));
        assert_eq!(pricing.total, Kobo::from(3225));
    }

    #[test]
    fn quantities_multiply_into_subtotal() {
        let lines = [line(1, 1500, 3)];
        let pricing = price_order(&lines, ShippingMethod::Express);
        assert_eq!(pricing.subtotal, Kobo::from(4500));
        assert_eq!(pricing.tax, Kobo::from(337));
        assert_eq!(pricing.total, Kobo::from(4500 + 337 + 2500));
    }
}
