//! Generators for order numbers and payment/withdrawal/refund references.
//!
//! All formats embed a base36 timestamp plus random alphanumerics. Order numbers carry a
//! short suffix and can (rarely) collide; callers retry the insert with a fresh number.
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderNumber;

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(|c| (c as char).to_ascii_lowercase()).collect()
}

fn timestamp36() -> String {
    base36(Utc::now().timestamp_millis() as u64)
}

/// `KSW-<base36 millis>-<4 random alphanumerics>`
pub fn new_order_number() -> OrderNumber {
    OrderNumber(format!("KSW-{}-{}", timestamp36(), random_suffix(4)))
}

/// `PSK-<base36 millis><6 random alphanumerics>`
pub fn new_payment_reference() -> String {
    format!("PSK-{}{}", timestamp36(), random_suffix(6))
}

/// `WDL-<base36 millis><6 random alphanumerics>`
pub fn new_withdrawal_reference() -> String {
    format!("WDL-{}{}", timestamp36(), random_suffix(6))
}

/// `RFD-<base36 millis><6 random alphanumerics>`
pub fn new_refund_reference() -> String {
    format!("RFD-{}{}", timestamp36(), random_suffix(6))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base36_digits() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn order_number_format() {
        let n = new_order_number();
        let s = n.as_str();
        assert!(s.starts_with("KSW-"));
        let parts: Vec<&str> = s.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn reference_prefixes() {
        assert!(new_payment_reference().starts_with("PSK-"));
        assert!(new_withdrawal_reference().starts_with("WDL-"));
        assert!(new_refund_reference().starts_with("RFD-"));
    }
}
