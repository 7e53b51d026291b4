use std::fmt;

/// A sensitive value, such as the Paystack secret key or the JWT signing secret.
///
/// The wrapped value is masked in both `Debug` and `Display` output, so a `Secret` can be
/// embedded in config structs that get logged at startup without leaking credentials.
/// Reading the value requires an explicit [`Secret::reveal`] call, which keeps accidental
/// leaks easy to spot in review.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_are_masked_in_output() {
        let key = Secret::new("sk_live_abcdef123456".to_string());
        assert_eq!(format!("{key:?}"), "****");
        assert_eq!(key.to_string(), "****");
        assert_eq!(format!("Paystack key: {key}"), "Paystack key: ****");
        assert_eq!(key.reveal(), "sk_live_abcdef123456");
    }
}
