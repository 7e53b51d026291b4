use ksw_common::Secret;
use log::*;

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self { api_url: "https://api.paystack.co".to_string(), secret_key: Secret::default() }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("KSW_PAYSTACK_API_URL").unwrap_or_else(|_| {
            debug!("KSW_PAYSTACK_API_URL not set, using https://api.paystack.co");
            "https://api.paystack.co".to_string()
        });
        let secret_key = Secret::new(std::env::var("KSW_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("KSW_PAYSTACK_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        Self { api_url, secret_key }
    }
}
