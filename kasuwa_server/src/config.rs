use std::env;

use chrono::Duration;
use ksw_common::{parse_boolean_flag, Secret};
use log::*;
use paystack_tools::PaystackConfig;
use rand::{distributions::Alphanumeric, Rng};

const DEFAULT_KSW_HOST: &str = "127.0.0.1";
const DEFAULT_KSW_PORT: u16 = 8360;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Paystack REST credentials, shared with the webhook signature check.
    pub paystack: PaystackConfig,
    /// If false, the HMAC signature on incoming Paystack webhooks is not verified. Only ever
    /// disable this for local testing.
    pub webhook_checks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_KSW_HOST.to_string(),
            port: DEFAULT_KSW_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            paystack: PaystackConfig::default(),
            webhook_checks: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("KSW_HOST").ok().unwrap_or_else(|| DEFAULT_KSW_HOST.into());
        let port = env::var("KSW_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for KSW_PORT. {e} Using the default, {DEFAULT_KSW_PORT}, instead."
                    );
                    DEFAULT_KSW_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_KSW_PORT);
        let database_url = env::var("KSW_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ KSW_DATABASE_URL is not set. Please set it to the URL for the Kasuwa database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration from environment variables. {e}");
            AuthConfig::default()
        });
        let paystack = PaystackConfig::new_from_env_or_default();
        let webhook_checks = parse_boolean_flag(env::var("KSW_PAYSTACK_WEBHOOK_CHECKS").ok(), true);
        if !webhook_checks {
            warn!("🚨️ Paystack webhook signature checks are DISABLED. Anyone can mark orders as paid.");
        }
        Self { host, port, database_url, auth, paystack, webhook_checks }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The symmetric secret used to sign and verify access tokens (HMAC-SHA256).
    pub jwt_secret: Secret<String>,
    /// How long issued access tokens remain valid.
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. All issued \
             tokens will become invalid when the server restarts. Set KSW_JWT_SECRET for production use. 🚨️🚨️🚨️"
        );
        let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, String> {
        let secret = env::var("KSW_JWT_SECRET").map_err(|e| format!("{e} [KSW_JWT_SECRET]"))?;
        if secret.len() < 32 {
            return Err("KSW_JWT_SECRET must be at least 32 characters long".to_string());
        }
        let token_ttl = env::var("KSW_JWT_TTL_HOURS")
            .map_err(|_| {
                info!("🪛️ KSW_JWT_TTL_HOURS is not set. Using the default value of {DEFAULT_TOKEN_TTL_HOURS} hrs.")
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for KSW_JWT_TTL_HOURS. {e}"))
            })
            .ok()
            .unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_TTL_HOURS));
        Ok(Self { jwt_secret: Secret::new(secret), token_ttl })
    }
}
