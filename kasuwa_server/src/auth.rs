//! Access token issuance and validation.
//!
//! Login exchanges an email/password pair for a short-lived JWT (HMAC-SHA256). The claims carry
//! the user id, email and role list, so authorization decisions never need a database round trip.
//! [`JwtClaims`] implements `FromRequest` and can be used directly as a handler parameter; routes
//! wrapped in the ACL middleware get the decoded claims from the request extensions instead.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kasuwa_engine::db_types::{Role, User};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user's database id.
    pub sub: i64,
    pub email: String,
    pub roles: Vec<Role>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    // The ACL middleware stores validated claims in the request extensions.
    if let Some(claims) = req.extensions().get::<JwtClaims>() {
        return Ok(claims.clone());
    }
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("No token issuer is registered on the app".to_string()))?;
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::ValidationError("No access token was provided".to_string()))?;
    let token = bearer_token(header.to_str().unwrap_or_default())?;
    issuer.validate_token(token)
}

pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))
}

//-------------------------------------------------  TokenIssuer  -----------------------------------------------------
/// Signs and validates access tokens with the configured symmetric secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: config.token_ttl,
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String, ServerError> {
        let exp = (Utc::now() + self.ttl).timestamp();
        let claims = JwtClaims { sub: user.id, email: user.email.clone(), roles: user.roles.roles(), exp };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::BackendError(format!("Could not sign access token. {e}")))?;
        debug!("🔐️ Issued access token for user {} ({})", user.id, user.email);
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, ServerError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

//-------------------------------------------------  Passwords  -------------------------------------------------------
pub fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServerError::BackendError(format!("Could not hash password. {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod test {
    use kasuwa_engine::db_types::RoleList;

    use super::*;

    fn test_user() -> User {
        User {
            id: 42,
            email: "amaka@example.com".to_string(),
            display_name: "Amaka".to_string(),
            password_hash: String::default(),
            roles: RoleList::from_roles(&[Role::Customer, Role::Vendor]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip() {
        let config = AuthConfig {
            jwt_secret: ksw_common::Secret::new("a".repeat(64)),
            token_ttl: chrono::Duration::hours(1),
        };
        let issuer = TokenIssuer::new(&config);
        let token = issuer.issue_token(&test_user()).unwrap();
        let claims = issuer.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "amaka@example.com");
        assert!(claims.has_role(Role::Vendor));
        assert!(!claims.has_role(Role::Admin));
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let config_a = AuthConfig {
            jwt_secret: ksw_common::Secret::new("a".repeat(64)),
            token_ttl: chrono::Duration::hours(1),
        };
        let config_b = AuthConfig {
            jwt_secret: ksw_common::Secret::new("b".repeat(64)),
            token_ttl: chrono::Duration::hours(1),
        };
        let token = TokenIssuer::new(&config_a).issue_token(&test_user()).unwrap();
        assert!(TokenIssuer::new(&config_b).validate_token(&token).is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(bearer_token("abc.def.ghi").is_err());
        assert!(bearer_token("Bearer ").is_err());
    }

    #[test]
    fn password_hashing_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
