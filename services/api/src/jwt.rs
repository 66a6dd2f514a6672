//! JWT service for token generation and validation
//!
//! Tokens are HS256-signed with a single process-wide secret and carry the
//! account id as subject. Verification is stateless: there is no session
//! table and no revocation list, so a token stays valid until it expires
//! (or until its account disappears, which the auth middleware checks).

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Default access token lifetime: 24 hours
const DEFAULT_ACCESS_TOKEN_EXPIRY: u64 = 86_400;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token expiration time in seconds (default: 24 hours)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC signing secret (required, non-empty)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
        })
    }
}

/// Token failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed structure or unusable subject
    #[error("token is invalid")]
    Invalid,

    /// Structurally valid and correctly signed, but past its expiry
    #[error("token has expired")]
    Expired,

    /// No signing secret configured
    #[error("signing secret is missing")]
    MissingSecret,

    /// Encoding the claims failed
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID, decimal-encoded
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// The account id carried in the subject
    pub fn account_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Issue an access token for an account
    pub fn issue(&self, account_id: i64) -> Result<String, TokenError> {
        let now = now_secs()?;
        let exp = now
            .checked_add(self.config.access_token_expiry)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    /// Verify a token's signature and expiry and return its claims
    ///
    /// Account existence is not checked here.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        let claims = token_data.claims;
        claims.account_id()?;
        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

fn now_secs() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| TokenError::Signing(format!("Failed to get current time: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_expiry: 3600,
        })
        .unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service("test-secret-key-at-least-32-characters-long");

        for account_id in [1, 42, i64::MAX] {
            let token = service.issue(account_id).unwrap();
            let claims = service.verify(&token).unwrap();
            assert_eq!(claims.account_id().unwrap(), account_id);
            assert_eq!(claims.exp - claims.iat, 3600);
        }
    }

    #[test]
    fn test_expired_token_is_expired_not_invalid() {
        let service = service("test-secret-key-at-least-32-characters-long");
        let now = now_secs().unwrap();
        let token = service
            .sign(&Claims {
                sub: "7".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert_eq!(service.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_foreign_signature_is_invalid() {
        let issuer = service("secret-one-secret-one-secret-one");
        let verifier = service("secret-two-secret-two-secret-two");
        let token = issuer.issue(7).unwrap();

        assert_eq!(verifier.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_garbage_and_tampered_tokens_are_invalid() {
        let service = service("test-secret-key-at-least-32-characters-long");
        assert_eq!(service.verify("").unwrap_err(), TokenError::Invalid);
        assert_eq!(
            service.verify("not.a.token").unwrap_err(),
            TokenError::Invalid
        );

        let token = service.issue(7).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = "eyJzdWIiOiI4IiwiaWF0IjowLCJleHAiOjk5OTk5OTk5OTl9";
        parts[1] = forged_payload;
        assert_eq!(
            service.verify(&parts.join(".")).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_non_numeric_subject_is_invalid() {
        let service = service("test-secret-key-at-least-32-characters-long");
        let now = now_secs().unwrap();
        let token = service
            .sign(&Claims {
                sub: "not-a-number".to_string(),
                iat: now,
                exp: now + 60,
            })
            .unwrap();

        assert_eq!(service.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_oversized_expiry_fails_to_issue() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: u64::MAX,
        })
        .unwrap();

        assert!(matches!(service.issue(7), Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = JwtService::new(JwtConfig {
            secret: String::new(),
            access_token_expiry: 60,
        });
        assert_eq!(result.err(), Some(TokenError::MissingSecret));
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", "env-secret");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.access_token_expiry, DEFAULT_ACCESS_TOKEN_EXPIRY);

        unsafe {
            std::env::set_var("JWT_ACCESS_TOKEN_EXPIRY", "900");
        }
        assert_eq!(JwtConfig::from_env().unwrap().access_token_expiry, 900);

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
        }
        assert!(JwtConfig::from_env().is_err());
    }
}
