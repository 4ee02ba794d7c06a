//! JWT token generation and validation
//!
//! Tokens carry the user id and role; handlers resolve them into a
//! `Principal` before touching any store-backed component.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::principal::Role;
use crate::types::HuddleError;

/// JWT claims for Huddle tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (hex ObjectId)
    pub sub: String,
    /// Account role at token issue time
    pub role: Role,
    /// Issued-at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds)
    pub exp: u64,
}

/// Validator that signs and verifies Huddle tokens with a shared secret
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(secret: String, expiry_seconds: u64) -> Self {
        Self {
            secret,
            expiry_seconds,
        }
    }

    /// Issue a token for a user. Returns the token and its expiry timestamp.
    pub fn generate_token(&self, user_id: &str, role: Role) -> Result<(String, u64), HuddleError> {
        let now = unix_now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + self.expiry_seconds,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| HuddleError::Auth(format!("Failed to sign token: {e}")))?;

        Ok((token, claims.exp))
    }

    /// Verify a token and return its claims. Expired or tampered tokens fail.
    pub fn verify_token(&self, token: &str) -> Result<Claims, HuddleError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| HuddleError::Auth(format!("Invalid token: {e}")))
    }
}

/// Extract the bearer token from an `Authorization` header value
pub fn extract_token_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtValidator {
        JwtValidator::new("test-secret".to_string(), 3600)
    }

    #[test]
    fn test_round_trip() {
        let jwt = validator();
        let (token, exp) = jwt.generate_token("64b5f0a1c2d3e4f5a6b7c8d9", Role::User).unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "64b5f0a1c2d3e4f5a6b7c8d9");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = validator().generate_token("abc", Role::Admin).unwrap();
        let other = JwtValidator::new("other-secret".to_string(), 3600);
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token_from_header("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_token_from_header("bearer abc123"), Some("abc123"));
        assert_eq!(extract_token_from_header("Basic abc123"), None);
        assert_eq!(extract_token_from_header("Bearer "), None);
    }
}
