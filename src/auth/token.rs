//! Token Service
//! Mission: Issue and verify signed, expiring identity tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Why a token was rejected.
///
/// Verification returns this as a value; callers branch on the variant
/// instead of catching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally broken: not a decodable token at all.
    Malformed,
    /// Past its expiry timestamp.
    Expired,
    /// Well-formed but signed with a different key.
    InvalidSignature,
    /// Any other verification failure.
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::Expired => write!(f, "token expired"),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Invalid => write!(f, "invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Stateless token issuer/verifier keyed by a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a signed token for a user. Claims carry the username as
    /// subject plus issued-at/expiry timestamps; nothing is stored
    /// server-side.
    pub fn issue(&self, user: &User) -> Result<(String, i64)> {
        let now = Utc::now();
        let expiry = now
            .checked_add_signed(Duration::seconds(self.ttl_secs))
            .context("Invalid expiry timestamp")?;

        let claims = Claims {
            sub: user.username.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        debug!(
            "Issuing token for {} expiring in {}s",
            user.username, self.ttl_secs
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to sign token")?;

        Ok((token, self.ttl_secs))
    }

    /// Verify a token against the signing key and the real clock.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock.
    ///
    /// Expiry is decided on the decoded claims before the signature is
    /// enforced, so an expired token reports `Expired` no matter which
    /// key signed it.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut unsigned = Validation::default();
        unsigned.insecure_disable_signature_validation();
        unsigned.validate_exp = false;

        let unverified =
            decode::<Claims>(token, &self.decoding_key, &unsigned).map_err(classify)?;

        if unverified.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::default();
        // Expiry was already decided against the supplied clock.
        validation.validate_exp = false;

        let verified =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(classify)?;

        Ok(verified.claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use uuid::Uuid;

    fn create_test_user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            phone: "9999999999".to_string(),
            email: "test@example.com".to_string(),
            role: Role::User,
            wallet: 0.0,
            deleted: false,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let tokens = TokenService::new("test-secret-key-12345", 3600);
        let user = create_test_user("testuser");

        let (token, expires_in) = tokens.issue(&user).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 3600);

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let tokens = TokenService::new("test-secret-key-12345", 3600);
        let user = create_test_user("ankit");

        let (token, _) = tokens.issue(&user).unwrap();

        // Immediately valid.
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "ankit");

        // 61 minutes later the 1-hour token is gone.
        let later = Utc::now() + Duration::minutes(61);
        assert_eq!(
            tokens.verify_at(&token, later).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_wrong_key_rejected_as_invalid_signature() {
        let issuer = TokenService::new("secret-one", 3600);
        let verifier = TokenService::new("secret-two", 3600);
        let user = create_test_user("testuser");

        let (token, _) = issuer.issue(&user).unwrap();
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let tokens = TokenService::new("test-secret-key-12345", 3600);
        assert_eq!(
            tokens.verify("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(tokens.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_expiry_wins_over_bad_signature() {
        let issuer = TokenService::new("secret-one", 3600);
        let verifier = TokenService::new("secret-two", 3600);
        let user = create_test_user("testuser");

        let (token, _) = issuer.issue(&user).unwrap();

        // Expired *and* signed with a foreign key: expiry is reported.
        let later = Utc::now() + Duration::hours(2);
        assert_eq!(
            verifier.verify_at(&token, later).unwrap_err(),
            TokenError::Expired
        );
    }
}
