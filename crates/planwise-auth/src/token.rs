//! JWT issuance and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with two independent
//! secrets, so a refresh token can never pass where an access token is
//! expected and vice versa. Expiry is checked with zero leeway.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use planwise_core::UserId;

use crate::error::{AuthError, AuthResult, TokenFault};

/// The payload both token kinds carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id.
    pub sub: UserId,
    pub email: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn sign(&self, sub: UserId, email: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::internal(format!("token signing failed: {err}")))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenFault> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(TokenFault::Expired),
                _ => Err(TokenFault::Malformed),
            },
        }
    }
}

/// Signs and verifies the access/refresh token pair.
///
/// TTLs are signed durations so tests can mint already-expired tokens.
pub struct TokenSigner {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenSigner {
    /// Creates a signer from the two secrets and per-kind lifetimes.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: KeyPair::new(access_secret, access_ttl),
            refresh: KeyPair::new(refresh_secret, refresh_ttl),
        }
    }

    /// Issues a short-lived access token.
    pub fn issue_access(&self, sub: UserId, email: &str) -> AuthResult<String> {
        self.access.sign(sub, email)
    }

    /// Issues a long-lived refresh token.
    pub fn issue_refresh(&self, sub: UserId, email: &str) -> AuthResult<String> {
        self.refresh.sign(sub, email)
    }

    /// Verifies an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenFault> {
        self.access.verify(token)
    }

    /// Verifies a refresh token's signature and expiry. Whether the token is
    /// still the current one for its user is the caller's concern.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenFault> {
        self.refresh.verify(token)
    }
}
