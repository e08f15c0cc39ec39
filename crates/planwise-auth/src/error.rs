//! Credential error types.
//!
//! [`AuthError`] covers the account and token lifecycle; [`AuthzError`]
//! covers the synchronous header check that guards authenticated calls.
//! Failure messages are deliberately coarse: login failures never say
//! whether the email or the password was wrong.

use thiserror::Error;

use planwise_store::StoreError;

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenFault {
    /// The signature was valid but the token is past its expiry.
    #[error("expired")]
    Expired,

    /// Bad signature, wrong shape, or not a token at all.
    #[error("malformed")]
    Malformed,

    /// A cryptographically valid refresh token that is no longer the
    /// current one for its user. Seen when a rotated-out token is replayed.
    #[error("superseded")]
    Reused,
}

/// Errors from the credential lifecycle.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. One variant for both, so callers
    /// cannot probe which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A presented token was rejected.
    #[error("invalid token: {0}")]
    InvalidToken(TokenFault),

    /// Registration against an email that already has an account.
    #[error("email already registered")]
    EmailTaken,

    /// The account behind a valid token no longer exists.
    #[error("user not found")]
    NotFound,

    /// A downstream store was unreachable or timed out. Retryable.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Anything unclassified, hashing failures included.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { message } => Self::Unavailable { message },
            // User and token tables carry no exclusion constraint; an
            // overlap here means a store bug.
            StoreError::Overlap { .. } | StoreError::Internal { .. } => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

/// Errors from the request authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// No authorization header was supplied.
    #[error("missing authorization header")]
    MissingHeader,

    /// The header did not split into exactly a scheme and a token.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The scheme was not `Bearer`.
    #[error("unsupported authorization scheme")]
    WrongScheme,

    /// The access token is past its expiry.
    #[error("access token expired")]
    Expired,

    /// The access token failed verification.
    #[error("invalid access token")]
    Invalid,
}
