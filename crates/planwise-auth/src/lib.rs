//! Credential lifecycle: registration, login, token rotation, logout, and
//! request authorization.
//!
//! Accounts are stored with Argon2 password hashes. Sessions are a pair of
//! HS256 JWTs — a short-lived access token checked locally on every request
//! and a long-lived refresh token whose single live copy per user is held in
//! a TTL'd token store. Refresh rotates the pair atomically from the
//! caller's perspective; presenting a rotated-out token is detected and
//! rejected as reuse.

pub mod error;
pub mod manager;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthResult, AuthzError, TokenFault};
pub use manager::{AuthConfig, CredentialManager, Registration, TokenPair};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};
