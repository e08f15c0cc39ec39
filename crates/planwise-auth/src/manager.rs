//! Credential lifecycle orchestration.
//!
//! [`CredentialManager`] owns registration, login, refresh-token rotation,
//! logout, and the synchronous bearer-header check. The token store holds
//! exactly one live refresh token per user; presenting any other refresh
//! token — even a cryptographically valid one — is treated as reuse and
//! rejected.

use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::{debug, info, warn};

use planwise_core::{Identity, User, UserId};
use planwise_store::{StoreResult, TokenStore, UserStore};

use crate::error::{AuthError, AuthResult, AuthzError, TokenFault};
use crate::password::{hash_password, verify_password};
use crate::token::TokenSigner;

/// Key prefix for stored refresh tokens: one entry per user.
const REFRESH_KEY_PREFIX: &str = "refreshToken:";

fn refresh_key(user_id: UserId) -> String {
    format!("{REFRESH_KEY_PREFIX}{user_id}")
}

/// Credential tuning knobs: signing secrets, token lifetimes, and the store
/// call timeout.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub store_timeout: StdDuration,
}

impl AuthConfig {
    /// Creates a config with the given secrets and default lifetimes:
    /// 15 minutes for access tokens, 7 days for refresh tokens.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            store_timeout: StdDuration::from_secs(5),
        }
    }

    /// Builder: set the access token lifetime.
    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Builder: set the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// Builder: set the store operation timeout.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// The two tokens handed out on login and refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates the credential lifecycle over user and token stores.
pub struct CredentialManager<U, T> {
    users: U,
    tokens: T,
    signer: TokenSigner,
    config: AuthConfig,
}

impl<U: UserStore, T: TokenStore> CredentialManager<U, T> {
    /// Creates a manager over the given stores.
    pub fn new(users: U, tokens: T, config: AuthConfig) -> Self {
        let signer = TokenSigner::new(
            &config.access_secret,
            &config.refresh_secret,
            config.access_ttl,
            config.refresh_ttl,
        );
        Self {
            users,
            tokens,
            signer,
            config,
        }
    }

    async fn store_call<V>(&self, fut: impl Future<Output = StoreResult<V>>) -> AuthResult<V> {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::unavailable("store operation timed out")),
        }
    }

    fn refresh_store_ttl(&self) -> StdDuration {
        self.config.refresh_ttl.to_std().unwrap_or(StdDuration::ZERO)
    }

    /// Creates an account. The email must not already be registered; the
    /// password is stored only as an Argon2 hash.
    pub async fn register(&self, registration: Registration) -> AuthResult<User> {
        let existing = self
            .store_call(self.users.find_user_by_email(&registration.email))
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = hash_password(&registration.password)?;
        let user = User::new(
            registration.firstname,
            registration.lastname,
            registration.email,
            hash,
        );
        let user = self.store_call(self.users.insert_user(user)).await?;
        info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Verifies the credentials and issues a fresh token pair, storing the
    /// refresh token as the user's single live one. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        let user = self
            .store_call(self.users.find_user_by_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id, &user.email).await?;
        info!(user_id = %user.id, "logged in");
        Ok(pair)
    }

    /// Rotates the refresh token: verifies the presented one, checks it is
    /// byte-identical to the stored live token, then issues and stores a new
    /// pair. The old refresh token is dead the moment this returns.
    ///
    /// A valid-but-superseded token is rejected as reuse. A valid token for
    /// an account that no longer exists revokes the stored entry and fails.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self
            .signer
            .verify_refresh(refresh_token)
            .map_err(AuthError::InvalidToken)?;

        let key = refresh_key(claims.sub);
        let stored = self.store_call(self.tokens.get(&key)).await?;
        match stored {
            Some(live) if live == refresh_token => {}
            _ => {
                warn!(user_id = %claims.sub, "refresh token reuse detected");
                return Err(AuthError::InvalidToken(TokenFault::Reused));
            }
        }

        let user = self.store_call(self.users.find_user(claims.sub)).await?;
        let Some(user) = user else {
            self.store_call(self.tokens.delete(&key)).await?;
            return Err(AuthError::NotFound);
        };

        let pair = self.issue_pair(user.id, &user.email).await?;
        debug!(user_id = %user.id, "rotated refresh token");
        Ok(pair)
    }

    /// Revokes the caller's stored refresh token. Idempotent: logging out
    /// twice is not an error.
    pub async fn logout(&self, actor: &Identity) -> AuthResult<()> {
        let removed = self
            .store_call(self.tokens.delete(&refresh_key(actor.user_id)))
            .await?;
        info!(user_id = %actor.user_id, removed, "logged out");
        Ok(())
    }

    /// Checks a bearer authorization header and extracts the caller
    /// identity. Purely local: verifies the signature and expiry, no store
    /// access.
    pub fn authorize(&self, header: Option<&str>) -> Result<Identity, AuthzError> {
        let header = header.ok_or(AuthzError::MissingHeader)?;
        let parts: Vec<&str> = header.split(' ').collect();
        let [scheme, token] = parts.as_slice() else {
            return Err(AuthzError::MalformedHeader);
        };
        if *scheme != "Bearer" {
            return Err(AuthzError::WrongScheme);
        }

        let claims = self.signer.verify_access(token).map_err(|fault| match fault {
            TokenFault::Expired => AuthzError::Expired,
            _ => AuthzError::Invalid,
        })?;
        Ok(Identity::new(claims.sub, claims.email))
    }

    async fn issue_pair(&self, user_id: UserId, email: &str) -> AuthResult<TokenPair> {
        let access_token = self.signer.issue_access(user_id, email)?;
        let refresh_token = self.signer.issue_refresh(user_id, email)?;
        self.store_call(self.tokens.set(
            &refresh_key(user_id),
            &refresh_token,
            self.refresh_store_ttl(),
        ))
        .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use planwise_store::{MemoryStore, MemoryTokenStore};

    type Manager = CredentialManager<Arc<MemoryStore>, Arc<MemoryTokenStore>>;

    fn config() -> AuthConfig {
        AuthConfig::new("access-secret", "refresh-secret")
    }

    fn setup_with(config: AuthConfig) -> (Arc<MemoryStore>, Arc<MemoryTokenStore>, Manager) {
        let users = Arc::new(MemoryStore::new());
        let tokens = Arc::new(MemoryTokenStore::new());
        let manager = CredentialManager::new(Arc::clone(&users), Arc::clone(&tokens), config);
        (users, tokens, manager)
    }

    fn setup() -> (Arc<MemoryStore>, Arc<MemoryTokenStore>, Manager) {
        setup_with(config())
    }

    fn registration() -> Registration {
        Registration::new("Ada", "Lovelace", "ada@example.com", "hunter2")
    }

    async fn registered(manager: &Manager) -> User {
        manager.register(registration()).await.unwrap()
    }

    mod register {
        use super::*;

        #[tokio::test]
        async fn stores_hash_not_password() {
            let (users, _, manager) = setup();
            let user = registered(&manager).await;

            let stored = users.find_user(user.id).await.unwrap().unwrap();
            assert_ne!(stored.password_hash, "hunter2");
            assert!(stored.password_hash.starts_with("$argon2"));
        }

        #[tokio::test]
        async fn duplicate_email_is_rejected() {
            let (_, _, manager) = setup();
            registered(&manager).await;

            let err = manager
                .register(Registration::new(
                    "Other",
                    "Person",
                    "ada@example.com",
                    "different",
                ))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::EmailTaken));
        }
    }

    mod login {
        use super::*;

        #[tokio::test]
        async fn issues_a_working_pair() {
            let (_, tokens, manager) = setup();
            let user = registered(&manager).await;

            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            let identity = manager
                .authorize(Some(&format!("Bearer {}", pair.access_token)))
                .unwrap();
            assert_eq!(identity.user_id, user.id);
            assert_eq!(identity.email, "ada@example.com");

            let stored = tokens
                .get(&refresh_key(user.id))
                .await
                .unwrap()
                .expect("refresh token stored");
            assert_eq!(stored, pair.refresh_token);
        }

        #[tokio::test]
        async fn unknown_email_and_wrong_password_look_alike() {
            let (_, _, manager) = setup();
            registered(&manager).await;

            let unknown = manager
                .login("nobody@example.com", "hunter2")
                .await
                .unwrap_err();
            let wrong = manager
                .login("ada@example.com", "wrong")
                .await
                .unwrap_err();
            assert!(matches!(unknown, AuthError::InvalidCredentials));
            assert!(matches!(wrong, AuthError::InvalidCredentials));
        }
    }

    mod refresh {
        use super::*;

        #[tokio::test]
        async fn rotation_kills_the_old_token() {
            let (_, _, manager) = setup();
            registered(&manager).await;
            let first = manager.login("ada@example.com", "hunter2").await.unwrap();

            let second = manager.refresh(&first.refresh_token).await.unwrap();
            assert_ne!(second.refresh_token, first.refresh_token);

            // Replaying the rotated-out token is reuse.
            let err = manager.refresh(&first.refresh_token).await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::InvalidToken(TokenFault::Reused)
            ));

            // The rotated-in token still works.
            manager.refresh(&second.refresh_token).await.unwrap();
        }

        #[tokio::test]
        async fn garbage_token_is_malformed() {
            let (_, _, manager) = setup();
            let err = manager.refresh("not.a.jwt").await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::InvalidToken(TokenFault::Malformed)
            ));
        }

        #[tokio::test]
        async fn valid_token_with_no_stored_entry_is_reuse() {
            let (_, tokens, manager) = setup();
            let user = registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            tokens.delete(&refresh_key(user.id)).await.unwrap();

            let err = manager.refresh(&pair.refresh_token).await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::InvalidToken(TokenFault::Reused)
            ));
        }

        #[tokio::test]
        async fn deleted_account_revokes_the_stored_token() {
            let (users, tokens, manager) = setup();
            let user = registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            assert!(users.remove_user(user.id).await);

            let err = manager.refresh(&pair.refresh_token).await.unwrap_err();
            assert!(matches!(err, AuthError::NotFound));
            assert!(tokens.get(&refresh_key(user.id)).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn expired_refresh_token_is_expired() {
            let (_, _, manager) =
                setup_with(config().with_refresh_ttl(Duration::seconds(-60)));
            registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            let err = manager.refresh(&pair.refresh_token).await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::InvalidToken(TokenFault::Expired)
            ));
        }
    }

    mod logout {
        use super::*;

        #[tokio::test]
        async fn revokes_and_is_idempotent() {
            let (_, tokens, manager) = setup();
            let user = registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            let actor = Identity::new(user.id, user.email.clone());
            manager.logout(&actor).await.unwrap();
            assert!(tokens.get(&refresh_key(user.id)).await.unwrap().is_none());

            let err = manager.refresh(&pair.refresh_token).await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::InvalidToken(TokenFault::Reused)
            ));

            // Second logout is a no-op, not an error.
            manager.logout(&actor).await.unwrap();
        }
    }

    mod authorize {
        use super::*;

        #[tokio::test]
        async fn header_failure_variants() {
            let (_, _, manager) = setup();
            registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            assert_eq!(manager.authorize(None), Err(AuthzError::MissingHeader));
            assert_eq!(
                manager.authorize(Some("Bearer")),
                Err(AuthzError::MalformedHeader)
            );
            assert_eq!(
                manager.authorize(Some("Bearer a b")),
                Err(AuthzError::MalformedHeader)
            );
            assert_eq!(
                manager.authorize(Some(&format!("Basic {}", pair.access_token))),
                Err(AuthzError::WrongScheme)
            );
            assert_eq!(
                manager.authorize(Some("Bearer not.a.jwt")),
                Err(AuthzError::Invalid)
            );
            // A refresh token is not an access token.
            assert_eq!(
                manager.authorize(Some(&format!("Bearer {}", pair.refresh_token))),
                Err(AuthzError::Invalid)
            );
        }

        #[tokio::test]
        async fn expired_access_token_is_expired() {
            let (_, _, manager) =
                setup_with(config().with_access_ttl(Duration::seconds(-60)));
            registered(&manager).await;
            let pair = manager.login("ada@example.com", "hunter2").await.unwrap();

            assert_eq!(
                manager.authorize(Some(&format!("Bearer {}", pair.access_token))),
                Err(AuthzError::Expired)
            );
        }
    }
}
