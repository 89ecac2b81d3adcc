use std::time::Duration;

use async_trait::async_trait;

use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UserClaims;
use crate::domain::errors::AppError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;

/// Port for the authentication lifecycle.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated username, email, phone and password
    ///
    /// # Returns
    /// Created user with generated id and role `user`
    ///
    /// # Errors
    /// * `CONFLICT` - One field error per unique attribute already in use
    /// * `INTERNAL` - Hashing or persistence failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AppError>;

    /// Exchange credentials for a token pair.
    ///
    /// # Errors
    /// * `VALIDATION` - Unknown email or wrong password (same message for both),
    ///   or the account is not active
    async fn login(&self, credentials: Credentials) -> Result<TokenPair, AppError>;

    /// Revoke a refresh token owned by the caller.
    ///
    /// # Arguments
    /// * `refresh_token` - Refresh token to revoke
    /// * `caller` - Claims of the access token that authenticated the request
    ///
    /// # Errors
    /// * `UNAUTHORIZED` - Token already revoked, invalid, or owned by someone else
    async fn logout(&self, refresh_token: &str, caller: &UserClaims) -> Result<(), AppError>;

    /// Exchange a refresh token for a new pair. Each refresh token rotates once.
    ///
    /// # Errors
    /// * `UNAUTHORIZED` - Token revoked, already rotated, invalid, or its user is not active
    /// * `INTERNAL` - Cache or signing failure
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AppError>;
}

/// Signs and verifies token pairs.
///
/// Verification does not consult the revocation cache.
pub trait TokenProvider: Send + Sync + 'static {
    /// Issue an access and a refresh token for the user.
    ///
    /// # Errors
    /// * `INTERNAL` - Signing failed
    fn generate_token_pair(&self, user: &User) -> Result<TokenPair, AppError>;

    /// Verify signature, algorithm, issuer and expiry of a token.
    ///
    /// # Errors
    /// * `INVALID_TOKEN` - Any parse, signature, algorithm or expiry failure
    fn verify_token(&self, token: &str) -> Result<UserClaims, AppError>;
}

/// Key/value store with expiry backing the refresh token denylist.
#[async_trait]
pub trait RevocationCache: Send + Sync + 'static {
    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;

    /// Whether a live entry exists for the key.
    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Atomically store a value only if the key is absent.
    ///
    /// # Returns
    /// True if this call created the entry
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, AppError>;
}

/// Slow, salted one-way password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync + 'static {
    async fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    async fn compare(&self, hash: &str, plaintext: &str) -> Result<bool, AppError>;
}
