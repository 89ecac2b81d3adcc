use async_trait::async_trait;

use crate::domain::auth::ports::PasswordHasher;
use crate::domain::errors::AppError;

/// Argon2id hasher that keeps the CPU-bound work off the async workers.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    inner: auth::PasswordHasher,
}

impl Argon2PasswordHasher {
    pub fn new(inner: auth::PasswordHasher) -> Self {
        Self { inner }
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::internal("password hashing task failed").with_source(e)
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let hasher = self.inner.clone();
        let plaintext = plaintext.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(join_error)?
            .map_err(|e| AppError::internal("password could not be hashed").with_source(e))
    }

    async fn compare(&self, hash: &str, plaintext: &str) -> Result<bool, AppError> {
        let hasher = self.inner.clone();
        let hash = hash.to_string();
        let plaintext = plaintext.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(join_error)?
            .map_err(|e| AppError::internal("stored password hash is invalid").with_source(e))
    }
}
