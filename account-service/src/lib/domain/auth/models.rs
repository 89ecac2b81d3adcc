use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;

/// Login input. Never persisted; `Debug` hides the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Access tokens authorize requests; refresh tokens only rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity carried by a verified token.
///
/// Only produced by a `TokenProvider` after signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaims {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    /// Seconds since epoch
    pub issued_at: i64,
    /// Seconds since epoch
    pub expires: i64,
    pub kind: TokenKind,
}

impl UserClaims {
    /// Lifetime left at `now`, or `None` once the token has expired.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.expires - now.timestamp();
        if remaining > 0 {
            Some(Duration::from_secs(remaining as u64))
        } else {
            None
        }
    }
}

/// Signed access and refresh tokens, opaque to the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPair(***)")
    }
}
