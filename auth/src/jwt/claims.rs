use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Purpose of a token. Access tokens authorize requests; refresh tokens
/// are only exchangeable for a new pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by access and refresh tokens.
///
/// Standard RFC 7519 claims plus the identity fields the service needs
/// for authorization (`email`, `role`) and the token type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Email of the subject at issuance
    pub email: String,

    /// Role of the subject at issuance
    pub role: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp, whole seconds)
    #[serde(deserialize_with = "numeric_date")]
    pub iat: i64,

    /// Expiration time (Unix timestamp, whole seconds)
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Token type (access or refresh)
    pub typ: TokenType,
}

impl Claims {
    /// Create claims valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique user identifier
    /// * `email` - Email address of the user
    /// * `role` - Role name of the user
    /// * `issuer` - Token issuer
    /// * `typ` - Access or refresh
    /// * `now` - Issuance instant (truncated to whole seconds)
    /// * `ttl` - Lifetime of the token
    pub fn issued_at(
        subject: impl ToString,
        email: impl ToString,
        role: impl ToString,
        issuer: impl ToString,
        typ: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            typ,
        }
    }
}

/// NumericDate values may arrive as integers or floats; floats are
/// truncated toward zero so signing and verification agree on whole seconds.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumericDate {
        Integer(i64),
        Float(f64),
    }

    match NumericDate::deserialize(deserializer)? {
        NumericDate::Integer(value) => Ok(value),
        NumericDate::Float(value) if value.is_finite() => Ok(value.trunc() as i64),
        NumericDate::Float(value) => Err(serde::de::Error::custom(format!(
            "invalid numeric date: {}",
            value
        ))),
    }
}
