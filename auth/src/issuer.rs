use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenType;

/// Issues and verifies access/refresh token pairs.
///
/// Both tokens carry the same identity; they differ in lifetime and in
/// their `typ` claim.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// Signed token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    /// Short-lived token for request authorization
    pub access_token: String,
    /// Long-lived token exchangeable for a new pair
    pub refresh_token: String,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `jwt_handler` - ES256 handler; its issuer is stamped on every token
    /// * `access_ttl` - Access token lifetime
    /// * `refresh_ttl` - Refresh token lifetime
    pub fn new(jwt_handler: JwtHandler, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let issuer = jwt_handler.issuer().to_string();
        Self {
            jwt_handler,
            issuer,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Sign a fresh access/refresh pair for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_pair(
        &self,
        subject: &str,
        email: &str,
        role: &str,
    ) -> Result<IssuedTokens, JwtError> {
        let now = Utc::now();

        let access = Claims::issued_at(
            subject,
            email,
            role,
            &self.issuer,
            TokenType::Access,
            now,
            self.access_ttl,
        );
        let refresh = Claims::issued_at(
            subject,
            email,
            role,
            &self.issuer,
            TokenType::Refresh,
            now,
            self.refresh_ttl,
        );

        Ok(IssuedTokens {
            access_token: self.jwt_handler.encode(&access)?,
            refresh_token: self.jwt_handler.encode(&refresh)?,
        })
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Algorithm, signature, issuer or expiry check failed
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EcKeyPair;

    fn issuer() -> TokenIssuer {
        let keys = EcKeyPair::from_pem(
            include_bytes!("../tests/fixtures/primary_private.pem"),
            include_bytes!("../tests/fixtures/primary_public.pem"),
        )
        .unwrap();

        TokenIssuer::new(
            JwtHandler::new(keys, "test"),
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let issuer = issuer();

        let tokens = issuer
            .issue_pair("user123", "alice@example.com", "user")
            .expect("Failed to issue tokens");
        assert_ne!(tokens.access_token, tokens.refresh_token);

        let access = issuer.verify(&tokens.access_token).expect("Invalid access");
        assert_eq!(access.sub, "user123");
        assert_eq!(access.email, "alice@example.com");
        assert_eq!(access.role, "user");
        assert_eq!(access.iss, "test");
        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(access.typ, TokenType::Access);

        let refresh = issuer.verify(&tokens.refresh_token).expect("Invalid refresh");
        assert_eq!(refresh.sub, "user123");
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
        assert_eq!(refresh.typ, TokenType::Refresh);
        assert_eq!(refresh.iat, access.iat);
    }

    #[test]
    fn test_consecutive_pairs_differ() {
        let issuer = issuer();

        let first = issuer.issue_pair("user123", "a@example.com", "user").unwrap();
        let second = issuer.issue_pair("user123", "a@example.com", "user").unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_verify_garbage() {
        assert!(issuer().verify("not-a-token").is_err());
    }
}
