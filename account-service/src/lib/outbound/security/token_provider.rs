use auth::JwtError;
use auth::TokenIssuer;
use auth::TokenType;

use crate::domain::auth::models::TokenKind;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UserClaims;
use crate::domain::auth::ports::TokenProvider;
use crate::domain::errors::AppError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;

/// ES256 token provider backed by the `auth` crate.
pub struct JwtTokenProvider {
    issuer: TokenIssuer,
}

impl JwtTokenProvider {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

fn invalid(e: JwtError) -> AppError {
    AppError::invalid_token("invalid token").with_source(e)
}

impl TokenProvider for JwtTokenProvider {
    fn generate_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let issued = self
            .issuer
            .issue_pair(
                &user.id.to_string(),
                user.email.as_str(),
                user.role.as_str(),
            )
            .map_err(|e| AppError::internal("failed to sign token").with_source(e))?;

        Ok(TokenPair {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
        })
    }

    fn verify_token(&self, token: &str) -> Result<UserClaims, AppError> {
        let claims = self.issuer.verify(token).map_err(invalid)?;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|e| AppError::invalid_token("invalid token subject").with_source(e))?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|e| AppError::invalid_token("invalid token role").with_source(e))?;

        Ok(UserClaims {
            user_id,
            email: claims.email,
            role,
            issued_at: claims.iat,
            expires: claims.exp,
            kind: match claims.typ {
                TokenType::Access => TokenKind::Access,
                TokenType::Refresh => TokenKind::Refresh,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use auth::EcKeyPair;
    use auth::JwtHandler;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::errors::ErrorCode;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::PhoneNumber;
    use crate::domain::user::models::UserStatus;
    use crate::domain::user::models::Username;

    fn provider(private: &[u8], public: &[u8]) -> JwtTokenProvider {
        let keys = EcKeyPair::from_pem(private, public).unwrap();
        JwtTokenProvider::new(TokenIssuer::new(
            JwtHandler::new(keys, "account-service"),
            Duration::minutes(15),
            Duration::days(7),
        ))
    }

    fn primary() -> JwtTokenProvider {
        provider(
            include_bytes!("../../../../../auth/tests/fixtures/primary_private.pem"),
            include_bytes!("../../../../../auth/tests/fixtures/primary_public.pem"),
        )
    }

    fn secondary() -> JwtTokenProvider {
        provider(
            include_bytes!("../../../../../auth/tests/fixtures/secondary_private.pem"),
            include_bytes!("../../../../../auth/tests/fixtures/secondary_public.pem"),
        )
    }

    fn admin() -> User {
        User {
            id: UserId::new(),
            username: Username::new("root".to_string()).unwrap(),
            email: EmailAddress::new("root@x.com".to_string()).unwrap(),
            phone: PhoneNumber::new("+15550001".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            status: UserStatus::Active,
            role: UserRole::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let provider = primary();
        let user = admin();

        let pair = provider.generate_token_pair(&user).unwrap();
        let claims = provider.verify_token(&pair.access_token).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "root@x.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.expires - claims.issued_at, 15 * 60);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let provider = primary();

        let pair = provider.generate_token_pair(&admin()).unwrap();
        let claims = provider.verify_token(&pair.refresh_token).unwrap();

        assert_eq!(claims.expires - claims.issued_at, 7 * 24 * 60 * 60);
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_foreign_key_pair_is_invalid_token() {
        let pair = secondary().generate_token_pair(&admin()).unwrap();

        let err = primary().verify_token(&pair.access_token).unwrap_err();
        assert!(err.is(ErrorCode::InvalidToken));
    }

    #[test]
    fn test_malformed_token_is_invalid_token() {
        let err = primary().verify_token("not.a.token").unwrap_err();
        assert!(err.is(ErrorCode::InvalidToken));
    }
}
