use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::audit::events::AuditEvent;
use crate::domain::audit::events::AuditOutcome;
use crate::domain::audit::ports::AuditPublisher;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::TokenKind;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UserClaims;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::ports::RevocationCache;
use crate::domain::auth::ports::TokenProvider;
use crate::domain::errors::AppError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;
use crate::domain::user::models::UserStatus;
use crate::domain::user::ports::UniqueFields;
use crate::domain::user::ports::UserRepository;

const REVOKED: &str = "revoked";
const WRONG_CREDENTIALS: &str = "one or more wrong credential";
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Cache key marking a refresh token as revoked.
pub fn revocation_key(refresh_token: &str) -> String {
    format!("blacklist:refresh:{}", refresh_token)
}

fn wrong_credentials() -> AppError {
    AppError::validation(WRONG_CREDENTIALS)
}

/// Orchestrates registration, login, logout and token rotation.
///
/// Stateless: every call goes through the injected collaborators.
pub struct AuthService<UR, TP, RC, PH, AP>
where
    UR: UserRepository,
    TP: TokenProvider,
    RC: RevocationCache,
    PH: PasswordHasher,
    AP: AuditPublisher,
{
    repository: Arc<UR>,
    token_provider: Arc<TP>,
    cache: Arc<RC>,
    hasher: Arc<PH>,
    audit_publisher: Arc<AP>,
    dummy_hash: OnceCell<String>,
}

impl<UR, TP, RC, PH, AP> AuthService<UR, TP, RC, PH, AP>
where
    UR: UserRepository,
    TP: TokenProvider,
    RC: RevocationCache,
    PH: PasswordHasher,
    AP: AuditPublisher,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `token_provider` - Token signing and verification
    /// * `cache` - Refresh token denylist
    /// * `hasher` - Password hashing
    /// * `audit_publisher` - Sink for login audit events
    pub fn new(
        repository: Arc<UR>,
        token_provider: Arc<TP>,
        cache: Arc<RC>,
        hasher: Arc<PH>,
        audit_publisher: Arc<AP>,
    ) -> Self {
        Self {
            repository,
            token_provider,
            cache,
            hasher,
            audit_publisher,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Publish on a detached task so login never waits on the broker.
    fn audit(&self, event: AuditEvent) {
        let publisher = Arc::clone(&self.audit_publisher);
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&event).await {
                tracing::warn!(
                    event_id = %event.event_id,
                    actor_id = %event.actor_id,
                    error = %e,
                    "Failed to publish audit event"
                );
            }
        });
    }

    /// Spend one hash comparison on a login whose email matched nobody, so
    /// both rejections take the same time.
    async fn compare_against_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
            .await;

        match dummy {
            Ok(hash) => {
                let _ = self.hasher.compare(hash, password).await;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to prepare dummy password hash"),
        }
    }

    async fn ensure_not_revoked(&self, refresh_token: &str) -> Result<(), AppError> {
        let revoked = self
            .cache
            .exists(&revocation_key(refresh_token))
            .await
            .map_err(|e| AppError::internal("revocation check failed").with_source(e))?;

        if revoked {
            return Err(AppError::unauthorized("refresh token has been revoked"));
        }
        Ok(())
    }

    fn verify_refresh(&self, refresh_token: &str) -> Result<UserClaims, AppError> {
        let claims = self
            .token_provider
            .verify_token(refresh_token)
            .map_err(|e| AppError::unauthorized("invalid refresh token").with_source(e))?;

        if claims.kind != TokenKind::Refresh {
            return Err(AppError::unauthorized("refresh token required"));
        }
        Ok(claims)
    }
}

#[async_trait]
impl<UR, TP, RC, PH, AP> AuthServicePort for AuthService<UR, TP, RC, PH, AP>
where
    UR: UserRepository,
    TP: TokenProvider,
    RC: RevocationCache,
    PH: PasswordHasher,
    AP: AuditPublisher,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AppError> {
        let fields = UniqueFields {
            username: Some(command.username.clone()),
            email: Some(command.email.clone()),
            phone: Some(command.phone.clone()),
            exclude: None,
        };

        let conflicts = self
            .repository
            .check_conflict(&fields)
            .await
            .map_err(|e| AppError::internal("database check failed").with_source(e))?;

        if !conflicts.is_empty() {
            return Err(AppError::conflict(
                "user register failed: conflicting values",
                conflicts,
            ));
        }

        let password_hash = self.hasher.hash(command.password.expose()).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            phone: command.phone,
            password_hash,
            status: UserStatus::Active,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, "User registered");

        Ok(created)
    }

    async fn login(&self, credentials: Credentials) -> Result<TokenPair, AppError> {
        let user = match self.repository.find_by_email(&credentials.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.compare_against_dummy(&credentials.password).await;
                return Err(wrong_credentials());
            }
            Err(e) => return Err(wrong_credentials().with_source(e)),
        };

        if !user.is_active() {
            return Err(AppError::validation(
                "account suspended or inactive, contact an administrator",
            ));
        }

        let matches = self
            .hasher
            .compare(&user.password_hash, &credentials.password)
            .await?;

        if !matches {
            self.audit(AuditEvent::login(&user, AuditOutcome::Failed));
            return Err(wrong_credentials());
        }

        self.audit(AuditEvent::login(&user, AuditOutcome::Success));
        tracing::debug!(user_id = %user.id, "User logged in");

        self.token_provider.generate_token_pair(&user)
    }

    async fn logout(&self, refresh_token: &str, caller: &UserClaims) -> Result<(), AppError> {
        self.ensure_not_revoked(refresh_token).await?;

        let claims = self.verify_refresh(refresh_token)?;

        if claims.user_id != caller.user_id {
            return Err(AppError::unauthorized(
                "refresh token does not belong to the caller",
            ));
        }

        let Some(ttl) = claims.remaining_ttl(Utc::now()) else {
            return Ok(());
        };

        self.cache
            .set(&revocation_key(refresh_token), REVOKED, ttl)
            .await
            .map_err(|e| AppError::internal("failed to revoke refresh token").with_source(e))?;

        tracing::info!(user_id = %claims.user_id, "Refresh token revoked");
        Ok(())
    }

    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        self.ensure_not_revoked(refresh_token).await?;

        let claims = self.verify_refresh(refresh_token)?;

        let user = self
            .repository
            .find_by_id(&claims.user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::unauthorized("user not found or inactive"))?;

        let Some(ttl) = claims.remaining_ttl(Utc::now()) else {
            return Err(AppError::unauthorized("refresh token expired"));
        };

        // Claim the old token before issuing, so a lost race or a failed
        // issuance never leaves two usable refresh tokens.
        let claimed = self
            .cache
            .set_if_absent(&revocation_key(refresh_token), REVOKED, ttl)
            .await
            .map_err(|e| AppError::internal("failed to revoke refresh token").with_source(e))?;

        if !claimed {
            return Err(AppError::unauthorized("refresh token has been revoked"));
        }

        let pair = self
            .token_provider
            .generate_token_pair(&user)
            .map_err(|e| AppError::internal("failed to issue token pair").with_source(e))?;

        tracing::info!(user_id = %user.id, "Token pair rotated");
        Ok(pair)
    }
}
