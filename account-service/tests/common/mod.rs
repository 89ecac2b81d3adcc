#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use account_service::domain::audit::events::AuditEvent;
use account_service::domain::audit::ports::AuditPublisher;
use account_service::domain::audit::ports::EventPublisherError;
use account_service::domain::auth::ports::AuthServicePort;
use account_service::domain::auth::ports::RevocationCache;
use account_service::domain::auth::ports::TokenProvider;
use account_service::domain::auth::service::AuthService;
use account_service::domain::errors::AppError;
use account_service::domain::errors::FieldError;
use account_service::domain::user::models::UpdateUserCommand;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserFilter;
use account_service::domain::user::models::UserId;
use account_service::domain::user::models::UserStatus;
use account_service::domain::user::ports::UniqueFields;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::outbound::security::Argon2PasswordHasher;
use account_service::outbound::security::JwtTokenProvider;
use async_trait::async_trait;
use auth::EcKeyPair;
use auth::JwtHandler;
use auth::TokenIssuer;
use chrono::Utc;

const PRIVATE_KEY: &[u8] = include_bytes!("../../../auth/tests/fixtures/primary_private.pem");
const PUBLIC_KEY: &[u8] = include_bytes!("../../../auth/tests/fixtures/primary_public.pem");

/// User store backed by a map. Mirrors the unique constraints and the
/// soft-delete rules of the Postgres repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Overwrite a stored user, bypassing the service rules.
    pub fn put(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users.lock().unwrap().get(id).cloned()
    }

    fn conflicts(users: &HashMap<UserId, User>, fields: &UniqueFields) -> Vec<FieldError> {
        let exclude = fields.exclude;
        let others = move || users.values().filter(move |user| Some(user.id) != exclude);

        let mut conflicts = Vec::new();
        if let Some(username) = &fields.username {
            if others().any(|u| u.username.as_str() == username.as_str()) {
                conflicts.push(FieldError::taken("username"));
            }
        }
        if let Some(email) = &fields.email {
            if others().any(|u| u.email.as_str() == email.as_str()) {
                conflicts.push(FieldError::taken("email"));
            }
        }
        if let Some(phone) = &fields.phone {
            if others().any(|u| u.phone.as_str() == phone.as_str()) {
                conflicts.push(FieldError::taken("phone"));
            }
        }
        conflicts
    }

    fn select(&self, filter: &UserFilter, deleted: bool) -> Vec<User> {
        let users = self.users.lock().unwrap();
        let mut selected: Vec<User> = users
            .values()
            .filter(|user| user.is_deleted() == deleted && matches(user, filter))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    filter
        .username
        .as_ref()
        .map_or(true, |v| user.username.as_str() == v)
        && filter.email.as_ref().map_or(true, |v| user.email.as_str() == v)
        && filter.phone.as_ref().map_or(true, |v| user.phone.as_str() == v)
        && filter.status.map_or(true, |v| user.status == v)
        && filter.role.map_or(true, |v| user.role == v)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let fields = UniqueFields {
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            phone: Some(user.phone.clone()),
            exclude: None,
        };
        let conflicts = Self::conflicts(&users, &fields);
        if !conflicts.is_empty() {
            return Err(AppError::conflict("duplicate value", conflicts));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AppError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|user| user.email.as_str() == email && !user.is_deleted())
            .cloned())
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        Ok(self.select(filter, false))
    }

    async fn update(&self, id: &UserId, command: &UpdateUserCommand) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if let Some(username) = &command.username {
            user.username = username.clone();
        }
        if let Some(email) = &command.email {
            user.email = email.clone();
        }
        if let Some(phone) = &command.phone {
            user.phone = phone.clone();
        }
        if let Some(status) = command.status {
            user.status = status;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn soft_delete(&self, id: &UserId) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let now = Utc::now();
        user.deleted_at = Some(now);
        user.status = UserStatus::Inactive;
        user.updated_at = now;
        Ok(())
    }

    async fn restore(&self, id: &UserId) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .filter(|user| user.is_deleted())
            .ok_or_else(|| AppError::not_found("user not found in trash"))?;

        user.deleted_at = None;
        user.status = UserStatus::Active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn trash(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        Ok(self.select(filter, true))
    }

    async fn prune(&self, id: &UserId) -> Result<(), AppError> {
        self.users
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn check_conflict(&self, fields: &UniqueFields) -> Result<Vec<FieldError>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(Self::conflicts(&users, fields))
    }
}

/// Expiring key/value store with the same contract as the Redis cache.
#[derive(Default)]
pub struct InMemoryRevocationCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryRevocationCache {
    /// Remaining lifetime of a live entry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .and_then(|(_, expires)| expires.checked_duration_since(Instant::now()))
    }

    fn live(entries: &HashMap<String, (String, Instant)>, key: &str) -> bool {
        entries
            .get(key)
            .is_some_and(|(_, expires)| *expires > Instant::now())
    }
}

#[async_trait]
impl RevocationCache for InMemoryRevocationCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let entries = self.entries.lock().unwrap();
        Ok(Self::live(&entries, key))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, AppError> {
        let mut entries = self.entries.lock().unwrap();
        if Self::live(&entries, key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(true)
    }
}

/// Keeps every published audit event in memory.
#[derive(Default)]
pub struct RecordingAuditPublisher {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditPublisher {
    /// Wait until at least `count` events arrived; publishing runs on a
    /// detached task.
    pub async fn wait_for(&self, count: usize) -> Vec<AuditEvent> {
        for _ in 0..100 {
            {
                let events = self.events.lock().unwrap();
                if events.len() >= count {
                    return events.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditPublisher for RecordingAuditPublisher {
    async fn publish(&self, event: &AuditEvent) -> Result<(), EventPublisherError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn token_provider(access_ttl: chrono::Duration, refresh_ttl: chrono::Duration) -> JwtTokenProvider {
    let keys = EcKeyPair::from_pem(PRIVATE_KEY, PUBLIC_KEY).expect("Failed to load test keys");
    JwtTokenProvider::new(TokenIssuer::new(
        JwtHandler::new(keys, "account-service-test"),
        access_ttl,
        refresh_ttl,
    ))
}

/// Services wired to in-memory adapters, a cheap Argon2 hasher and the
/// real ES256 token provider.
pub struct TestContext {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub token_provider: Arc<JwtTokenProvider>,
    pub users: Arc<InMemoryUserRepository>,
    pub cache: Arc<InMemoryRevocationCache>,
    pub audit: Arc<RecordingAuditPublisher>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_ttls(chrono::Duration::minutes(15), chrono::Duration::days(7))
    }

    pub fn with_ttls(access_ttl: chrono::Duration, refresh_ttl: chrono::Duration) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let cache = Arc::new(InMemoryRevocationCache::default());
        let audit = Arc::new(RecordingAuditPublisher::default());
        let token_provider = Arc::new(token_provider(access_ttl, refresh_ttl));
        let hasher = Arc::new(Argon2PasswordHasher::new(
            auth::PasswordHasher::with_params(1024, 1, 1).expect("Invalid Argon2 params"),
        ));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&token_provider),
            Arc::clone(&cache),
            hasher,
            Arc::clone(&audit),
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&users)));

        Self {
            auth_service,
            user_service,
            token_provider,
            users,
            cache,
            audit,
        }
    }

    pub fn verify(&self, token: &str) -> account_service::domain::auth::models::UserClaims {
        self.token_provider
            .verify_token(token)
            .expect("Token should verify")
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub context: TestContext,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let context = TestContext::new();

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = AppState {
            auth_service: Arc::clone(&context.auth_service),
            user_service: Arc::clone(&context.user_service),
            token_provider: context.token_provider.clone(),
        };
        let router = create_router(state, Duration::from_secs(10));

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            context,
            api_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(self.url(path)).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user and return the response body.
    pub async fn register(&self, username: &str, email: &str, phone: &str) -> serde_json::Value {
        let response = self
            .post("/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "phone": phone,
                "password": "Secret123!"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in and return (access_token, refresh_token).
    pub async fn login(&self, email: &str) -> (String, String) {
        let response = self
            .post("/auth/login")
            .json(&serde_json::json!({ "email": email, "password": "Secret123!" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}
