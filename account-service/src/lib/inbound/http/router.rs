use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::auth;
use super::handlers::health::health;
use super::handlers::users;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::TokenProvider;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub token_provider: Arc<dyn TokenProvider>,
}

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/rotate", post(auth::rotate));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/trash", get(users::trashed_users))
        .route(
            "/users/:user_id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::remove_user),
        )
        .route("/users/:user_id/restore", patch(users::restore_user))
        .route("/users/:user_id/prune", delete(users::prune_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers carry bearer tokens and stay out of the span.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let api = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api/v1", api)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::header;
    use axum::http::StatusCode;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::auth::models::Credentials;
    use crate::domain::auth::models::TokenKind;
    use crate::domain::auth::models::TokenPair;
    use crate::domain::auth::models::UserClaims;
    use crate::domain::errors::AppError;
    use crate::domain::user::models::RegisterUserCommand;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserFilter;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::UserRole;

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn register(&self, command: RegisterUserCommand) -> Result<User, AppError>;
            async fn login(&self, credentials: Credentials) -> Result<TokenPair, AppError>;
            async fn logout(&self, refresh_token: &str, caller: &UserClaims) -> Result<(), AppError>;
            async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AppError>;
        }
    }

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;
            async fn get_user(&self, id: &UserId) -> Result<User, AppError>;
            async fn update_user(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, AppError>;
            async fn remove_user(&self, id: &UserId) -> Result<(), AppError>;
            async fn restore_user(&self, id: &UserId) -> Result<User, AppError>;
            async fn trashed_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;
            async fn prune_user(&self, id: &UserId) -> Result<(), AppError>;
        }
    }

    mock! {
        pub TestTokenProvider {}

        impl TokenProvider for TestTokenProvider {
            fn generate_token_pair(&self, user: &User) -> Result<TokenPair, AppError>;
            fn verify_token(&self, token: &str) -> Result<UserClaims, AppError>;
        }
    }

    fn router(token_provider: MockTestTokenProvider) -> Router {
        let state = AppState {
            auth_service: Arc::new(MockTestAuthService::new()),
            user_service: Arc::new(MockTestUserService::new()),
            token_provider: Arc::new(token_provider),
        };
        create_router(state, Duration::from_secs(5))
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = router(MockTestTokenProvider::new())
            .oneshot(get("/api/v1/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_users_require_bearer() {
        let response = router(MockTestTokenProvider::new())
            .oneshot(get("/api/v1/users", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejected_token_never_reaches_handler() {
        let mut token_provider = MockTestTokenProvider::new();
        token_provider
            .expect_verify_token()
            .withf(|token| token == "expired")
            .times(1)
            .returning(|_| Err(AppError::invalid_token("invalid token")));

        let response = router(token_provider)
            .oneshot(get("/api/v1/users/trash", Some("expired")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_a_bearer() {
        let mut token_provider = MockTestTokenProvider::new();
        token_provider
            .expect_verify_token()
            .times(1)
            .returning(|_| {
                Ok(UserClaims {
                    user_id: UserId::new(),
                    email: "alice@x.com".to_string(),
                    role: UserRole::User,
                    issued_at: 1_000,
                    expires: i64::MAX,
                    kind: TokenKind::Refresh,
                })
            });

        let response = router(token_provider)
            .oneshot(get("/api/v1/users", Some("refresh")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
