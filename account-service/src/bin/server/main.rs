use std::sync::Arc;
use std::time::Duration;

use account_service::config::Config;
use account_service::domain::auth::service::AuthService;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::outbound::cache;
use account_service::outbound::cache::RedisRevocationCache;
use account_service::outbound::events::KafkaAuditConsumer;
use account_service::outbound::events::KafkaAuditProducer;
use account_service::outbound::repositories::PostgresAuditRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use account_service::outbound::security::Argon2PasswordHasher;
use account_service::outbound::security::JwtTokenProvider;
use auth::EcKeyPair;
use auth::JwtHandler;
use auth::TokenIssuer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        request_timeout_secs = config.server.request_timeout_secs,
        kafka_brokers = %config.kafka.brokers,
        audit_topic = %config.kafka.audit_topic,
        jwt_issuer = %config.jwt.issuer,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let redis = cache::connect(&config.redis.url).await?;

    let keys = EcKeyPair::from_files(&config.jwt.private_key_path, &config.jwt.public_key_path)?;
    let token_issuer = TokenIssuer::new(
        JwtHandler::new(keys, &config.jwt.issuer),
        chrono::Duration::seconds(config.jwt.access_ttl_secs),
        chrono::Duration::seconds(config.jwt.refresh_ttl_secs),
    );
    tracing::info!(
        access_ttl_secs = config.jwt.access_ttl_secs,
        refresh_ttl_secs = config.jwt.refresh_ttl_secs,
        "Token issuer ready"
    );

    let password_hasher = auth::PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pg_pool));
    let token_provider = Arc::new(JwtTokenProvider::new(token_issuer));
    let revocation_cache = Arc::new(RedisRevocationCache::new(redis));
    let hasher = Arc::new(Argon2PasswordHasher::new(password_hasher));
    let audit_producer = Arc::new(KafkaAuditProducer::new(&config.kafka)?);

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        Arc::clone(&token_provider),
        revocation_cache,
        hasher,
        audit_producer,
    ));
    let user_service = Arc::new(UserService::new(user_repository));

    let audit_consumer = KafkaAuditConsumer::new(&config.kafka, audit_repository)?;
    let consumer_handle = tokio::spawn(audit_consumer.start_consuming());
    tracing::info!(topic = %config.kafka.audit_topic, "Audit consumer started");

    let state = AppState {
        auth_service,
        user_service,
        token_provider,
    };
    let http_application = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_server =
        tokio::spawn(async move { axum::serve(http_listener, http_application).await });

    match tokio::try_join!(http_server, consumer_handle) {
        Ok((Ok(()), ())) => tracing::info!("Servers exited successfully"),
        Ok((Err(e), ())) => tracing::error!(error = %e, "Http server error"),
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    };

    Ok(())
}
