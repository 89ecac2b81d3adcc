use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use crate::domain::audit::events::AuditEvent;
use crate::domain::audit::ports::AuditRepository;
use crate::domain::errors::AppError;
use crate::outbound::repositories::errors::map_sqlx_error;

pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError> {
        let payload = json!({
            "email": event.email,
            "outcome": event.outcome.as_str(),
        });

        sqlx::query(
            r#"
            INSERT INTO audit_log (event_id, event_type, actor_id, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event.event_id)
        .bind(&event.event_type)
        .bind(&event.actor_id)
        .bind(payload)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
