use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audit::events::AuditEvent;
use crate::domain::errors::AppError;

/// Errors for event publishing operations
#[derive(Debug, Clone, Error)]
pub enum EventPublisherError {
    #[error("Failed to serialize event: {0}")]
    SerializationFailed(String),

    #[error("Failed to publish event to broker: {0}")]
    PublishFailed(String),

    #[error("Connection to event broker failed: {0}")]
    ConnectionFailed(String),

    #[error("Event publishing timeout: {0}")]
    Timeout(String),
}

/// Outbound sink for audit events.
///
/// Callers treat publishing as fire-and-forget; a failure is logged and
/// never affects the audited operation.
#[async_trait]
pub trait AuditPublisher: Send + Sync + 'static {
    /// Publish an audit event.
    ///
    /// # Errors
    /// * `SerializationFailed` - Event serialization failed
    /// * `PublishFailed` - Failed to publish to broker
    /// * `Timeout` - Publishing timed out
    async fn publish(&self, event: &AuditEvent) -> Result<(), EventPublisherError>;
}

/// Durable storage for audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync + 'static {
    /// Persist an audit event. Storing the same event twice is a no-op.
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError>;
}
