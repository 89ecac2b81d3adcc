use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rdkafka::consumer::Consumer;
use rdkafka::consumer::StreamConsumer;
use rdkafka::error::KafkaError;
use rdkafka::ClientConfig;
use rdkafka::Message;
use thiserror::Error;

use super::messages::AuditEventMessage;
use crate::config::KafkaConfig;
use crate::domain::audit::events::AuditEvent;
use crate::domain::audit::ports::AuditRepository;

#[derive(Debug, Error)]
enum MessageProcessingError {
    #[error("Kafka consumer error: {0}")]
    KafkaError(#[from] KafkaError),

    #[error("Message has no payload")]
    NoPayload,

    #[error("Failed to deserialize event: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid audit event: {0}")]
    InvalidEvent(String),

    #[error("Failed to store audit event: {0}")]
    StorageError(String),
}

/// Kafka consumer persisting audit events to the audit log.
///
/// Malformed messages are logged and skipped.
pub struct KafkaAuditConsumer<R: AuditRepository> {
    consumer: StreamConsumer,
    repository: Arc<R>,
}

impl<R: AuditRepository> KafkaAuditConsumer<R> {
    /// Create a consumer subscribed to the audit topic.
    ///
    /// # Arguments
    /// * `config` - Kafka section of the application configuration
    /// * `repository` - Audit log storage
    pub fn new(config: &KafkaConfig, repository: Arc<R>) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.brokers,
            group_id = %config.audit_group_id,
            topic = %config.audit_topic,
            "Initializing audit consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.audit_group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[&config.audit_topic])?;

        Ok(Self {
            consumer,
            repository,
        })
    }

    /// Consume until the stream ends. Spawn on its own task.
    pub async fn start_consuming(self) {
        tracing::info!("Starting audit consumer loop");

        let mut message_stream = self.consumer.stream();

        while let Some(result) = message_stream.next().await {
            if let Err(error) = self.process_message(result).await {
                tracing::error!(error = %error, "Error processing audit event");

                if matches!(error, MessageProcessingError::KafkaError(_)) {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }

        tracing::warn!("Audit consumer loop ended");
    }

    async fn process_message(
        &self,
        result: Result<rdkafka::message::BorrowedMessage<'_>, KafkaError>,
    ) -> Result<(), MessageProcessingError> {
        let message = result?;
        let payload = message.payload().ok_or(MessageProcessingError::NoPayload)?;
        let event = decode(payload)?;

        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            "Received audit event"
        );

        self.repository
            .record(&event)
            .await
            .map_err(|e| MessageProcessingError::StorageError(e.to_string()))
    }
}

fn decode(payload: &[u8]) -> Result<AuditEvent, MessageProcessingError> {
    let message = serde_json::from_slice::<AuditEventMessage>(payload)?;
    AuditEvent::try_from(message).map_err(MessageProcessingError::InvalidEvent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::events::AuditOutcome;

    #[test]
    fn test_decode_valid_payload() {
        let payload = br#"{
            "event_id": "0190c2d4-5b7e-7cc2-9a3e-1f2d3c4b5a69",
            "event_type": "USER_LOGIN",
            "actor_id": "0190c2d4-0000-7000-8000-000000000001",
            "payload": { "email": "alice@x.com", "outcome": "success" },
            "occurred_at": "2024-07-01T12:00:00Z"
        }"#;

        let event = decode(payload).unwrap();
        assert_eq!(event.event_type, "USER_LOGIN");
        assert_eq!(event.outcome, AuditOutcome::Success);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not json"),
            Err(MessageProcessingError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_event_id() {
        let payload = br#"{
            "event_id": "nope",
            "event_type": "USER_LOGIN",
            "actor_id": "x",
            "payload": { "email": "alice@x.com", "outcome": "success" },
            "occurred_at": "2024-07-01T12:00:00Z"
        }"#;

        assert!(matches!(
            decode(payload),
            Err(MessageProcessingError::InvalidEvent(_))
        ));
    }
}
