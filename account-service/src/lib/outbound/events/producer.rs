use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use thiserror::Error;

use crate::config::KafkaConfig;
use crate::domain::audit::events::AuditEvent;
use crate::domain::audit::ports::AuditPublisher;
use crate::domain::audit::ports::EventPublisherError;
use crate::outbound::events::messages::AuditEventMessage;

#[derive(Debug, Error)]
pub enum KafkaProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<KafkaProducerError> for EventPublisherError {
    fn from(err: KafkaProducerError) -> Self {
        match err {
            KafkaProducerError::SerializationError(msg) => {
                EventPublisherError::SerializationFailed(msg)
            }
            KafkaProducerError::SendError(msg) => EventPublisherError::PublishFailed(msg),
        }
    }
}

pub struct KafkaAuditProducer {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaAuditProducer {
    /// Create a new Kafka audit producer with "at least once" delivery semantics
    ///
    /// # Arguments
    /// * `config` - Kafka section of the application configuration
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `message.timeout.ms=10000`: Bounds how long a detached publish can linger
    pub fn new(config: &KafkaConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.brokers,
            topic = %config.audit_topic,
            "Initializing Kafka audit producer"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "10000")
            .set("queue.buffering.max.messages", "10000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "5")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            topic: config.audit_topic.clone(),
            timeout: Duration::from_secs(10),
        })
    }

    /// Send a payload keyed by actor so events for one user stay ordered.
    async fn send(&self, actor_id: &str, payload: &str) -> Result<(), KafkaProducerError> {
        let record = FutureRecord::to(&self.topic).key(actor_id).payload(payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(topic = %self.topic, actor_id, "Audit event published");
            })
            .map_err(|(err, _)| KafkaProducerError::SendError(err.to_string()))
    }
}

#[async_trait]
impl AuditPublisher for KafkaAuditProducer {
    async fn publish(&self, event: &AuditEvent) -> Result<(), EventPublisherError> {
        let message = AuditEventMessage::from(event);
        let payload = serde_json::to_string(&message)
            .map_err(|e| KafkaProducerError::SerializationError(e.to_string()))?;

        self.send(&event.actor_id, &payload).await.map_err(|e| {
            tracing::error!(
                event_id = %event.event_id,
                error = %e,
                "Failed to publish audit event"
            );
            e.into()
        })
    }
}
