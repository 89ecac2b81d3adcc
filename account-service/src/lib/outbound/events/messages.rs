use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::audit::events::AuditEvent;
use crate::domain::audit::events::AuditOutcome;

/// Serializable audit record published on the audit topic.
///
/// Infrastructure representation of [`AuditEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEventMessage {
    pub event_id: String,
    pub event_type: String,
    pub actor_id: String,
    pub payload: AuditPayload,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPayload {
    pub email: String,
    pub outcome: String,
}

impl From<&AuditEvent> for AuditEventMessage {
    fn from(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id.to_string(),
            event_type: event.event_type.clone(),
            actor_id: event.actor_id.clone(),
            payload: AuditPayload {
                email: event.email.clone(),
                outcome: event.outcome.as_str().to_string(),
            },
            occurred_at: event.occurred_at,
        }
    }
}

impl TryFrom<AuditEventMessage> for AuditEvent {
    type Error = String;

    fn try_from(message: AuditEventMessage) -> Result<Self, Self::Error> {
        let event_id = Uuid::parse_str(&message.event_id)
            .map_err(|e| format!("Invalid event_id: {}", e))?;
        let outcome = message.payload.outcome.parse::<AuditOutcome>()?;

        Ok(AuditEvent {
            event_id,
            event_type: message.event_type,
            actor_id: message.actor_id,
            email: message.payload.email,
            outcome,
            occurred_at: message.occurred_at,
        })
    }
}
