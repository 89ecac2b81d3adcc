use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::User;

/// Result of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Failed,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Failed => "failed",
        }
    }
}

impl FromStr for AuditOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AuditOutcome::Success),
            "failed" => Ok(AuditOutcome::Failed),
            other => Err(format!("unknown audit outcome: {}", other)),
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security-relevant event recorded in the audit log.
///
/// Contains a snapshot of the actor at the time of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub actor_id: String,
    pub email: String,
    pub outcome: AuditOutcome,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub const USER_LOGIN: &'static str = "USER_LOGIN";

    /// Create a login attempt event for a known user.
    ///
    /// # Arguments
    /// * `user` - User that attempted to log in
    /// * `outcome` - Whether the credentials were accepted
    ///
    /// # Returns
    /// AuditEvent with a time-ordered event ID
    pub fn login(user: &User, outcome: AuditOutcome) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: Self::USER_LOGIN.to_string(),
            actor_id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            outcome,
            occurred_at: Utc::now(),
        }
    }
}
