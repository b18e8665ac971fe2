use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::InvitationStatus;

/// Stored invitation of an email address into a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRecord {
    pub project_id: String,
    pub invited_email: String,
    pub sender_id: String,
    pub status: InvitationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl InvitationRecord {
    pub fn new(project_id: String, invited_email: String, sender_id: String, now: DateTime<Utc>) -> Self {
        Self {
            project_id,
            invited_email,
            sender_id,
            status: InvitationStatus::Pending,
            sent_at: Some(now),
        }
    }

    /// Move to `target`. Only `Pending` may move, and only into a terminal state.
    pub fn transition(&self, target: InvitationStatus) -> Result<InvitationStatus, InvitationStatus> {
        if self.status == InvitationStatus::Pending && target.is_terminal() {
            Ok(target)
        } else {
            Err(self.status)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}
