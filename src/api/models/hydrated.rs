//! Denormalized view records assembled in memory from several collections.
//! Never stored; rebuilt on every fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;
use super::{InvitationRecord, Keyed, ModelRecord};

/// Display name and email used when a referenced record is missing.
pub const UNKNOWN: &str = "Unknown";

/// Avatar shown for members without a stored image.
pub const PLACEHOLDER_AVATAR: &str = "/assets/avatar-placeholder.svg";

/// A project member resolved against the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub id: String,
    pub role: Role,
    pub display_name: String,
    pub email: String,
    pub image_url: String,
}

/// A project with its members and models resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedProject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub members: Vec<MemberDetails>,
    pub models: Vec<Keyed<ModelRecord>>,
}

impl HydratedProject {
    pub fn member(&self, user_id: &str) -> Option<&MemberDetails> {
        self.members.iter().find(|m| m.id == user_id)
    }

    pub fn model(&self, model_id: &str) -> Option<&Keyed<ModelRecord>> {
        self.models.iter().find(|m| m.id == model_id)
    }
}

/// An invitation with sender and project names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    #[serde(flatten)]
    pub invitation: Keyed<InvitationRecord>,
    pub sender_name: String,
    pub sender_email: String,
    pub project_name: String,
}

impl InvitationDetails {
    pub fn is_pending(&self) -> bool {
        self.invitation.record.is_pending()
    }
}

/// Keep only the invitations still awaiting an answer.
pub fn pending_only(invitations: Vec<InvitationDetails>) -> Vec<InvitationDetails> {
    invitations.into_iter().filter(InvitationDetails::is_pending).collect()
}
