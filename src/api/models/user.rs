use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored user profile, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    /// Fields written by other clients, carried through untouched on merge.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Profile for a user signing in for the first time.
    pub fn new(email: String, display_name: String, image_url: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            email,
            display_name,
            image_url,
            created_at: Some(now),
            last_login: None,
            extra: Map::new(),
        }
    }

    /// Merge a returning sign-in into the stored profile.
    pub fn refreshed(mut self, email: String, display_name: String, now: DateTime<Utc>) -> Self {
        self.email = email;
        self.display_name = display_name;
        self.last_login = Some(now);
        self
    }
}
