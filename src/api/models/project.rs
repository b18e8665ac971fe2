use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::enums::Role;

/// Stored project: a named container of models with a membership map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// userId -> role
    #[serde(default)]
    pub members: BTreeMap<String, Role>,
}

impl ProjectRecord {
    /// A fresh project whose only member is its owner.
    pub fn new(name: String, owner_id: String, now: DateTime<Utc>) -> Self {
        let mut members = BTreeMap::new();
        members.insert(owner_id.clone(), Role::Owner);
        Self {
            name,
            description: String::new(),
            owner_id,
            created_at: Some(now),
            updated_at: Some(now),
            members,
        }
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.members.get(user_id).copied()
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.contains_key(user_id)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}
