use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ModelType;

/// Stored diagram model. `xml_data` is the editor's whole document and is
/// overwritten on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub project_id: String,
    pub owner_id: String,
    /// Absent when an uploaded file declared no process/decision name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // Records written before DMN support carry no type and are BPMN.
    #[serde(rename = "type", default)]
    pub model_type: ModelType,
    #[serde(default)]
    pub xml_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModelRecord {
    pub fn new(
        project_id: String,
        owner_id: String,
        name: Option<String>,
        model_type: ModelType,
        xml_data: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id,
            owner_id,
            name,
            model_type,
            xml_data,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Copy of this model under a new name suffix, with fresh timestamps.
    pub fn duplicate(&self, owner_id: String, now: DateTime<Utc>) -> Self {
        let name = Some(format!("{} Copy", self.name.as_deref().unwrap_or_default()));
        Self::new(
            self.project_id.clone(),
            owner_id,
            name,
            self.model_type,
            self.xml_data.clone(),
            now,
        )
    }
}
