//! Diagram model lifecycle: create, upload, duplicate, rename, save, export, delete.

use chrono::Utc;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use super::identity_service::AuthUser;
use super::project_service::{load_project_for_member, require_name};
use crate::diagram::{self, ExportedFile};
use crate::models::{Model, ModelRecord, ModelType};
use crate::storage::codec::{encode, fetch_one};
use crate::storage::{Collection, DocumentStore};

/// Writes to `bpmnModels/{id}`. Every operation requires membership of the
/// model's project.
#[derive(Clone)]
pub struct ModelService {
    store: Arc<dyn DocumentStore>,
}

impl ModelService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a model seeded with the skeleton document for `model_type`.
    pub async fn create_model(
        &self,
        actor: &AuthUser,
        project_id: &str,
        name: &str,
        model_type: ModelType,
    ) -> Result<Model, ServiceError> {
        let name = require_name(name, "Model")?;
        load_project_for_member(self.store.as_ref(), project_id, actor).await?;

        let xml = diagram::skeleton(model_type, &name);
        self.insert(ModelRecord::new(
            project_id.to_string(),
            actor.id.clone(),
            Some(name),
            model_type,
            xml,
            Utc::now(),
        ))
        .await
    }

    /// Create a model from an uploaded `.bpmn` or `.dmn` file.
    ///
    /// The name is the document's declared process/decision name. A document
    /// that declares none, or cannot be scanned, still becomes a model, just
    /// without a name.
    pub async fn upload_model(
        &self,
        actor: &AuthUser,
        project_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<Model, ServiceError> {
        let model_type = ModelType::from_file_name(file_name).ok_or_else(|| {
            ServiceError::InvalidInput(format!("'{}' is not a .bpmn or .dmn file", file_name))
        })?;
        load_project_for_member(self.store.as_ref(), project_id, actor).await?;

        let name = diagram::extract_declared_name(content, model_type).unwrap_or_else(|e| {
            warn!("Could not read a name from {}: {}", file_name, e);
            None
        });
        if name.is_none() {
            warn!("Uploaded file {} declares no name", file_name);
        }
        self.insert(ModelRecord::new(
            project_id.to_string(),
            actor.id.clone(),
            name,
            model_type,
            content.to_string(),
            Utc::now(),
        ))
        .await
    }

    /// Copy a model within its project; the copy is named `"<name> Copy"`.
    pub async fn duplicate_model(&self, actor: &AuthUser, model_id: &str) -> Result<Model, ServiceError> {
        let original = self.get_model(actor, model_id).await?;
        self.insert(original.record.duplicate(actor.id.clone(), Utc::now())).await
    }

    pub async fn get_model(&self, actor: &AuthUser, model_id: &str) -> Result<Model, ServiceError> {
        let model = fetch_one::<ModelRecord>(self.store.as_ref(), Collection::Models, model_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Model", model_id))?;
        load_project_for_member(self.store.as_ref(), &model.record.project_id, actor).await?;
        Ok(model)
    }

    pub async fn rename_model(&self, actor: &AuthUser, model_id: &str, name: &str) -> Result<Model, ServiceError> {
        let name = require_name(name, "Model")?;
        let mut model = self.get_model(actor, model_id).await?;
        let now = Utc::now();

        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("updatedAt".to_string(), json!(now));
        self.store.update(&Collection::Models.doc(model_id)?, fields).await?;

        info!("Model {} renamed", model_id);
        model.record.name = Some(name);
        model.record.updated_at = Some(now);
        Ok(model)
    }

    /// Overwrite the stored document with `xml_data`. Last write wins.
    pub async fn save_model(&self, actor: &AuthUser, model_id: &str, xml_data: &str) -> Result<Model, ServiceError> {
        let mut model = self.get_model(actor, model_id).await?;
        let now = Utc::now();

        let mut fields = Map::new();
        fields.insert("xmlData".to_string(), Value::String(xml_data.to_string()));
        fields.insert("updatedAt".to_string(), json!(now));
        self.store.update(&Collection::Models.doc(model_id)?, fields).await?;

        info!("Model {} saved successfully", model_id);
        model.record.xml_data = xml_data.to_string();
        model.record.updated_at = Some(now);
        Ok(model)
    }

    /// The stored document as a downloadable file, byte for byte.
    pub async fn export_model(&self, actor: &AuthUser, model_id: &str) -> Result<ExportedFile, ServiceError> {
        let model = self.get_model(actor, model_id).await?;
        Ok(diagram::export(
            &model.record.xml_data,
            model.record.model_type,
            model.record.name.as_deref(),
        ))
    }

    /// Delete a model. Only the member who created it may delete it.
    pub async fn delete_model(&self, actor: &AuthUser, model_id: &str) -> Result<(), ServiceError> {
        let model = self.get_model(actor, model_id).await?;
        if model.record.owner_id != actor.id {
            warn!("User {} tried to delete model {} owned by {}", actor.id, model_id, model.record.owner_id);
            return Err(ServiceError::Forbidden(
                "only the model's owner can delete it".to_string(),
            ));
        }
        self.store.delete(&Collection::Models.doc(model_id)?).await?;
        info!("Model {} deleted successfully", model_id);
        Ok(())
    }

    async fn insert(&self, record: ModelRecord) -> Result<Model, ServiceError> {
        let id = self.store.create(Collection::Models, encode(&record)?).await?;
        info!(
            "New {} model {} added to project {}",
            record.model_type, id, record.project_id
        );
        Ok(Model { id, record })
    }
}
