//! Project lifecycle: create, rename, delete (with cascade) and membership.

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ServiceError;
use super::identity_service::AuthUser;
use crate::models::{InvitationRecord, ModelRecord, Project, ProjectRecord};
use crate::storage::codec::{encode, fetch_one, fetch_where};
use crate::storage::{Collection, DocPath, DocumentStore};

/// Outcome of a cascading project delete.
///
/// The project itself is removed first; models and invitations pointing at it
/// are then removed one request each. Failures there leave orphans behind and
/// are listed here rather than undone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub project_id: String,
    pub models_deleted: Vec<String>,
    pub invitations_deleted: Vec<String>,
    pub orphaned: Vec<String>,
}

/// Writes to `projects/{id}`.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn DocumentStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a project owned by `owner`, who becomes its only member.
    pub async fn create_project(&self, owner: &AuthUser, name: &str) -> Result<Project, ServiceError> {
        let name = require_name(name, "Project")?;
        let record = ProjectRecord::new(name, owner.id.clone(), Utc::now());
        let id = self.store.create(Collection::Projects, encode(&record)?).await?;
        info!("New project {} added by {}", id, owner.id);
        Ok(Project { id, record })
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project, ServiceError> {
        load_project(self.store.as_ref(), project_id).await
    }

    /// Rename a project. Owner only.
    pub async fn rename_project(
        &self,
        actor: &AuthUser,
        project_id: &str,
        name: &str,
    ) -> Result<Project, ServiceError> {
        let name = require_name(name, "Project")?;
        let mut project = load_project(self.store.as_ref(), project_id).await?;
        require_owner(&project, actor, "rename")?;

        let now = Utc::now();
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("updatedAt".to_string(), json!(now));
        self.store.update(&Collection::Projects.doc(project_id)?, fields).await?;

        info!("Project {} renamed", project_id);
        project.record.name = name;
        project.record.updated_at = Some(now);
        Ok(project)
    }

    /// Delete a project and everything that references it. Owner only.
    pub async fn delete_project(&self, actor: &AuthUser, project_id: &str) -> Result<DeleteReport, ServiceError> {
        let store = self.store.as_ref();
        let project = load_project(store, project_id).await?;
        require_owner(&project, actor, "delete")?;

        // Collect dependents before the project disappears so a failure here
        // aborts with nothing deleted.
        let models = fetch_where::<ModelRecord>(store, Collection::Models, "projectId", project_id).await?;
        let invitations =
            fetch_where::<InvitationRecord>(store, Collection::Invitations, "projectId", project_id).await?;

        store.delete(&Collection::Projects.doc(project_id)?).await?;
        info!("Project {} deleted", project_id);

        let mut report = DeleteReport {
            project_id: project_id.to_string(),
            ..DeleteReport::default()
        };

        let model_paths = paths(Collection::Models, models.iter().map(|m| m.id.as_str()))?;
        let invitation_paths = paths(Collection::Invitations, invitations.iter().map(|i| i.id.as_str()))?;

        let model_results = join_all(model_paths.iter().map(|p| store.delete(p))).await;
        let invitation_results = join_all(invitation_paths.iter().map(|p| store.delete(p))).await;

        for (path, result) in model_paths.iter().zip(model_results) {
            match result {
                Ok(()) => report.models_deleted.push(path.key().unwrap_or_default().to_string()),
                Err(e) => {
                    error!("Error deleting {} of project {}: {}", path, project_id, e);
                    report.orphaned.push(path.to_string());
                }
            }
        }
        for (path, result) in invitation_paths.iter().zip(invitation_results) {
            match result {
                Ok(()) => report
                    .invitations_deleted
                    .push(path.key().unwrap_or_default().to_string()),
                Err(e) => {
                    error!("Error deleting {} of project {}: {}", path, project_id, e);
                    report.orphaned.push(path.to_string());
                }
            }
        }
        if !report.orphaned.is_empty() {
            warn!(
                "Project {} deleted with {} orphaned records",
                project_id,
                report.orphaned.len()
            );
        }
        Ok(report)
    }

    /// Remove `member_id` from a project. Owner only; the owner cannot be removed.
    pub async fn remove_member(
        &self,
        actor: &AuthUser,
        project_id: &str,
        member_id: &str,
    ) -> Result<(), ServiceError> {
        let project = load_project(self.store.as_ref(), project_id).await?;
        require_owner(&project, actor, "remove members from")?;
        if project.record.is_owner(member_id) {
            return Err(ServiceError::InvalidInput(
                "The project owner cannot be removed".to_string(),
            ));
        }
        if !project.record.is_member(member_id) {
            return Err(ServiceError::not_found("Member", member_id));
        }

        let path = member_path(project_id, member_id)?;
        self.store.delete(&path).await?;
        info!("Member {} removed from project {}", member_id, project_id);
        Ok(())
    }
}

/// `projects/{projectId}/members/{userId}`
pub(crate) fn member_path(project_id: &str, user_id: &str) -> Result<DocPath, ServiceError> {
    Ok(Collection::Projects
        .doc(project_id)?
        .child("members")?
        .child(user_id)?)
}

pub(crate) async fn load_project(store: &dyn DocumentStore, project_id: &str) -> Result<Project, ServiceError> {
    fetch_one::<ProjectRecord>(store, Collection::Projects, project_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project", project_id))
}

/// Load a project and check that `actor` belongs to it.
pub(crate) async fn load_project_for_member(
    store: &dyn DocumentStore,
    project_id: &str,
    actor: &AuthUser,
) -> Result<Project, ServiceError> {
    let project = load_project(store, project_id).await?;
    if !project.record.is_member(&actor.id) {
        warn!("User {} is not a member of project {}", actor.id, project_id);
        return Err(ServiceError::Forbidden(format!(
            "not a member of project '{}'",
            project_id
        )));
    }
    Ok(project)
}

fn require_owner(project: &Project, actor: &AuthUser, action: &str) -> Result<(), ServiceError> {
    if project.record.is_owner(&actor.id) {
        Ok(())
    } else {
        warn!("User {} tried to {} project {}", actor.id, action, project.id);
        Err(ServiceError::Forbidden(format!(
            "only the owner can {} this project",
            action
        )))
    }
}

pub(crate) fn require_name(name: &str, what: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} name must not be empty", what)));
    }
    Ok(name.to_string())
}

fn paths<'a>(
    collection: Collection,
    ids: impl Iterator<Item = &'a str>,
) -> Result<Vec<DocPath>, ServiceError> {
    ids.map(|id| collection.doc(id).map_err(ServiceError::from)).collect()
}
