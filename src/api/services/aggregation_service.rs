//! Project aggregation.
//!
//! Joins users, projects, models and invitations in memory into the hydrated
//! records the list views show. Nothing is cached: each call fetches again.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::ServiceError;
use crate::models::hydrated::{PLACEHOLDER_AVATAR, UNKNOWN};
use crate::models::{
    HydratedProject, InvitationDetails, InvitationRecord, MemberDetails, ModelRecord, Project,
    ProjectRecord, User, UserRecord,
};
use crate::storage::codec::{fetch_all, fetch_where};
use crate::storage::{Collection, DocumentStore, StorageError};

/// Read-side joins over the document store.
#[derive(Clone)]
pub struct ProjectAggregation {
    store: Arc<dyn DocumentStore>,
}

impl ProjectAggregation {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every project `user_id` is a member of, with members and models resolved.
    ///
    /// Order follows the store's key order. A failing users or models fetch
    /// is treated as empty; a failing projects fetch is returned as an error.
    pub async fn load_projects_for_user(&self, user_id: &str) -> Result<Vec<HydratedProject>, ServiceError> {
        let store = self.store.as_ref();
        let (users, projects, models) = tokio::join!(
            fetch_all::<UserRecord>(store, Collection::Users),
            fetch_all::<ProjectRecord>(store, Collection::Projects),
            fetch_all::<ModelRecord>(store, Collection::Models),
        );
        let projects = projects?;
        if projects.is_empty() {
            debug!("No projects available");
            return Ok(Vec::new());
        }
        let users = users_by_id(or_empty(users, Collection::Users));
        let models = or_empty(models, Collection::Models);

        Ok(projects
            .into_iter()
            .filter(|project| project.record.is_member(user_id))
            .map(|project| hydrate(project, &users, &models))
            .collect())
    }

    /// Invitations addressed to `email`, in every status, with sender and
    /// project names resolved. Addresses are stored lowercased.
    pub async fn load_invitations(&self, email: &str) -> Result<Vec<InvitationDetails>, ServiceError> {
        let store = self.store.as_ref();
        let email = email.trim().to_lowercase();
        let (invitations, users, projects) = tokio::join!(
            fetch_where::<InvitationRecord>(store, Collection::Invitations, "invitedEmail", &email),
            fetch_all::<UserRecord>(store, Collection::Users),
            fetch_all::<ProjectRecord>(store, Collection::Projects),
        );
        let invitations = invitations?;
        let users = users_by_id(or_empty(users, Collection::Users));
        let projects: HashMap<String, ProjectRecord> = or_empty(projects, Collection::Projects)
            .into_iter()
            .map(|p| (p.id, p.record))
            .collect();

        Ok(invitations
            .into_iter()
            .map(|invitation| {
                let sender = users.get(&invitation.record.sender_id);
                InvitationDetails {
                    sender_name: sender
                        .map(|u| u.display_name.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    sender_email: sender
                        .map(|u| u.email.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    project_name: projects
                        .get(&invitation.record.project_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    invitation,
                }
            })
            .collect())
    }
}

fn or_empty<T>(result: Result<Vec<T>, StorageError>, collection: Collection) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Failed to fetch {}, treating as empty: {}", collection, e);
        Vec::new()
    })
}

fn users_by_id(users: Vec<User>) -> HashMap<String, UserRecord> {
    users.into_iter().map(|u| (u.id, u.record)).collect()
}

fn hydrate(project: Project, users: &HashMap<String, UserRecord>, models: &[crate::models::Model]) -> HydratedProject {
    let members = project
        .record
        .members
        .iter()
        .map(|(member_id, role)| {
            let user = users.get(member_id);
            MemberDetails {
                id: member_id.clone(),
                role: *role,
                display_name: user
                    .map(|u| u.display_name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                email: user
                    .map(|u| u.email.clone())
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                image_url: user
                    .and_then(|u| u.image_url.clone())
                    .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
            }
        })
        .collect();

    let project_models = models
        .iter()
        .filter(|m| m.record.project_id == project.id)
        .cloned()
        .collect();

    HydratedProject {
        id: project.id,
        name: project.record.name,
        description: project.record.description,
        owner_id: project.record.owner_id,
        created_at: project.record.created_at,
        updated_at: project.record.updated_at,
        members,
        models: project_models,
    }
}
