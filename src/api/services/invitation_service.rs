//! Invitation workflow: invite, accept, decline.
//!
//! `Pending -> Accepted` (grants `editor`) or `Pending -> Declined`. Terminal
//! states are final. Inviting does not check for an earlier invitation to the
//! same address; every call creates a new one.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ServiceError;
use super::identity_service::AuthUser;
use super::project_service::{load_project, load_project_for_member, member_path};
use crate::models::{Invitation, InvitationRecord, InvitationStatus, Role};
use crate::storage::codec::{encode, fetch_one};
use crate::storage::{Collection, DocPath, DocumentStore};

/// Writes to `invitations/{id}` and, on acceptance, to project membership.
#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn DocumentStore>,
}

impl InvitationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Invite `email` into a project the sender belongs to.
    pub async fn invite(&self, sender: &AuthUser, project_id: &str, email: &str) -> Result<Invitation, ServiceError> {
        let email = normalize_email(email)?;
        load_project_for_member(self.store.as_ref(), project_id, sender).await?;

        let record = InvitationRecord::new(project_id.to_string(), email, sender.id.clone(), Utc::now());
        let id = self
            .store
            .create(Collection::Invitations, encode(&record)?)
            .await
            .inspect_err(|e| error!("Error sending invitation: {}", e))?;
        info!("Invitation {} sent for project {}", id, project_id);
        Ok(Invitation { id, record })
    }

    /// Accept a pending invitation addressed to `user`.
    ///
    /// Writes the new status and the `editor` membership in one multi-path
    /// update. On a backend without atomic batches a failure can leave the
    /// invitation accepted without the membership; that surfaces as
    /// `StorageError::PartialWrite`. A user who is already a member keeps
    /// their role.
    pub async fn accept(
        &self,
        invitation_id: &str,
        project_id: &str,
        user: &AuthUser,
    ) -> Result<Invitation, ServiceError> {
        let mut invitation = self.load_for_recipient(invitation_id, user).await?;
        if invitation.record.project_id != project_id {
            return Err(ServiceError::InvalidInput(format!(
                "invitation '{}' is not for project '{}'",
                invitation_id, project_id
            )));
        }
        let status = self.next_status(&invitation, InvitationStatus::Accepted)?;
        let project = load_project(self.store.as_ref(), project_id).await?;

        let mut updates: Vec<(DocPath, Value)> = vec![(status_path(invitation_id)?, encode(&status)?)];
        if project.record.is_member(&user.id) {
            info!("User {} already belongs to project {}", user.id, project_id);
        } else {
            updates.push((member_path(project_id, &user.id)?, encode(&Role::Editor)?));
        }

        self.store
            .update_paths(updates)
            .await
            .inspect_err(|e| error!("Error accepting invitation {}: {}", invitation_id, e))?;
        info!("Invitation {} accepted and user {} added to project {}", invitation_id, user.id, project_id);

        invitation.record.status = status;
        Ok(invitation)
    }

    /// Decline a pending invitation addressed to `user`. Membership is untouched.
    pub async fn decline(&self, invitation_id: &str, user: &AuthUser) -> Result<Invitation, ServiceError> {
        let mut invitation = self.load_for_recipient(invitation_id, user).await?;
        let status = self.next_status(&invitation, InvitationStatus::Declined)?;

        self.store
            .set(&status_path(invitation_id)?, encode(&status)?)
            .await
            .inspect_err(|e| error!("Error declining invitation {}: {}", invitation_id, e))?;
        info!("Invitation {} declined", invitation_id);

        invitation.record.status = status;
        Ok(invitation)
    }

    async fn load_for_recipient(&self, invitation_id: &str, user: &AuthUser) -> Result<Invitation, ServiceError> {
        let invitation = fetch_one::<InvitationRecord>(self.store.as_ref(), Collection::Invitations, invitation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invitation", invitation_id))?;
        if !invitation.record.invited_email.eq_ignore_ascii_case(&user.email) {
            warn!("User {} tried to answer invitation {} for another address", user.id, invitation_id);
            return Err(ServiceError::Forbidden(
                "invitation is addressed to someone else".to_string(),
            ));
        }
        Ok(invitation)
    }

    fn next_status(&self, invitation: &Invitation, target: InvitationStatus) -> Result<InvitationStatus, ServiceError> {
        invitation.record.transition(target).map_err(|current| {
            ServiceError::InvalidTransition(format!(
                "invitation '{}' is already {}",
                invitation.id, current
            ))
        })
    }
}

fn status_path(invitation_id: &str) -> Result<DocPath, ServiceError> {
    Ok(Collection::Invitations.doc(invitation_id)?.child("status")?)
}

fn normalize_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(email.to_lowercase())
        }
        _ => Err(ServiceError::InvalidInput(format!("'{}' is not an email address", email))),
    }
}
