//! User profile records.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use super::identity_service::AuthUser;
use crate::models::{User, UserRecord};
use crate::storage::codec::{encode, fetch_one};
use crate::storage::{Collection, DocumentStore};

/// Reads and writes `users/{id}`.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create the profile on first sign-in, or merge refreshed `email`,
    /// `displayName` and `lastLogin` into the existing one.
    pub async fn record_sign_in(&self, user: &AuthUser) -> Result<User, ServiceError> {
        let now = Utc::now();
        let existing = fetch_one::<UserRecord>(self.store.as_ref(), Collection::Users, &user.id).await?;
        let record = match existing {
            Some(stored) => {
                info!("User {} already exists, refreshing profile", user.id);
                stored
                    .record
                    .refreshed(user.email.clone(), user.display_name.clone(), now)
            }
            None => {
                info!("Adding new user {}", user.id);
                UserRecord::new(
                    user.email.clone(),
                    user.display_name.clone(),
                    user.image_url.clone(),
                    now,
                )
            }
        };
        self.store
            .set(&Collection::Users.doc(&user.id)?, encode(&record)?)
            .await?;
        Ok(User {
            id: user.id.clone(),
            record,
        })
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(fetch_one(self.store.as_ref(), Collection::Users, user_id).await?)
    }
}
