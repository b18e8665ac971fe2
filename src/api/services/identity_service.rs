//! Identity gate.
//!
//! Wraps the identity provider's session stream and exposes "current user or
//! none" to the rest of the application. A provider error and an absent
//! session look the same from outside: unauthenticated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use super::jwt_service::{AuthError, JwtService};
use super::user_service::UserService;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// An identity provider with a session-change stream.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Complete a sign-in with the credential returned by the provider's interactive flow.
    async fn sign_in(&self, credential: &str) -> Result<AuthUser, AuthError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Stream of session changes; the current value is the live session.
    fn sessions(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Provider whose credential is a signed ID token.
pub struct TokenIdentityProvider {
    jwt: JwtService,
    session: watch::Sender<Option<AuthUser>>,
}

impl TokenIdentityProvider {
    pub fn new(jwt: JwtService) -> Self {
        let (session, _) = watch::channel(None);
        Self { jwt, session }
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    async fn sign_in(&self, credential: &str) -> Result<AuthUser, AuthError> {
        match self.jwt.verify_id_token(credential) {
            Ok(user) => {
                self.session.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.session.send_replace(None);
                Err(e)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.send_replace(None);
        Ok(())
    }

    fn sessions(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }
}

/// Gate in front of the identity provider.
///
/// On every successful sign-in the user's profile record is created or
/// refreshed; failures there are logged and do not block the session.
pub struct IdentityGate<P: IdentityProvider> {
    provider: P,
    users: UserService,
    sessions: watch::Receiver<Option<AuthUser>>,
}

impl<P: IdentityProvider> IdentityGate<P> {
    pub fn new(provider: P, users: UserService) -> Self {
        let sessions = provider.sessions();
        Self {
            provider,
            users,
            sessions,
        }
    }

    /// Current user, or `None` when unauthenticated.
    pub fn current(&self) -> Option<AuthUser> {
        self.sessions.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.borrow().is_some()
    }

    /// Wait for the next session change. Returns `None` once the provider is gone.
    pub async fn next_change(&mut self) -> Option<Option<AuthUser>> {
        self.sessions.changed().await.ok()?;
        Some(self.sessions.borrow_and_update().clone())
    }

    /// Sign in; on failure the gate reports unauthenticated.
    pub async fn sign_in(&self, credential: &str) -> Option<AuthUser> {
        match self.provider.sign_in(credential).await {
            Ok(user) => {
                info!("User {} signed in", user.id);
                if let Err(e) = self.users.record_sign_in(&user).await {
                    warn!("Failed to record sign-in for {}: {}", user.id, e);
                }
                Some(user)
            }
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                None
            }
        }
    }

    pub async fn sign_out(&self) {
        match self.provider.sign_out().await {
            Ok(()) => info!("User signed out"),
            Err(e) => warn!("Error signing out: {}", e),
        }
    }
}
