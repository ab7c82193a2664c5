//! Signed-in user state.
//!
//! The session cookie lives in the [`ApiClient`] cookie jar; this type only
//! caches the user record the API returned for it.

use birdie_core::Error;
use tokio::sync::RwLock;

use crate::api::{ApiClient, Credentials, User};

/// Permission that grants every admin screen.
pub const ADMIN_PERMISSION: &str = "admin";

pub struct Session {
    api: ApiClient,
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Self { api, user: RwLock::new(None) }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Reload the current user. Any failure signs the session out.
    pub async fn refresh(&self) -> Option<User> {
        let user = match self.api.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("no active session: {}", e);
                None
            }
        };
        *self.user.write().await = user.clone();
        user
    }

    /// Log in and load the user behind the new session cookie.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, Error> {
        self.api.login(credentials).await?;
        let user = self.api.current_user().await?;
        tracing::info!("signed in as {}", user.username);
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Log out. Local state is cleared even when the API call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("logout request failed: {}", e);
        }
        self.clear().await;
    }

    pub async fn clear(&self) {
        *self.user.write().await = None;
    }

    pub async fn set_user(&self, user: Option<User>) {
        *self.user.write().await = user;
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn has_permission(&self, permission: &str) -> bool {
        self.user
            .read()
            .await
            .as_ref()
            .is_some_and(|u| u.permissions.iter().any(|p| p == permission))
    }

    pub async fn is_admin(&self) -> bool {
        self.has_permission(ADMIN_PERMISSION).await
    }
}
