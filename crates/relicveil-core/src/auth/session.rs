use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::identity::{AuthGrant, FederatedCredential, IdentityProvider, ProfileChanges};
use super::{jwt, AuthError, TokenSource};
use crate::storage::LocalStore;
use crate::validation::{validate_email, validate_password, ValidationError};

/// Local store key holding the cached bearer token
pub const TOKEN_KEY: &str = "token";

/// Local store key holding the signed-in user record
pub const SESSION_KEY: &str = "session";

/// Secret store key holding the provider refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl User {
    /// Name to show and to record as an artifact's adder
    pub fn display_name_or_email(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone)]
struct Session {
    user: User,
    refresh_token: String,
}

/// Explicit session object: created at sign-in, invalidated at sign-out.
///
/// The cached bearer token lives in `storage` under [`TOKEN_KEY`], the user
/// record under [`SESSION_KEY`]. The refresh token is a secret and goes to
/// `secrets` instead.
pub struct SessionProvider {
    identity: Arc<dyn IdentityProvider>,
    storage: Arc<dyn LocalStore>,
    secrets: Arc<dyn LocalStore>,
    session: RwLock<Option<Session>>,
}

impl SessionProvider {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn LocalStore>,
        secrets: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            identity,
            storage,
            secrets,
            session: RwLock::new(None),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Resume a session persisted by an earlier process.
    /// Needs both the user record and the refresh token; otherwise stays signed out.
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        let Some(record) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let user: User = match serde_json::from_str(&record) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session record");
                return Ok(None);
            }
        };
        let Some(refresh_token) = self.secrets.get(REFRESH_TOKEN_KEY)? else {
            debug!("Session record present but no refresh token");
            return Ok(None);
        };

        info!(uid = %user.uid, "Session restored");
        *self.session.write().await = Some(Session {
            user: user.clone(),
            refresh_token,
        });
        Ok(Some(user))
    }

    /// Register a new account and sign it in, then apply the optional
    /// profile fields. Email and password rules are checked before anything
    /// is sent. A failed profile step leaves the new session in place.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<User, AuthError> {
        validate_email(email)?;
        validate_password(password)?;

        let grant = self.identity.sign_up(email.trim(), password).await?;
        let id_token = grant.id_token.clone();
        let user = self.establish(grant).await;

        let changes = ProfileChanges {
            display_name: display_name.map(str::to_string),
            photo_url: photo_url.map(str::to_string),
        };
        if changes.is_empty() {
            return Ok(user);
        }
        match self.apply_profile(&id_token, changes).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(uid = %user.uid, error = %e, "Account created but profile update failed");
                Ok(user)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }
        let grant = self
            .identity
            .sign_in_with_password(email.trim(), password)
            .await?;
        Ok(self.establish(grant).await)
    }

    pub async fn sign_in_with_idp(
        &self,
        credential: &FederatedCredential,
    ) -> Result<User, AuthError> {
        let grant = self.identity.sign_in_with_idp(credential).await?;
        Ok(self.establish(grant).await)
    }

    /// Drop the session and every persisted trace of it.
    /// The in-memory session is gone even if clearing storage fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.session.write().await.take();
        if let Some(ref s) = previous {
            info!(uid = %s.user.uid, "Signing out");
        }

        let results = [
            self.storage.remove(TOKEN_KEY),
            self.storage.remove(SESSION_KEY),
            self.secrets.remove(REFRESH_TOKEN_KEY),
        ];
        for result in results {
            result?;
        }
        Ok(())
    }

    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<User, AuthError> {
        if !self.is_signed_in().await {
            return Err(AuthError::NotSignedIn);
        }
        let token = self.bearer_token().await.ok_or(AuthError::NotSignedIn)?;
        self.apply_profile(&token, changes).await
    }

    /// Send profile changes, then mirror them into the session record
    async fn apply_profile(
        &self,
        id_token: &str,
        changes: ProfileChanges,
    ) -> Result<User, AuthError> {
        self.identity.update_profile(id_token, &changes).await?;

        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(AuthError::NotSignedIn)?;
        if let Some(name) = changes.display_name {
            session.user.display_name = Some(name);
        }
        if let Some(photo) = changes.photo_url {
            session.user.photo_url = Some(photo);
        }
        let user = session.user.clone();
        drop(guard);

        self.persist_user(&user);
        Ok(user)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;
        self.identity.send_password_reset(email.trim()).await
    }

    /// Install a fresh grant as the current session
    async fn establish(&self, grant: AuthGrant) -> User {
        let user = User {
            uid: grant.uid,
            email: grant.email,
            display_name: grant.display_name,
            photo_url: grant.photo_url,
            signed_in_at: Utc::now(),
        };

        if let Err(e) = self.storage.set(TOKEN_KEY, &grant.id_token) {
            warn!(error = %e, "Failed to cache bearer token");
        }
        if let Err(e) = self.secrets.set(REFRESH_TOKEN_KEY, &grant.refresh_token) {
            warn!(error = %e, "Failed to store refresh token");
        }
        self.persist_user(&user);

        info!(uid = %user.uid, "Signed in");
        *self.session.write().await = Some(Session {
            user: user.clone(),
            refresh_token: grant.refresh_token,
        });
        user
    }

    fn persist_user(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(anyhow::Error::from)
            .and_then(|record| self.storage.set(SESSION_KEY, &record));
        if let Err(e) = result {
            warn!(error = %e, "Failed to save session");
        }
    }

    fn cached_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read cached bearer token");
                None
            }
        }
    }
}

#[async_trait]
impl TokenSource for SessionProvider {
    /// Cached token while its `exp` is in the future, otherwise exactly one
    /// refresh call. `None` without a session, when the refresh fails, or
    /// when the session ended while the refresh was in flight.
    async fn bearer_token(&self) -> Option<String> {
        let (uid, refresh_token) = {
            let guard = self.session.read().await;
            let session = guard.as_ref()?;
            (session.user.uid.clone(), session.refresh_token.clone())
        };

        if let Some(cached) = self.cached_token() {
            if !jwt::is_expired(&cached, Utc::now()) {
                return Some(cached);
            }
            debug!("Cached bearer token expired");
        }

        let grant = match self.identity.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                return None;
            }
        };

        // Only write back while the same user is still signed in
        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut().filter(|s| s.user.uid == uid) else {
            debug!("Session ended during token refresh");
            return None;
        };

        if let Err(e) = self.storage.set(TOKEN_KEY, &grant.id_token) {
            warn!(error = %e, "Failed to cache refreshed bearer token");
        }
        if let Some(rotated) = grant.refresh_token {
            if let Err(e) = self.secrets.set(REFRESH_TOKEN_KEY, &rotated) {
                warn!(error = %e, "Failed to store rotated refresh token");
            }
            session.refresh_token = rotated;
        }
        drop(guard);

        Some(grant.id_token)
    }
}
