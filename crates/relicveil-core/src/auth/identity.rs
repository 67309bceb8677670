use async_trait::async_trait;

use super::AuthError;

/// Result of a successful sign-up or sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
}

/// Result of exchanging a refresh token for a fresh ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub id_token: String,
    /// Set when the provider rotated the refresh token
    pub refresh_token: Option<String>,
}

/// Profile fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

/// Credential obtained from a federated identity provider (Google, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedCredential {
    /// Provider id as the identity service knows it, e.g. `google.com`
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl FederatedCredential {
    pub fn google_id_token(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: Some(id_token.into()),
            access_token: None,
        }
    }

    pub fn google_access_token(access_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: None,
            access_token: Some(access_token.into()),
        }
    }
}

/// Operations offered by the third-party identity service.
///
/// Sign-out is not here: it only discards local state.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, AuthError>;

    async fn sign_in_with_idp(
        &self,
        credential: &FederatedCredential,
    ) -> Result<AuthGrant, AuthError>;

    /// Mint a fresh ID token. This is the only call the token accessor makes.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;

    async fn update_profile(
        &self,
        id_token: &str,
        changes: &ProfileChanges,
    ) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
}
