//! Identity provider backed by the Firebase Authentication REST API.
//!
//! Sign-up, sign-in, profile and password-reset calls go to the Identity
//! Toolkit API; token refresh goes to the Secure Token API. Both accept the
//! project's web API key as the `key` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::identity::{AuthGrant, FederatedCredential, IdentityProvider, ProfileChanges, TokenGrant};
use super::AuthError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for account endpoints (sign-up, sign-in, update, reset)
const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Base URL for the token exchange endpoint
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Redirect URI reported for federated sign-in. The REST API requires one even
/// when the credential was obtained out of band.
const IDP_REQUEST_URI: &str = "http://localhost";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
}

impl From<AccountResponse> for AuthGrant {
    fn from(r: AccountResponse) -> Self {
        AuthGrant {
            uid: r.local_id,
            email: r.email,
            display_name: r.display_name.filter(|s| !s.is_empty()),
            photo_url: r.photo_url.filter(|s| !s.is_empty()),
            id_token: r.id_token,
            refresh_token: r.refresh_token,
        }
    }
}

/// The Secure Token API answers in snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Firebase Authentication over REST.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
}

impl FirebaseIdentity {
    /// Create a provider talking to the production Firebase endpoints
    pub fn new(api_key: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, api_key))
    }

    /// Create a provider on an existing HTTP client, sharing its pool
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            identity_url: IDENTITY_TOOLKIT_URL.to_string(),
            token_url: SECURE_TOKEN_URL.to_string(),
        }
    }

    /// Point both APIs at a local Auth emulator (`host:port`)
    pub fn with_emulator(mut self, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let root = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        self.identity_url = format!("{}/identitytoolkit.googleapis.com/v1", root);
        self.token_url = format!("{}/securetoken.googleapis.com/v1", root);
        self
    }

    fn account_url(&self, action: &str) -> String {
        format!("{}/accounts:{}?key={}", self.identity_url, action, self.api_key)
    }

    /// Turn a provider error code into a message fit for an end user.
    /// Codes may carry detail after " : ", e.g. `WEAK_PASSWORD : Password should be ...`.
    pub fn friendly_message(code: &str) -> String {
        let (head, detail) = match code.split_once(" : ") {
            Some((head, detail)) => (head.trim(), Some(detail.trim())),
            None => (code.trim(), None),
        };

        let message = match head {
            "EMAIL_EXISTS" => "An account with this email already exists",
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                "Invalid email or password"
            }
            "INVALID_EMAIL" => "Please enter a valid email address",
            "USER_DISABLED" => "This account has been disabled",
            "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later",
            "OPERATION_NOT_ALLOWED" => "This sign-in method is not enabled",
            "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
                "Your session has expired. Please login again"
            }
            "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => "Please login again",
            "INVALID_IDP_RESPONSE" => "The sign-in provider rejected the credential",
            "WEAK_PASSWORD" => return detail.unwrap_or("Password is too weak").to_string(),
            "" => "Authentication failed",
            other => return format!("Authentication failed: {}", other),
        };
        message.to_string()
    }

    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_default();
            warn!(status = %status, code = %code, "Identity provider rejected request");
            return Err(AuthError::Provider(Self::friendly_message(&code)));
        }

        serde_json::from_str(&text).map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    async fn post_account<B: Serialize, T: DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        debug!(action, "Identity provider request");
        let response = self
            .client
            .post(self.account_url(action))
            .json(body)
            .send()
            .await?;
        Self::read_response(response).await
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.post_account("signUp", &body).await?;
        Ok(account.into())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.post_account("signInWithPassword", &body).await?;
        Ok(account.into())
    }

    async fn sign_in_with_idp(
        &self,
        credential: &FederatedCredential,
    ) -> Result<AuthGrant, AuthError> {
        let token_param = match (&credential.id_token, &credential.access_token) {
            (Some(id_token), _) => ("id_token", id_token.as_str()),
            (None, Some(access_token)) => ("access_token", access_token.as_str()),
            (None, None) => {
                return Err(AuthError::Provider(
                    "Federated credential carries no token".to_string(),
                ))
            }
        };

        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(token_param.0, token_param.1)
            .append_pair("providerId", &credential.provider_id)
            .finish();

        let body = IdpRequest {
            post_body,
            request_uri: IDP_REQUEST_URI,
            return_idp_credential: true,
            return_secure_token: true,
        };
        let account: AccountResponse = self.post_account("signInWithIdp", &body).await?;
        Ok(account.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        debug!("Refreshing ID token");
        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;

        let refreshed: RefreshResponse = Self::read_response(response).await?;
        Ok(TokenGrant {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token.filter(|t| t != refresh_token),
        })
    }

    async fn update_profile(
        &self,
        id_token: &str,
        changes: &ProfileChanges,
    ) -> Result<(), AuthError> {
        let body = UpdateRequest {
            id_token,
            display_name: changes.display_name.as_deref(),
            photo_url: changes.photo_url.as_deref(),
            return_secure_token: false,
        };
        let _: serde_json::Value = self.post_account("update", &body).await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = OobRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: serde_json::Value = self.post_account("sendOobCode", &body).await?;
        Ok(())
    }
}
