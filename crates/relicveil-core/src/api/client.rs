//! API client for communicating with the artifact REST service.
//!
//! Every call is a single attempt: no retries, no backoff. Failures come back
//! as [`ApiError`] with the server's message when it sent one.

use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::TokenSource;
use crate::models::{Artifact, ArtifactUpdate, MutationAck, NewArtifact};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix under which the service mounts its routes
const API_PREFIX: &str = "/api";

/// HTTP request timeout in seconds, used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReactionBody<'a> {
    user_email: &'a str,
}

/// API client for the artifact service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the service at `api_url` (without the `/api` prefix)
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client on an existing HTTP client, sharing its connection pool
    pub fn with_client(client: Client, api_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}{}", api_url.trim_end_matches('/'), API_PREFIX),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build one request. `Authorization` is attached only when `tokens` is
    /// given and yields a non-empty token.
    pub async fn build_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        tokens: Option<&dyn TokenSource>,
    ) -> Result<reqwest::Request, ApiError> {
        let token = match tokens {
            Some(source) => source.bearer_token().await.filter(|t| !t.is_empty()),
            None => None,
        };

        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    /// Perform one round trip and decode the JSON response body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        tokens: Option<&dyn TokenSource>,
    ) -> Result<T, ApiError> {
        let request = self.build_request(method.clone(), endpoint, body, tokens).await?;
        debug!(
            method = %method,
            endpoint,
            authorized = request.headers().contains_key(header::AUTHORIZATION),
            "API request"
        );

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(method = %method, endpoint, error = %e, "API request failed");
            ApiError::from(e)
        })?;

        Self::read_json(response, &method, endpoint).await
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        method: &Method,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            warn!(
                method = %method,
                endpoint,
                status = %status,
                body = %ApiError::truncate_body(&text),
                "API error"
            );
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(method = %method, endpoint, error = %e, "Failed to parse API response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    async fn mutate(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        let ack: MutationAck = self.call(method, endpoint, body, Some(tokens)).await?;
        if ack.success {
            Ok(ack)
        } else {
            Err(ApiError::rejected(ack.message))
        }
    }

    fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    // ===== Public endpoints =====

    /// Fetch every artifact
    pub async fn list_artifacts(&self) -> Result<Vec<Artifact>, ApiError> {
        self.call(Method::GET, "/artifacts", None, None).await
    }

    /// Fetch the most-liked artifacts, as ranked by the service
    pub async fn top_liked_artifacts(&self) -> Result<Vec<Artifact>, ApiError> {
        self.call(Method::GET, "/artifacts/top-liked", None, None).await
    }

    /// Search artifacts by name
    pub async fn search_artifacts(&self, query: &str) -> Result<Vec<Artifact>, ApiError> {
        let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.call(Method::GET, &format!("/artifacts/search?q={}", q), None, None).await
    }

    // ===== Protected endpoints =====

    pub async fn get_artifact(
        &self,
        id: &str,
        tokens: &dyn TokenSource,
    ) -> Result<Artifact, ApiError> {
        self.call(Method::GET, &artifact_path(id, None), None, Some(tokens)).await
    }

    pub async fn add_artifact(
        &self,
        artifact: &NewArtifact,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(artifact)?;
        self.mutate(Method::POST, "/artifacts", Some(&body), tokens).await
    }

    pub async fn update_artifact(
        &self,
        id: &str,
        update: &ArtifactUpdate,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(update)?;
        self.mutate(Method::PATCH, &artifact_path(id, None), Some(&body), tokens).await
    }

    pub async fn delete_artifact(
        &self,
        id: &str,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        self.mutate(Method::DELETE, &artifact_path(id, None), None, tokens).await
    }

    pub async fn like_artifact(
        &self,
        id: &str,
        user_email: &str,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(&ReactionBody { user_email })?;
        let path = artifact_path(id, Some("like"));
        self.mutate(Method::PATCH, &path, Some(&body), tokens).await
    }

    pub async fn dislike_artifact(
        &self,
        id: &str,
        user_email: &str,
        tokens: &dyn TokenSource,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(&ReactionBody { user_email })?;
        let path = artifact_path(id, Some("dislike"));
        self.mutate(Method::PATCH, &path, Some(&body), tokens).await
    }

    /// Artifacts submitted by the token's owner
    pub async fn my_artifacts(
        &self,
        tokens: &dyn TokenSource,
    ) -> Result<Vec<Artifact>, ApiError> {
        self.call(Method::GET, "/artifacts/user/me", None, Some(tokens)).await
    }

    /// Artifacts liked by the token's owner
    pub async fn liked_artifacts(
        &self,
        tokens: &dyn TokenSource,
    ) -> Result<Vec<Artifact>, ApiError> {
        self.call(Method::GET, "/artifacts/liked/me", None, Some(tokens)).await
    }
}

/// `/artifacts/{id}[/{action}]` with the id encoded as one path segment
fn artifact_path(id: &str, action: Option<&str>) -> String {
    let mut path = format!("/artifacts/{}", urlencoding::encode(id));
    if let Some(action) = action {
        path.push('/');
        path.push_str(action);
    }
    path
}
