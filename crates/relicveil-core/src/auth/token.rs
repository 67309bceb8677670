use async_trait::async_trait;

/// Anything that can hand out a bearer token on demand.
///
/// Returning `None` means no token is available (no session, refresh failed);
/// requests then go out without an `Authorization` header.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, for one-off tools and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
