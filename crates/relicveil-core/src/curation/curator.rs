use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{Reaction, ReactionLedger};
use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthError, SessionProvider, User};
use crate::models::{Artifact, ArtifactForm, MutationAck, NewArtifact};
use crate::validation::{normalize_artifact_form, ValidationError};

#[derive(Error, Debug)]
pub enum CurationError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// What a like/dislike attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// The server accepted it; the count to display until the next fetch
    Applied { like_count: u64 },
    /// Not offered in the current state (already liked, or nothing to take back)
    Unchanged,
}

/// Counts shown on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileStats {
    pub total_added: usize,
    pub total_liked: usize,
}

/// The signed-in user's write operations.
pub struct Curator {
    api: ApiClient,
    session: Arc<SessionProvider>,
    ledger: ReactionLedger,
}

impl Curator {
    pub fn new(api: ApiClient, session: Arc<SessionProvider>, ledger: ReactionLedger) -> Self {
        Self { api, session, ledger }
    }

    pub fn ledger(&self) -> &ReactionLedger {
        &self.ledger
    }

    async fn require_user(&self) -> Result<User, CurationError> {
        self.session
            .current_user()
            .await
            .ok_or(CurationError::Auth(AuthError::NotSignedIn))
    }

    pub async fn like(&self, artifact: &Artifact) -> Result<ReactionOutcome, CurationError> {
        let user = self.require_user().await?;
        let previous = self.ledger.reaction(&artifact.id)?;
        if previous == Reaction::Liked {
            return Ok(ReactionOutcome::Unchanged);
        }

        self.api
            .like_artifact(&artifact.id, &user.email, self.session.as_ref())
            .await?;
        self.ledger.record_like(&artifact.id)?;

        // Switching from a dislike takes back the earlier decrement too
        let bump = if previous == Reaction::Disliked { 2 } else { 1 };
        info!(id = %artifact.id, "Artifact liked");
        Ok(ReactionOutcome::Applied {
            like_count: artifact.display_likes() + bump,
        })
    }

    pub async fn dislike(&self, artifact: &Artifact) -> Result<ReactionOutcome, CurationError> {
        let user = self.require_user().await?;
        if !self.ledger.can_dislike(&artifact.id)? {
            return Ok(ReactionOutcome::Unchanged);
        }

        self.api
            .dislike_artifact(&artifact.id, &user.email, self.session.as_ref())
            .await?;
        self.ledger.record_dislike(&artifact.id)?;

        info!(id = %artifact.id, "Artifact disliked");
        Ok(ReactionOutcome::Applied {
            like_count: artifact.display_likes().saturating_sub(1),
        })
    }

    /// Validate and normalize the form, stamp the adder identity from the
    /// session, submit
    pub async fn add_artifact(&self, form: ArtifactForm) -> Result<MutationAck, CurationError> {
        let form = normalize_artifact_form(form)?;
        let user = self.require_user().await?;

        let artifact = NewArtifact {
            form,
            adder_name: user.display_name_or_email().to_string(),
            adder_email: user.email.clone(),
        };
        let ack = self.api.add_artifact(&artifact, self.session.as_ref()).await?;
        info!(name = %artifact.form.name, "Artifact added");
        Ok(ack)
    }

    pub async fn update_artifact(
        &self,
        id: &str,
        form: ArtifactForm,
    ) -> Result<MutationAck, CurationError> {
        let form = normalize_artifact_form(form)?;
        self.require_user().await?;
        Ok(self.api.update_artifact(id, &form, self.session.as_ref()).await?)
    }

    pub async fn delete_artifact(&self, id: &str) -> Result<MutationAck, CurationError> {
        self.require_user().await?;
        let ack = self.api.delete_artifact(id, self.session.as_ref()).await?;
        self.ledger.forget(id)?;
        Ok(ack)
    }

    /// Fetch added and liked artifacts concurrently and count them
    pub async fn profile_stats(&self) -> Result<ProfileStats, CurationError> {
        self.require_user().await?;
        let tokens = self.session.as_ref();
        let (added, liked) = futures::try_join!(
            self.api.my_artifacts(tokens),
            self.api.liked_artifacts(tokens)
        )?;
        Ok(ProfileStats {
            total_added: added.len(),
            total_liked: liked.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;

    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::{serve, serve_once, StubIdentity};

    fn make_curator(base: &str) -> (Curator, Arc<SessionProvider>) {
        let storage = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionProvider::new(
            Arc::new(StubIdentity),
            storage.clone(),
            Arc::new(MemoryStore::new()),
        ));
        let client = Client::builder().no_proxy().build().unwrap();
        let api = ApiClient::with_client(client, base);
        (Curator::new(api, session.clone(), ReactionLedger::new(storage)), session)
    }

    fn artifact(likes: i64) -> Artifact {
        Artifact {
            id: "65f1c2".to_string(),
            name: "Rosetta Stone".to_string(),
            like_count: likes,
            ..Default::default()
        }
    }

    fn valid_form() -> ArtifactForm {
        ArtifactForm {
            name: "Bronze dagger".to_string(),
            image: "https://example.org/dagger.jpg".to_string(),
            artifact_type: "Weapons".to_string(),
            historical_context: "Late Bronze Age".to_string(),
            description: "Cast bronze blade".to_string(),
            created_at: "1300 BC".to_string(),
            discovered_at: "1922".to_string(),
            discovered_by: "Howard Carter".to_string(),
            present_location: "Cairo".to_string(),
        }
    }

    #[tokio::test]
    async fn test_like_requires_session() {
        // Nothing listens here; the check must happen before any request
        let (curator, _) = make_curator("http://127.0.0.1:9");
        let err = curator.like(&artifact(3)).await.unwrap_err();
        assert!(matches!(err, CurationError::Auth(AuthError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_like_then_dislike() {
        let (base, request) = serve_once("200 OK", r#"{"success":true}"#).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let outcome = curator.like(&artifact(3)).await.unwrap();
        assert_eq!(outcome, ReactionOutcome::Applied { like_count: 4 });
        assert_eq!(curator.ledger().reaction("65f1c2").unwrap(), Reaction::Liked);
        assert!(request.await.unwrap().contains(r#""userEmail":"ada@example.org""#));

        // Already liked: nothing is sent
        assert_eq!(curator.like(&artifact(4)).await.unwrap(), ReactionOutcome::Unchanged);

        let (base, _request) = serve_once("200 OK", r#"{"success":true}"#).await;
        let (curator2, session2) = make_curator(&base);
        session2.sign_in("ada@example.org", "Secret1").await.unwrap();
        curator2.ledger().record_like("65f1c2").unwrap();

        let outcome = curator2.dislike(&artifact(0)).await.unwrap();
        assert_eq!(outcome, ReactionOutcome::Applied { like_count: 0 });
        assert_eq!(curator2.ledger().reaction("65f1c2").unwrap(), Reaction::Disliked);
    }

    #[tokio::test]
    async fn test_dislike_without_like_is_unchanged() {
        let (curator, session) = make_curator("http://127.0.0.1:9");
        session.sign_in("ada@example.org", "Secret1").await.unwrap();
        let outcome = curator.dislike(&artifact(2)).await.unwrap();
        assert_eq!(outcome, ReactionOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_like_after_dislike_adds_two() {
        let (base, _request) = serve_once("200 OK", r#"{"success":true}"#).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();
        curator.ledger().record_dislike("65f1c2").unwrap();

        let outcome = curator.like(&artifact(2)).await.unwrap();
        assert_eq!(outcome, ReactionOutcome::Applied { like_count: 4 });
    }

    #[tokio::test]
    async fn test_rejected_like_leaves_ledger_alone() {
        let (base, _request) =
            serve_once("400 Bad Request", r#"{"message":"Already liked"}"#).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let err = curator.like(&artifact(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Already liked");
        assert_eq!(curator.ledger().reaction("65f1c2").unwrap(), Reaction::None);
    }

    #[tokio::test]
    async fn test_add_artifact_validates_and_stamps_adder() {
        let (curator, session) = make_curator("http://127.0.0.1:9");
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let mut form = valid_form();
        form.image = "dagger.jpg".to_string();
        let err = curator.add_artifact(form).await.unwrap_err();
        assert!(matches!(err, CurationError::Validation(ValidationError::InvalidImageUrl)));

        let (base, request) =
            serve_once("201 Created", r#"{"success":true,"message":"Artifact added"}"#).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let ack = curator.add_artifact(valid_form()).await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("Artifact added"));

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/artifacts HTTP/1.1"));
        assert!(request.contains(r#""adderName":"Ada""#));
        assert!(request.contains(r#""adderEmail":"ada@example.org""#));
    }

    #[tokio::test]
    async fn test_submitted_form_is_normalized() {
        let (base, requests) = serve("200 OK", r#"{"success":true}"#, 2).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let mut form = valid_form();
        form.artifact_type = " religious items ".to_string();
        form.name = " Bronze dagger ".to_string();
        curator.add_artifact(form.clone()).await.unwrap();
        curator.update_artifact("65f1c2", form).await.unwrap();

        let requests = requests.await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert!(request.contains(r#""type":"Religious Items""#));
            assert!(request.contains(r#""name":"Bronze dagger""#));
        }
        assert!(requests[1].starts_with("PATCH /api/artifacts/65f1c2 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_profile_stats_counts_both_lists() {
        let (base, requests) = serve("200 OK", r#"[{"_id":"1"},{"_id":"2"}]"#, 2).await;
        let (curator, session) = make_curator(&base);
        session.sign_in("ada@example.org", "Secret1").await.unwrap();

        let stats = curator.profile_stats().await.unwrap();
        assert_eq!(
            stats,
            ProfileStats {
                total_added: 2,
                total_liked: 2
            }
        );

        let requests = requests.await.unwrap();
        assert!(requests.iter().any(|r| r.starts_with("GET /api/artifacts/user/me ")));
        assert!(requests.iter().any(|r| r.starts_with("GET /api/artifacts/liked/me ")));
    }
}
