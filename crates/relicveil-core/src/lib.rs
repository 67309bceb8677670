//! Core library for relicveil.
//!
//! This crate holds everything below the user interface:
//!
//! - `api`: REST client for the artifact service
//! - `auth`: identity provider, session provider, bearer-token caching
//! - `storage`: local key/value persistence (file, keychain, memory)
//! - `models`: artifact records and write payloads
//! - `validation`: client-side form constraints
//! - `curation`: like/dislike bookkeeping and profile statistics
//! - `config`: application configuration
//! - `utils`: text formatting for listings

pub mod api;
pub mod auth;
pub mod config;
pub mod curation;
pub mod models;
pub mod storage;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::{
    AuthError, FederatedCredential, FirebaseIdentity, IdentityProvider, ProfileChanges,
    SessionProvider, StaticToken, TokenSource, User,
};
pub use config::Config;
pub use curation::{CurationError, Curator, ProfileStats, Reaction, ReactionLedger, ReactionOutcome};
pub use models::{Artifact, ArtifactForm, ArtifactType, ArtifactUpdate, MutationAck, NewArtifact};
pub use storage::{FileStore, KeyringStore, LocalStore, MemoryStore};
pub use validation::ValidationError;

#[cfg(test)]
pub(crate) mod test_support;
