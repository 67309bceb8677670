//! Data models for artifact records.
//!
//! The artifact schema is owned by the backend. These types only describe
//! what the client reads and writes:
//!
//! - `Artifact`: a record as returned by the service
//! - `ArtifactForm` / `ArtifactUpdate`: the editable descriptive fields
//! - `NewArtifact`: a submission, form fields plus the adder identity
//! - `MutationAck`: the service's `{success, message}` write response
//! - `ArtifactType`: the fixed list of artifact categories

pub mod artifact;

pub use artifact::{Artifact, ArtifactForm, ArtifactType, ArtifactUpdate, MutationAck, NewArtifact};
