use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Failure reported by the identity provider, already phrased for users
    #[error("{0}")]
    Provider(String),

    #[error("Please login first")]
    NotSignedIn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
