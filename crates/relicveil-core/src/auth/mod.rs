//! Authentication module for managing user sessions and bearer tokens.
//!
//! This module provides:
//! - `IdentityProvider`: the operations the third-party identity service offers
//! - `FirebaseIdentity`: `IdentityProvider` over the Firebase Auth REST API
//! - `SessionProvider`: the explicit session object (sign-in through sign-out)
//! - `TokenSource`: on-demand bearer tokens for the API client
//!
//! Bearer tokens are the provider's ID tokens (JWTs). A cached token is reused
//! until the `exp` claim in its payload has passed.

pub mod error;
pub mod firebase;
pub mod identity;
pub mod jwt;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use firebase::FirebaseIdentity;
pub use identity::{AuthGrant, FederatedCredential, IdentityProvider, ProfileChanges, TokenGrant};
pub use session::{SessionProvider, User};
pub use token::{StaticToken, TokenSource};
