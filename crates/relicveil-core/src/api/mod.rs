//! REST API client module for the artifact service.
//!
//! This module provides the `ApiClient` for listing, searching, submitting,
//! editing, deleting, and liking artifact records.
//!
//! Protected endpoints take a `TokenSource`; the client asks it for a bearer
//! token right before each request and attaches it when one is available.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
