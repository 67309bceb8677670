//! Local key/value persistence.
//!
//! This module provides the `LocalStore` trait, the stand-in for browser
//! local storage, and three backends:
//! - `FileStore`: one JSON object on disk under the cache directory
//! - `KeyringStore`: OS keychain entries, used for secrets such as refresh tokens
//! - `MemoryStore`: process-local map, used by tests and throwaway sessions
//!
//! Reads and writes are not coordinated across processes; the last writer wins.
//!
//! A keychain without a usable backend accepts writes and forgets them, so
//! [`usable_or`] checks a store before it is trusted with secrets.

pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// String-keyed, string-valued storage.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Key written and removed again by [`round_trips`]
const CHECK_KEY: &str = "relicveil-store-check";

/// Whether `store` hands back a value written to it just now.
/// Leaves no entry behind.
pub fn round_trips(store: &dyn LocalStore) -> bool {
    let marker = format!("check-{}", std::process::id());
    let read_back = store.set(CHECK_KEY, &marker).and_then(|()| store.get(CHECK_KEY));
    let _ = store.remove(CHECK_KEY);
    matches!(read_back, Ok(Some(ref value)) if *value == marker)
}

/// `preferred` when it keeps what is written to it, otherwise `fallback`
pub fn usable_or(
    preferred: Arc<dyn LocalStore>,
    fallback: Arc<dyn LocalStore>,
) -> Arc<dyn LocalStore> {
    if round_trips(preferred.as_ref()) {
        preferred
    } else {
        warn!("Secure store does not keep values, falling back to local file storage");
        fallback
    }
}
