use anyhow::{Context, Result};
use keyring::Entry;

use super::LocalStore;

const SERVICE_NAME: &str = "relicveil";

/// Local store backed by the OS keychain.
///
/// Each key becomes one keychain entry under the `relicveil` service.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a different keychain service name (separate profiles, tests)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve secret from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store secret in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete secret from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Talks to the real OS keychain, which headless CI machines lack.
    #[test]
    #[ignore = "needs an unlocked OS keychain"]
    fn test_secret_survives_a_new_entry() {
        let store = KeyringStore::with_service("relicveil-test");
        store.set("refresh_token", "rt-1").unwrap();

        let reopened = KeyringStore::with_service("relicveil-test");
        assert_eq!(reopened.get("refresh_token").unwrap().as_deref(), Some("rt-1"));

        reopened.remove("refresh_token").unwrap();
        assert_eq!(store.get("refresh_token").unwrap(), None);
    }
}
