use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::storage::LocalStore;

/// Local store key listing liked artifact ids
pub const LIKED_KEY: &str = "likedArtifacts";

/// Local store key listing disliked artifact ids
pub const DISLIKED_KEY: &str = "dislikedArtifacts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    Liked,
    Disliked,
}

/// Liked/disliked bookkeeping, one JSON array of ids per list.
///
/// An id is in at most one list after any ledger write.
pub struct ReactionLedger {
    store: Arc<dyn LocalStore>,
}

impl ReactionLedger {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable reaction list");
                Ok(Vec::new())
            }
        }
    }

    fn write(&self, key: &str, ids: &[String]) -> Result<()> {
        self.store.set(key, &serde_json::to_string(ids)?)
    }

    pub fn reaction(&self, id: &str) -> Result<Reaction> {
        if self.read(LIKED_KEY)?.iter().any(|i| i == id) {
            Ok(Reaction::Liked)
        } else if self.read(DISLIKED_KEY)?.iter().any(|i| i == id) {
            Ok(Reaction::Disliked)
        } else {
            Ok(Reaction::None)
        }
    }

    /// Liking is offered unless the artifact is already liked
    pub fn can_like(&self, id: &str) -> Result<bool> {
        Ok(self.reaction(id)? != Reaction::Liked)
    }

    /// Disliking is only offered to take back a like
    pub fn can_dislike(&self, id: &str) -> Result<bool> {
        Ok(self.reaction(id)? == Reaction::Liked)
    }

    pub fn record_like(&self, id: &str) -> Result<()> {
        self.move_to(id, LIKED_KEY, DISLIKED_KEY)
    }

    pub fn record_dislike(&self, id: &str) -> Result<()> {
        self.move_to(id, DISLIKED_KEY, LIKED_KEY)
    }

    /// Drop an artifact from both lists (after it was deleted)
    pub fn forget(&self, id: &str) -> Result<()> {
        for key in [LIKED_KEY, DISLIKED_KEY] {
            let mut ids = self.read(key)?;
            let before = ids.len();
            ids.retain(|i| i != id);
            if ids.len() != before {
                self.write(key, &ids)?;
            }
        }
        Ok(())
    }

    pub fn liked_ids(&self) -> Result<Vec<String>> {
        self.read(LIKED_KEY)
    }

    fn move_to(&self, id: &str, to: &str, from: &str) -> Result<()> {
        let mut source = self.read(from)?;
        if source.iter().any(|i| i == id) {
            source.retain(|i| i != id);
            self.write(from, &source)?;
        }

        let mut target = self.read(to)?;
        if !target.iter().any(|i| i == id) {
            target.push(id.to_string());
            self.write(to, &target)?;
        }
        Ok(())
    }
}
