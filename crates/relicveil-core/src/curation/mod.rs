//! Curation: likes, dislikes, submissions, and profile statistics.
//!
//! - `ReactionLedger`: which artifacts this client has liked or disliked,
//!   kept in the local store
//! - `Curator`: the signed-in user's write operations, validated and routed
//!   through the API client with the session's bearer token
//!
//! The server's like count is authoritative. The ledger only decides which
//! reactions are offered and drives the optimistic count shown after one.

pub mod curator;
pub mod ledger;

pub use curator::{CurationError, Curator, ProfileStats, ReactionOutcome};
pub use ledger::{Reaction, ReactionLedger};
