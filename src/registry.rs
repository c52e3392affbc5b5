//! The ballot registry: owner-gated candidate registration and vote tallies
//!
//! Every mutating operation follows the same shape: check preconditions,
//! mutate, publish exactly one [`Notification`], return. A failed
//! precondition returns before anything is touched, so no operation ever
//! leaves a partial effect behind.

use crate::notification::{Notification, NotificationSink};
use crate::types::{Candidate, CandidateId, Identity, VoteResult};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Candidates every registry starts with, in id order
pub const SEED_CANDIDATES: [&str; 2] = ["Alice", "Bob"];

/// Owner-gated candidate registry
///
/// Mutations take `&mut self`, so a single owner of the registry gets
/// serialized calls for free. Wrap it in [`SharedRegistry`](crate::SharedRegistry)
/// to share it across threads.
pub struct BallotRegistry {
    owner: Identity,
    candidates: BTreeMap<CandidateId, Candidate>,
    /// Number of candidates ever added; the next id is `candidates_count + 1`
    candidates_count: u64,
    sink: Arc<dyn NotificationSink>,
}

impl BallotRegistry {
    /// Create a registry owned by `owner`, seeded with Alice (1) and Bob (2)
    ///
    /// Seeding does not publish notifications.
    pub fn new(owner: Identity, sink: Arc<dyn NotificationSink>) -> Self {
        let mut registry = Self {
            owner,
            candidates: BTreeMap::new(),
            candidates_count: 0,
            sink,
        };

        for name in SEED_CANDIDATES {
            registry.insert_candidate(name.to_string());
        }

        tracing::info!(
            "🗳️  Ballot registry initialized: owner={}, candidates={}",
            owner.short(),
            registry.candidates_count
        );

        registry
    }

    /// Create a registry from configuration
    pub fn from_config(
        config: &crate::config::RegistryConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::new(config.owner, sink)
    }

    /// Register a new candidate. Owner only.
    ///
    /// The name is stored as given; empty and duplicate names are accepted.
    pub fn add_candidate(&mut self, caller: &Identity, name: impl Into<String>) -> Result<CandidateId> {
        self.ensure_owner(caller, "add_candidate")?;

        let name = name.into();
        let id = self.insert_candidate(name.clone());

        tracing::info!("➕ Candidate added: id={}, name={:?}", id, name);
        self.sink.publish(Notification::CandidateAdded { id, name });

        Ok(id)
    }

    /// Count one vote for `candidate_id`
    ///
    /// Any caller may vote, any number of times.
    pub fn vote(&mut self, caller: &Identity, candidate_id: CandidateId) -> Result<()> {
        if !self.is_valid_id(candidate_id) {
            tracing::warn!(
                "🚫 Vote rejected: caller={}, candidate={} (valid range 1..={})",
                caller.short(),
                candidate_id,
                self.candidates_count
            );
            return Err(Error::invalid_reference(candidate_id));
        }

        let candidate = self
            .candidates
            .get_mut(&candidate_id)
            .ok_or_else(|| Error::invalid_reference(candidate_id))?;
        candidate.vote_count += 1;
        let new_count = candidate.vote_count;

        tracing::info!(
            "✅ Vote received: caller={}, candidate={}, count={}",
            caller.short(),
            candidate_id,
            new_count
        );
        self.sink.publish(Notification::VoteReceived {
            id: candidate_id,
            new_count,
        });

        Ok(())
    }

    /// Zero every candidate's counter. Owner only.
    ///
    /// Returns the number of candidates reset, which is `candidates_count`.
    pub fn reset_votes(&mut self, caller: &Identity) -> Result<u64> {
        self.ensure_owner(caller, "reset_votes")?;

        for id in 1..=self.candidates_count {
            if let Some(candidate) = self.candidates.get_mut(&id) {
                candidate.vote_count = 0;
            }
        }

        let count = self.candidates_count;
        tracing::info!("🔄 Votes reset: candidates={}", count);
        self.sink.publish(Notification::VoteReset {
            caller: *caller,
            count,
        });

        Ok(count)
    }

    /// Look up a candidate by id
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(&id)
    }

    /// Number of candidates ever added
    pub fn candidates_count(&self) -> u64 {
        self.candidates_count
    }

    /// Identity recorded at construction
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// All candidates in id order
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    /// Sum of every candidate's counter
    pub fn total_votes(&self) -> u64 {
        self.candidates.values().map(|c| c.vote_count).sum()
    }

    /// Per-candidate tallies in id order
    pub fn results(&self) -> Vec<VoteResult> {
        let total = self.total_votes();

        self.candidates
            .values()
            .map(|candidate| VoteResult {
                candidate_id: candidate.id,
                candidate_name: candidate.name.clone(),
                vote_count: candidate.vote_count,
                percentage: if total == 0 {
                    0.0
                } else {
                    candidate.vote_count as f64 / total as f64 * 100.0
                },
            })
            .collect()
    }

    /// Candidate with the most votes, lowest id on ties, `None` before any vote
    pub fn leader(&self) -> Option<&Candidate> {
        self.candidates
            .values()
            .filter(|c| c.vote_count > 0)
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.vote_count >= c.vote_count => Some(b),
                _ => Some(c),
            })
    }

    fn is_valid_id(&self, id: CandidateId) -> bool {
        (1..=self.candidates_count).contains(&id)
    }

    fn ensure_owner(&self, caller: &Identity, operation: &str) -> Result<()> {
        if caller.ct_eq(&self.owner) {
            Ok(())
        } else {
            tracing::warn!(
                "🚫 {} rejected: caller={} is not the owner",
                operation,
                caller.short()
            );
            Err(Error::Unauthorized)
        }
    }

    fn insert_candidate(&mut self, name: String) -> CandidateId {
        let id = self.candidates_count + 1;
        self.candidates.insert(id, Candidate::new(id, name));
        self.candidates_count = id;
        id
    }
}

impl fmt::Debug for BallotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BallotRegistry")
            .field("owner", &self.owner)
            .field("candidates", &self.candidates)
            .field("candidates_count", &self.candidates_count)
            .finish_non_exhaustive()
    }
}
