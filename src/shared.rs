//! Thread-safe handle around a [`BallotRegistry`]
//!
//! One `RwLock` guards the whole registry, so every operation is applied
//! atomically with respect to every other. Reads return owned snapshots.

use crate::registry::BallotRegistry;
use crate::types::{Candidate, CandidateId, Identity, VoteResult};
use crate::{Result, internal_error};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, `Send + Sync` registry handle
#[derive(Clone, Debug)]
pub struct SharedRegistry {
    inner: Arc<RwLock<BallotRegistry>>,
}

impl SharedRegistry {
    /// Wrap a registry for sharing across threads
    pub fn new(registry: BallotRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Register a new candidate. Owner only.
    pub fn add_candidate(&self, caller: &Identity, name: impl Into<String>) -> Result<CandidateId> {
        let name = name.into();
        self.apply("add_candidate", |registry| registry.add_candidate(caller, name))
    }

    /// Count one vote for `candidate_id`
    pub fn vote(&self, caller: &Identity, candidate_id: CandidateId) -> Result<()> {
        self.apply("vote", |registry| registry.vote(caller, candidate_id))
    }

    /// Zero every candidate's counter. Owner only.
    pub fn reset_votes(&self, caller: &Identity) -> Result<u64> {
        self.apply("reset_votes", |registry| registry.reset_votes(caller))
    }

    /// Snapshot of a candidate by id
    pub fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.read()?.candidate(id).cloned())
    }

    /// Number of candidates ever added
    pub fn candidates_count(&self) -> Result<u64> {
        Ok(self.read()?.candidates_count())
    }

    /// Identity recorded at construction
    pub fn owner(&self) -> Result<Identity> {
        Ok(*self.read()?.owner())
    }

    /// Snapshot of all candidates in id order
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.read()?.candidates().cloned().collect())
    }

    /// Sum of every candidate's counter
    pub fn total_votes(&self) -> Result<u64> {
        Ok(self.read()?.total_votes())
    }

    /// Per-candidate tallies in id order
    pub fn results(&self) -> Result<Vec<VoteResult>> {
        Ok(self.read()?.results())
    }

    /// Candidate with the most votes, lowest id on ties
    pub fn leader(&self) -> Result<Option<Candidate>> {
        Ok(self.read()?.leader().cloned())
    }

    /// Run a mutation under the write guard
    ///
    /// Rejected preconditions are already logged by the registry; anything
    /// else means the registry itself is unusable.
    fn apply<T>(
        &self,
        operation: &str,
        mutation: impl FnOnce(&mut BallotRegistry) -> Result<T>,
    ) -> Result<T> {
        let result = self.write().and_then(|mut registry| mutation(&mut *registry));

        if let Err(e) = &result {
            if !e.is_precondition() {
                tracing::error!("❌ Shared registry {} failed: {}", operation, e);
            }
        }

        result
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BallotRegistry>> {
        self.inner
            .read()
            .map_err(|_| internal_error!("Registry read error"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BallotRegistry>> {
        self.inner
            .write()
            .map_err(|_| internal_error!("Registry write error"))
    }
}

impl From<BallotRegistry> for SharedRegistry {
    fn from(registry: BallotRegistry) -> Self {
        Self::new(registry)
    }
}
