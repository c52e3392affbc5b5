//! # Core Types for the Ballot Registry
//!
//! This module defines the data carried through every registry operation:
//! caller identities, candidate records, and tally results.
//!
//! ## Type Categories
//!
//! - [`Identity`]: opaque 32-byte caller reference, compared by equality only
//! - [`CandidateId`]: dense 1-based candidate identifier
//! - [`Candidate`]: a registered nominee and its vote counter
//! - [`VoteResult`]: per-candidate tally with its share of all votes
//!
//! ## Usage Examples
//!
//! ```rust
//! use ballot::types::{Candidate, Identity};
//!
//! let admin = Identity::from_label("admin");
//! assert_eq!(admin, Identity::from_label("admin"));
//! assert_ne!(admin, Identity::from_label("voter"));
//!
//! let candidate = Candidate::new(3, "Carol");
//! assert_eq!(candidate.vote_count, 0);
//! ```

use crate::{Error, Result};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dense, 1-based candidate identifier
///
/// Ids are handed out by the registry in registration order and are never
/// reused. Zero is never a valid id.
pub type CandidateId = u64;

/// Domain separator for label-derived identities
const LABEL_CONTEXT: &str = "ballot 2024-01 identity from label";

/// Domain separator for key-derived identities
const KEY_CONTEXT: &str = "ballot 2024-01 identity from ed25519 key";

/// Opaque caller identity supplied by the hosting environment
///
/// The registry only ever compares identities for equality; it never looks
/// inside them. Identities are 32 bytes and render as lowercase hex.
///
/// # Derivation
///
/// - [`Identity::from_label`]: deterministic, from a human-readable label
/// - [`Identity::from_verifying_key`]: deterministic, from an Ed25519 public key
/// - [`Identity::random`]: fresh random identity
///
/// # Examples
///
/// ```rust
/// use ballot::types::Identity;
///
/// let owner = Identity::random();
/// let parsed: Identity = owner.to_hex().parse().unwrap();
/// assert_eq!(owner, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; 32]);

impl Identity {
    /// Wrap raw identity bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an identity from a label with Blake3 key derivation
    pub fn from_label(label: &str) -> Self {
        Self(blake3::derive_key(LABEL_CONTEXT, label.as_bytes()))
    }

    /// Derive an identity from an Ed25519 verifying key
    ///
    /// Hosts that authenticate callers by signature can hand the registry the
    /// identity of the verified key without the registry knowing about keys.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(blake3::derive_key(KEY_CONTEXT, key.as_bytes()))
    }

    /// Generate a random identity
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }

    /// Raw identity bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex identity
    pub fn from_hex(encoded: &str) -> Result<Self> {
        if encoded.len() != 64 {
            return Err(Error::identity(format!(
                "expected 64 hex characters, got {}",
                encoded.len()
            )));
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(encoded, &mut bytes)
            .map_err(|e| Error::identity(format!("invalid hex string: {e}")))?;
        Ok(Self(bytes))
    }

    /// Compare two identities in constant time
    pub fn ct_eq(&self, other: &Identity) -> bool {
        use subtle::ConstantTimeEq;
        self.0.ct_eq(&other.0).into()
    }

    /// Short prefix for log lines
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short())
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_hex()
    }
}

/// A registered nominee
///
/// Candidates are created only by the registry. They are never deleted;
/// `vote_count` changes only by a vote (+1) or a reset (back to 0).
///
/// The name is whatever the owner supplied. Empty and duplicate names are
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Registry-assigned id, unique and sequential from 1
    pub id: CandidateId,

    /// Display name
    pub name: String,

    /// Votes received since registration or the last reset
    pub vote_count: u64,
}

impl Candidate {
    /// Create a candidate with no votes
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vote_count: 0,
        }
    }
}

/// Aggregated tally for a single candidate
///
/// # Examples
///
/// ```rust
/// use ballot::types::VoteResult;
///
/// let result = VoteResult {
///     candidate_id: 1,
///     candidate_name: "Alice".to_string(),
///     vote_count: 3,
///     percentage: 75.0,
/// };
///
/// println!("{}: {} votes ({:.1}%)", result.candidate_name, result.vote_count, result.percentage);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    /// Id of the tallied candidate
    pub candidate_id: CandidateId,

    /// Name of the tallied candidate
    pub candidate_name: String,

    /// Current vote counter
    pub vote_count: u64,

    /// Share of all votes cast, `0.0` when nothing has been cast yet
    pub percentage: f64,
}
