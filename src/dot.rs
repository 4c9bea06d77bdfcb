use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a replica. Uniqueness across the cluster is the caller's
/// responsibility.
///
/// Id [`READ_ONLY_REPLICA`] (zero) is reserved for read-only replicas: they
/// may receive merges but never originate events, so every mutator on a
/// replica-0 instance is a no-op returning an empty delta.
pub type ReplicaId = u64;

/// Per-replica event index, monotonically increasing from 1. Seq 0 means
/// "no event" and never appears in a [`Dot`] minted by a context.
pub type SeqNum = u64;

/// The reserved read-only replica id.
pub const READ_ONLY_REPLICA: ReplicaId = 0;

/// A globally unique identifier for a single event on a single replica.
///
/// Dots order lexicographically by `(replica, seq)`; equality is
/// component-wise.
///
/// # Example
///
/// ```
/// use delta_crdt_types::Dot;
///
/// let early = Dot::new(1, 1);
/// let late = Dot::new(1, 2);
/// assert!(early < late);
/// assert!(late < Dot::new(2, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dot {
    /// The replica that produced the event.
    pub replica: ReplicaId,
    /// The event's index on that replica.
    pub seq: SeqNum,
}

impl Dot {
    /// Creates a dot for the given replica and sequence number.
    pub const fn new(replica: ReplicaId, seq: SeqNum) -> Self {
        Self { replica, seq }
    }
}

impl fmt::Display for Dot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.replica, self.seq)
    }
}
