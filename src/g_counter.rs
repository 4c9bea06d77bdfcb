// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use crate::dot::{ReplicaId, READ_ONLY_REPLICA};
use crate::tokens::{Scalar, Token, TokenReader};
use crate::traits::{Causal, Convergent, CrdtError};
use num_traits::{One, PrimInt, Unsigned, WrappingAdd, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Bounds for the integer type a counter accumulates.
///
/// Satisfied by `u8` through `u64`. Per-entry arithmetic wraps on overflow.
pub trait CounterValue: Unsigned + PrimInt + WrappingAdd + Into<u128> {}
impl<T> CounterValue for T where T: Unsigned + PrimInt + WrappingAdd + Into<u128> {}

/// G-Counter: a grow-only counter CRDT.
///
/// Each replica accumulates its own entry; the counter's value is the sum
/// of all entries. Convergence takes the per-replica maximum, so entries
/// are monotonically non-decreasing and merges in any order, with
/// duplicates, reach the same state.
///
/// # Key Properties
///
/// - **Grow-only**: the counter can only increase. Decrements are not
///   supported (see [`PNCounter`](crate::PNCounter)).
/// - **Delta-based**: every increment returns a delta carrying only the
///   issuing replica's new entry.
/// - **Value equality**: `==` and ordering compare counter *values*;
///   [`state_eq`](Self::state_eq) compares the underlying entries.
///
/// # Algebraic Properties
///
/// - **Commutativity**: Yes.
/// - **Associativity**: Yes.
/// - **Idempotence**: Yes.
///
/// # Example
///
/// ```
/// use delta_crdt_types::{Convergent, GCounter};
///
/// let mut a = GCounter::<u64>::new(1);
/// let mut b = GCounter::<u64>::new(2);
///
/// a.increment_by(10);
/// let delta = b.increment_by(20);
///
/// a.converge(&delta);
/// assert_eq!(a.value(), 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GCounter<N = u64> {
    replica: ReplicaId,
    data: BTreeMap<ReplicaId, N>,
}

impl<N: CounterValue> GCounter<N> {
    /// Creates a zero counter owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            data: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(replica: ReplicaId, data: BTreeMap<ReplicaId, N>) -> Self {
        Self { replica, data }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    /// Increments this replica's entry by one.
    pub fn increment(&mut self) -> Self {
        self.increment_by(N::one())
    }

    /// Increments this replica's entry by `n`.
    ///
    /// Returns the delta carrying the new entry. On a read-only replica
    /// (id 0) this is a no-op returning an empty delta.
    pub fn increment_by(&mut self, n: N) -> Self {
        let mut delta = Self::new(self.replica);
        if self.replica == READ_ONLY_REPLICA {
            return delta;
        }
        let total = self
            .data
            .get(&self.replica)
            .copied()
            .unwrap_or_else(N::zero)
            .wrapping_add(&n);
        self.data.insert(self.replica, total);
        delta.data.insert(self.replica, total);
        delta
    }

    /// The total value: the wrapping sum of every replica's entry.
    pub fn value(&self) -> N {
        self.data
            .values()
            .fold(N::zero(), |acc, v| acc.wrapping_add(v))
    }

    /// The entry accumulated by a specific replica.
    pub fn count_for(&self, replica: ReplicaId) -> N {
        self.data.get(&replica).copied().unwrap_or_else(N::zero)
    }

    /// Structural comparison: true iff every per-replica entry matches.
    ///
    /// Two counters can be `==` (same value) while `state_eq` is false.
    pub fn state_eq(&self, other: &Self) -> bool {
        self.data == other.data
    }

    pub(crate) fn write_data(&self, out: &mut Vec<Token<Scalar<N>>>) {
        out.push(Token::Count(2 * self.data.len() as u64));
        for (&replica, &count) in &self.data {
            out.push(Token::Scalar(Scalar::Replica(replica)));
            out.push(Token::Scalar(Scalar::Value(count)));
        }
    }

    pub(crate) fn read_data<I>(
        reader: &mut TokenReader<N, I>,
    ) -> Result<BTreeMap<ReplicaId, N>, CrdtError>
    where
        I: Iterator<Item = Token<Scalar<N>>>,
    {
        let entries = reader.entries(2)?;
        let mut data = BTreeMap::new();
        for _ in 0..entries {
            let replica = reader.replica()?;
            let count = reader.value()?;
            data.insert(replica, count);
        }
        Ok(data)
    }
}

impl<N: CounterValue> PartialEq for GCounter<N> {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<N: CounterValue> Eq for GCounter<N> {}

impl<N: CounterValue> PartialOrd for GCounter<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: CounterValue> Ord for GCounter<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl<N: CounterValue> Convergent for GCounter<N> {
    fn converge(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (&replica, &theirs) in &other.data {
            match self.data.entry(replica) {
                Entry::Vacant(slot) => {
                    slot.insert(theirs);
                    changed = true;
                }
                Entry::Occupied(mut slot) => {
                    if theirs > *slot.get() {
                        slot.insert(theirs);
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}

impl<N: CounterValue> Causal for GCounter<N> {
    type Scalar = Scalar<N>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A grow-only vector has no causally sound reset, so `clear` leaves
    /// the state untouched and returns an empty delta.
    fn clear(&mut self) -> Self {
        Self::new(self.replica)
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<N>>> {
        let mut out = vec![Token::Count(2), Token::Scalar(Scalar::Replica(self.replica))];
        self.write_data(&mut out);
        out
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<N>>>,
    {
        let mut reader = TokenReader::new(tokens);
        reader.expect_count(2)?;
        let replica = reader.replica()?;
        let data = Self::read_data(&mut reader)?;
        reader.finish()?;
        Ok(Self { replica, data })
    }
}
