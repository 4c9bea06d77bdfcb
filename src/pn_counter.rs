use crate::dot::ReplicaId;
use crate::g_counter::{CounterValue, GCounter};
use crate::tokens::{Scalar, Token, TokenReader};
use crate::traits::{Causal, Convergent, CrdtError};
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// PN-Counter: a counter CRDT supporting both increments and decrements.
///
/// Internally a pair of [`GCounter`]s keyed by the same replica id: one
/// accumulates increments, the other decrements. The value is the signed
/// difference, computed in `i128` so it cannot overflow for any `N` up to
/// `u64`.
///
/// # Algebraic Properties
///
/// - **Commutativity**: merge order does not affect the final value.
/// - **Associativity**: Yes.
/// - **Idempotence**: merging the same state twice changes nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PNCounter<N = u64> {
    replica: ReplicaId,
    pos: GCounter<N>,
    neg: GCounter<N>,
}

impl<N: CounterValue> PNCounter<N> {
    /// Creates a zero counter owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            pos: GCounter::new(replica),
            neg: GCounter::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    /// Increments by one, returning the delta.
    pub fn increment(&mut self) -> Self {
        self.increment_by(N::one())
    }

    /// Increments by `n`, returning the delta.
    pub fn increment_by(&mut self, n: N) -> Self {
        Self {
            replica: self.replica,
            pos: self.pos.increment_by(n),
            neg: GCounter::new(self.replica),
        }
    }

    /// Decrements by one, returning the delta.
    pub fn decrement(&mut self) -> Self {
        self.decrement_by(N::one())
    }

    /// Decrements by `n`, returning the delta.
    pub fn decrement_by(&mut self, n: N) -> Self {
        Self {
            replica: self.replica,
            pos: GCounter::new(self.replica),
            neg: self.neg.increment_by(n),
        }
    }

    /// The current value: `sum(increments) - sum(decrements)`, widened to
    /// `i128`.
    pub fn value(&self) -> i128 {
        let pos: u128 = self.pos.value().into();
        let neg: u128 = self.neg.value().into();
        pos as i128 - neg as i128
    }

    /// Structural comparison: true iff both underlying counters match
    /// entry for entry.
    pub fn state_eq(&self, other: &Self) -> bool {
        self.pos.state_eq(&other.pos) && self.neg.state_eq(&other.neg)
    }
}

impl<N: CounterValue> PartialEq for PNCounter<N> {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<N: CounterValue> Eq for PNCounter<N> {}

impl<N: CounterValue> PartialOrd for PNCounter<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: CounterValue> Ord for PNCounter<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl<N: CounterValue> Convergent for PNCounter<N> {
    fn converge(&mut self, other: &Self) -> bool {
        let pos_changed = self.pos.converge(&other.pos);
        let neg_changed = self.neg.converge(&other.neg);
        pos_changed || neg_changed
    }
}

impl<N: CounterValue> Causal for PNCounter<N> {
    type Scalar = Scalar<N>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.pos.is_empty() && self.neg.is_empty()
    }

    /// No-op returning an empty delta: a grow-only vector pair has no
    /// causally sound reset.
    fn clear(&mut self) -> Self {
        Self::new(self.replica)
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<N>>> {
        let mut out = vec![Token::Count(3), Token::Scalar(Scalar::Replica(self.replica))];
        self.pos.write_data(&mut out);
        self.neg.write_data(&mut out);
        out
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<N>>>,
    {
        let mut reader = TokenReader::new(tokens);
        reader.expect_count(3)?;
        let replica = reader.replica()?;
        let pos = GCounter::read_data(&mut reader)?;
        let neg = GCounter::read_data(&mut reader)?;
        reader.finish()?;
        Ok(Self {
            replica,
            pos: GCounter::from_parts(replica, pos),
            neg: GCounter::from_parts(replica, neg),
        })
    }
}
