use crate::dot::ReplicaId;
use crate::dot_kernel::DotKernel;
use crate::g_counter::CounterValue;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use num_traits::{One, WrappingAdd, Zero};
use serde::{Deserialize, Serialize};

/// C-Counter: a causal counter that, unlike the vector counters, supports
/// reset.
///
/// Each replica's running total lives under a dot in a [`DotKernel`]. An
/// increment folds the replica's previous contribution into one fresh dot
/// carrying the accumulated count, so a replica occupies a single kernel
/// entry at a time. [`reset`](Self::reset) removes every observed entry;
/// increments concurrent with a reset survive it (add-wins), which is the
/// point of making the counter causal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "N: Serialize", deserialize = "N: serde::de::DeserializeOwned"))]
pub struct CCounter<N = u64> {
    kernel: DotKernel<N>,
}

impl<N: CounterValue> CCounter<N> {
    /// Creates a zero counter owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernel::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// Increments by one, returning the delta.
    pub fn increment(&mut self) -> Self {
        self.increment_by(N::one())
    }

    /// Increments by `n`, returning the delta.
    ///
    /// The replica's previous contribution dots are folded into one fresh
    /// dot carrying the accumulated count.
    pub fn increment_by(&mut self, n: N) -> Self {
        let replica = self.kernel.replica();
        let base = self
            .kernel
            .entries()
            .filter(|(dot, _)| dot.replica == replica)
            .fold(N::zero(), |acc, (_, v)| acc.wrapping_add(v));
        let mut delta = self
            .kernel
            .remove_entries_where(|dot, _| dot.replica == replica);
        delta.converge(&self.kernel.insert(base.wrapping_add(&n)));
        Self { kernel: delta }
    }

    /// Removes every contribution observed so far, returning the delta.
    ///
    /// Contributions this replica has not observed are unaffected.
    pub fn reset(&mut self) -> Self {
        Self {
            kernel: self.kernel.remove_all(),
        }
    }

    /// The current value: the wrapping sum of every live contribution.
    pub fn value(&self) -> N {
        self.kernel
            .values()
            .fold(N::zero(), |acc, v| acc.wrapping_add(v))
    }
}

impl<N: CounterValue> Convergent for CCounter<N> {
    fn converge(&mut self, other: &Self) -> bool {
        self.kernel.converge(&other.kernel)
    }
}

impl<N: CounterValue> Causal for CCounter<N> {
    type Scalar = Scalar<N>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    fn clear(&mut self) -> Self {
        self.reset()
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<N>>> {
        self.kernel.to_tokens()
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<N>>>,
    {
        Ok(Self {
            kernel: DotKernel::from_tokens(tokens)?,
        })
    }
}
