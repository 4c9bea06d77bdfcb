use crate::dot::{Dot, ReplicaId};
use crate::dot_context::DotContext;
use crate::dot_kernel::DotKernel;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};

/// A [`DotKernel`] variant keeping at most one live dot per replica.
///
/// `set` drops the issuing replica's previous dot from the map before
/// minting the new one; the superseded dot survives in the context and
/// rides in the delta's context, so the delta alone retires the old value
/// on any receiver. When a merge brings in two live dots for the same
/// replica, the one with the higher sequence number wins and the loser is
/// retained only in the context.
///
/// This is the engine for last-writer-wins registers whose winner is chosen
/// causally rather than by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "V: Serialize", deserialize = "V: serde::de::DeserializeOwned"))]
pub struct DotKernelSingle<V> {
    kernel: DotKernel<V>,
}

impl<V> DotKernelSingle<V> {
    /// Creates an empty kernel owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernel::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// The causal history this kernel has observed.
    pub fn context(&self) -> &DotContext {
        self.kernel.context()
    }

    /// Iterates the live `(dot, value)` pairs in dot order.
    pub fn entries(&self) -> impl Iterator<Item = (Dot, &V)> {
        self.kernel.entries()
    }

    /// Returns true if the kernel holds no live values.
    pub fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    /// Records `value` under a fresh dot, superseding this replica's
    /// previous dot (if any).
    pub fn set(&mut self, value: V) -> Self
    where
        V: Clone,
    {
        let replica = self.kernel.replica();
        let mut delta = self
            .kernel
            .remove_entries_where(|dot, _| dot.replica == replica);
        delta.converge(&self.kernel.insert(value));
        Self { kernel: delta }
    }

    /// Drops every entry.
    pub fn remove_all(&mut self) -> Self {
        Self {
            kernel: self.kernel.remove_all(),
        }
    }

    /// Drops superseded dots: whenever a replica holds more than one live
    /// dot, only the highest sequence number survives in the map.
    fn prune(&mut self) -> bool {
        let map = self.kernel.map_mut();
        let mut losers = Vec::new();
        let mut prev: Option<Dot> = None;
        for &dot in map.keys() {
            if let Some(p) = prev {
                if p.replica == dot.replica {
                    losers.push(p);
                }
            }
            prev = Some(dot);
        }
        let pruned = !losers.is_empty();
        for dot in losers {
            map.remove(&dot);
        }
        pruned
    }
}

impl<V: Clone> Convergent for DotKernelSingle<V> {
    fn converge(&mut self, other: &Self) -> bool {
        let mut changed = self.kernel.converge(&other.kernel);
        changed |= self.prune();
        changed
    }
}

impl<V: Clone> Causal for DotKernelSingle<V> {
    type Scalar = Scalar<V>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    fn clear(&mut self) -> Self {
        self.remove_all()
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<V>>> {
        self.kernel.to_tokens()
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<V>>>,
    {
        let mut single = Self {
            kernel: DotKernel::from_tokens(tokens)?,
        };
        single.prune();
        Ok(single)
    }
}
