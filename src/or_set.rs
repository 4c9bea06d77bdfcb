use crate::dot::ReplicaId;
use crate::dot_context::DotContext;
use crate::dot_kernel::DotKernel;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OR-Set: an observed-remove set CRDT with add-wins semantics.
///
/// Every insertion is tagged with a fresh dot; removal drops the dots the
/// removing replica has *observed* for the element. An insertion concurrent
/// with a removal therefore survives - its dot was not observed by the
/// remover - which is what makes the set add-wins.
///
/// # Algebraic Properties
/// - **Commutativity**: merge order does not affect the final contents.
/// - **Idempotence**: merging the same state multiple times is safe.
/// - **Convergence**: all replicas eventually reach the same contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ORSet<T> {
    kernel: DotKernel<T>,
}

impl<T: Clone + Ord> ORSet<T> {
    /// Creates an empty set owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernel::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// The causal history this set has observed.
    pub fn context(&self) -> &DotContext {
        self.kernel.context()
    }

    /// Adds an element, returning the delta.
    ///
    /// The element's previously observed dots are superseded by the fresh
    /// one, so repeated inserts do not accumulate tags.
    pub fn insert(&mut self, element: T) -> Self {
        let mut delta = self.kernel.remove_value(&element);
        delta.converge(&self.kernel.insert(element));
        Self { kernel: delta }
    }

    /// Removes an element by dropping its observed dots, returning the
    /// delta.
    pub fn remove(&mut self, element: &T) -> Self {
        Self {
            kernel: self.kernel.remove_value(element),
        }
    }

    /// Returns true if the set contains the element.
    pub fn contains(&self, element: &T) -> bool {
        self.kernel.values().any(|held| held == element)
    }

    /// Iterates the distinct elements currently in the set.
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        let distinct: BTreeSet<&T> = self.kernel.values().collect();
        distinct.into_iter()
    }

    /// Number of distinct elements in the set.
    pub fn len(&self) -> usize {
        self.elements().count()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }
}

impl<T: Clone + Ord> Convergent for ORSet<T> {
    fn converge(&mut self, other: &Self) -> bool {
        self.kernel.converge(&other.kernel)
    }
}

impl<T: Clone + Ord> Causal for ORSet<T> {
    type Scalar = Scalar<T>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    fn clear(&mut self) -> Self {
        Self {
            kernel: self.kernel.remove_all(),
        }
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<T>>> {
        self.kernel.to_tokens()
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<T>>>,
    {
        Ok(Self {
            kernel: DotKernel::from_tokens(tokens)?,
        })
    }
}
