// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use crate::dot::ReplicaId;
use crate::dot_kernel_single::DotKernelSingle;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};

/// LWW-Register: a last-writer-wins register whose winner is chosen
/// causally.
///
/// Built on [`DotKernelSingle`], which keeps at most one live dot per
/// replica: a replica's newer write supersedes its older one outright.
/// Writes from different replicas that are concurrent all stay live, and
/// [`get`](Self::get) resolves them deterministically to the value under
/// the greatest dot in `(replica, seq)` order - no wall clock involved, so
/// two replicas holding the same dots always agree on the winner.
///
/// # Example
///
/// ```
/// use delta_crdt_types::{Convergent, LWWRegister};
///
/// let mut a = LWWRegister::new(1);
/// let mut b = LWWRegister::new(2);
///
/// b.converge(&a.set("v1"));
/// let delta = a.set("v2");
/// b.converge(&delta);
/// assert_eq!(b.get(), Some(&"v2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: serde::de::DeserializeOwned"))]
pub struct LWWRegister<T> {
    kernel: DotKernelSingle<T>,
}

impl<T: Clone> LWWRegister<T> {
    /// Creates an empty register owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernelSingle::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// Writes a value, superseding this replica's previous write.
    pub fn set(&mut self, value: T) -> Self {
        Self {
            kernel: self.kernel.set(value),
        }
    }

    /// The winning value: the one under the greatest live dot.
    pub fn get(&self) -> Option<&T> {
        self.kernel.entries().last().map(|(_, value)| value)
    }

    /// Every live candidate in dot order; the last one is the winner.
    pub fn candidates(&self) -> impl Iterator<Item = &T> {
        self.kernel.entries().map(|(_, value)| value)
    }
}

impl<T: Clone> Convergent for LWWRegister<T> {
    fn converge(&mut self, other: &Self) -> bool {
        self.kernel.converge(&other.kernel)
    }
}

impl<T: Clone> Causal for LWWRegister<T> {
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
            kernel: DotKernelSingle::from_tokens(tokens)?,
        })
    }
}
