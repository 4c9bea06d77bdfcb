// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use crate::dot::ReplicaId;
use crate::dot_kernel::DotKernel;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};

/// MV-Register: a multi-value register CRDT.
///
/// A write causally overshadows every version the writer has observed and
/// installs the new value under a fresh dot. Writes made without knowledge
/// of each other all survive, so after a merge the register can hold
/// several concurrent values - the client sees all of them and decides.
///
/// # Example
///
/// ```
/// use delta_crdt_types::{Convergent, MVRegister};
///
/// let mut a = MVRegister::new(1);
/// let mut b = MVRegister::new(2);
///
/// a.set("left");
/// b.set("right");
///
/// a.converge(&b);
/// let mut values = a.read();
/// values.sort();
/// assert_eq!(values, vec![&"left", &"right"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: serde::de::DeserializeOwned"))]
pub struct MVRegister<T> {
    kernel: DotKernel<T>,
}

impl<T: Clone> MVRegister<T> {
    /// Creates an empty register owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernel::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// Writes a value, overshadowing every version observed so far.
    ///
    /// Returns the delta: the removal of the observed versions plus the new
    /// value under its fresh dot.
    pub fn set(&mut self, value: T) -> Self {
        let mut delta = self.kernel.remove_all();
        delta.converge(&self.kernel.insert(value));
        Self { kernel: delta }
    }

    /// The versions currently held: one value per surviving concurrent
    /// write.
    pub fn read(&self) -> Vec<&T> {
        self.kernel.values().collect()
    }
}

impl<T: Clone> Convergent for MVRegister<T> {
    fn converge(&mut self, other: &Self) -> bool {
        self.kernel.converge(&other.kernel)
    }
}

impl<T: Clone> Causal for MVRegister<T> {
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
