use crate::dot::ReplicaId;
use crate::dot_kernel::DotKernel;
use crate::tokens::{Scalar, Token};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One live binding held by an [`ORMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// OR-Map: an observed-remove map CRDT.
///
/// Bindings are `(key, value)` entries tagged with dots. Writing a key
/// supersedes the entries the writer has observed for that key - removal by
/// *key equality*, even though entries also carry values - and mints a
/// fresh entry. Concurrent writes to the same key all survive;
/// [`get`](Self::get) resolves them to the causally latest one and
/// [`get_all`](Self::get_all) exposes the conflict.
///
/// Removing a key concurrent with a write keeps the write (add-wins), the
/// same rule as [`ORSet`](crate::ORSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: serde::de::DeserializeOwned, V: serde::de::DeserializeOwned"
))]
pub struct ORMap<K, V> {
    kernel: DotKernel<MapEntry<K, V>>,
}

impl<K, V> ORMap<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Creates an empty map owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            kernel: DotKernel::new(replica),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.kernel.replica()
    }

    /// Binds `key` to `value`, superseding the key's observed entries.
    ///
    /// Returns the delta.
    pub fn insert(&mut self, key: K, value: V) -> Self {
        let mut delta = self.kernel.remove_where(|entry| entry.key == key);
        delta.converge(&self.kernel.insert(MapEntry { key, value }));
        Self { kernel: delta }
    }

    /// Unbinds `key` by dropping its observed entries, returning the delta.
    pub fn remove(&mut self, key: &K) -> Self {
        Self {
            kernel: self.kernel.remove_where(|entry| entry.key == *key),
        }
    }

    /// The causally latest value bound to `key`, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.kernel
            .entries()
            .filter(|(_, entry)| entry.key == *key)
            .last()
            .map(|(_, entry)| &entry.value)
    }

    /// Every concurrent value bound to `key`, in dot order.
    pub fn get_all(&self, key: &K) -> Vec<&V> {
        self.kernel
            .entries()
            .filter(|(_, entry)| entry.key == *key)
            .map(|(_, entry)| &entry.value)
            .collect()
    }

    /// Returns true if `key` has at least one live binding.
    pub fn contains_key(&self, key: &K) -> bool {
        self.kernel.values().any(|entry| entry.key == *key)
    }

    /// Iterates the distinct keys currently bound.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        let distinct: BTreeSet<&K> = self.kernel.values().map(|entry| &entry.key).collect();
        distinct.into_iter()
    }

    /// Number of distinct keys currently bound.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    /// Returns true if the map has no live bindings.
    pub fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }
}

impl<K, V> Convergent for ORMap<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn converge(&mut self, other: &Self) -> bool {
        self.kernel.converge(&other.kernel)
    }
}

impl<K, V> Causal for ORMap<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    type Scalar = Scalar<MapEntry<K, V>>;

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

    fn to_tokens(&self) -> Vec<Token<Scalar<MapEntry<K, V>>>> {
        self.kernel.to_tokens()
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<MapEntry<K, V>>>>,
    {
        Ok(Self {
            kernel: DotKernel::from_tokens(tokens)?,
        })
    }
}
