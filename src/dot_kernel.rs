use crate::dot::{Dot, ReplicaId, READ_ONLY_REPLICA};
use crate::dot_context::DotContext;
use crate::tokens::{Scalar, Token, TokenReader};
use crate::traits::{Causal, Convergent, CrdtError};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// The causal memory shared by every observed-remove CRDT in this crate.
///
/// A kernel pairs a [`DotContext`] with a map from dots to user values.
/// Every mapped dot is also in the context; a dot that is in the context but
/// not in the map records an event whose value was **removed** - its causal
/// existence keeps suppressing stale re-additions on merge. Values are
/// immutable once set: mutation is add-new-dot / remove-old-dot.
///
/// Mutators return a delta of the same type carrying only the dots they
/// touched. On a read-only replica (id 0) every mutator is a no-op
/// returning an empty delta.
///
/// # Example
///
/// ```
/// use delta_crdt_types::{Convergent, DotKernel};
///
/// let mut a = DotKernel::new(1);
/// let mut b = DotKernel::new(2);
///
/// b.converge(&a.insert("x"));
/// let removal = b.remove_value(&"x");
/// a.converge(&removal);
/// assert!(a.values().next().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "V: Serialize", deserialize = "V: serde::de::DeserializeOwned"))]
pub struct DotKernel<V> {
    replica: ReplicaId,
    ctx: DotContext,
    #[serde(
        serialize_with = "serialize_entries",
        deserialize_with = "deserialize_entries"
    )]
    map: BTreeMap<Dot, V>,
}

fn serialize_entries<V, S>(map: &BTreeMap<Dot, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: serde::Serializer,
{
    // JSON object keys must be strings, so dot-keyed maps go out as a
    // sequence of (dot, value) pairs.
    serializer.collect_seq(map.iter())
}

fn deserialize_entries<'de, V, D>(deserializer: D) -> Result<BTreeMap<Dot, V>, D::Error>
where
    V: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    let entries: Vec<(Dot, V)> = Vec::deserialize(deserializer)?;
    Ok(entries.into_iter().collect())
}

impl<V> DotKernel<V> {
    /// Creates an empty kernel owned by `replica`.
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            ctx: DotContext::new(),
            map: BTreeMap::new(),
        }
    }

    /// The owning replica's id.
    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    /// The causal history this kernel has observed.
    pub fn context(&self) -> &DotContext {
        &self.ctx
    }

    /// Iterates the live values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    /// Iterates the live `(dot, value)` pairs in dot order.
    pub fn entries(&self) -> impl Iterator<Item = (Dot, &V)> {
        self.map.iter().map(|(&dot, value)| (dot, value))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the kernel holds no live values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn map_mut(&mut self) -> &mut BTreeMap<Dot, V> {
        &mut self.map
    }

    /// Records `value` under a freshly minted dot.
    ///
    /// The returned delta carries just the new pair and a context containing
    /// only the new dot.
    pub fn insert(&mut self, value: V) -> Self
    where
        V: Clone,
    {
        let mut delta = Self::new(self.replica);
        if self.replica == READ_ONLY_REPLICA {
            return delta;
        }
        let dot = self.ctx.next_dot(self.replica);
        self.map.insert(dot, value.clone());
        delta.ctx.insert(dot);
        delta.map.insert(dot, value);
        delta
    }

    /// Drops every entry the predicate selects, by dot and value.
    ///
    /// The delta's context collects the dropped dots and its map stays
    /// empty; merging it elsewhere performs the same removal.
    pub fn remove_entries_where<F>(&mut self, pred: F) -> Self
    where
        F: Fn(Dot, &V) -> bool,
    {
        let mut delta = Self::new(self.replica);
        if self.replica == READ_ONLY_REPLICA {
            return delta;
        }
        let dropped: Vec<Dot> = self
            .map
            .iter()
            .filter(|&(&dot, value)| pred(dot, value))
            .map(|(&dot, _)| dot)
            .collect();
        for dot in dropped {
            self.map.remove(&dot);
            delta.ctx.insert_with(dot, false);
        }
        delta.ctx.compact();
        delta
    }

    /// Drops every entry whose value the predicate selects.
    pub fn remove_where<F>(&mut self, pred: F) -> Self
    where
        F: Fn(&V) -> bool,
    {
        self.remove_entries_where(|_, value| pred(value))
    }

    /// Drops every entry equal to `value` under the supplied equality
    /// function.
    ///
    /// Taking the equality as a parameter lets CRDTs built on the kernel
    /// remove by key-equality even when values carry extra fields.
    pub fn remove_by<F>(&mut self, value: &V, eq: F) -> Self
    where
        F: Fn(&V, &V) -> bool,
    {
        self.remove_entries_where(|_, held| eq(value, held))
    }

    /// Drops every entry equal to `value`.
    pub fn remove_value(&mut self, value: &V) -> Self
    where
        V: PartialEq,
    {
        self.remove_by(value, |a, b| a == b)
    }

    /// Drops every entry.
    pub fn remove_all(&mut self) -> Self {
        self.remove_entries_where(|_, _| true)
    }
}

/// Equality compares causal state and live values; the owning replica id is
/// identity, not state, and is excluded.
impl<V: PartialEq> PartialEq for DotKernel<V> {
    fn eq(&self, other: &Self) -> bool {
        self.ctx == other.ctx && self.map == other.map
    }
}

impl<V: Eq> Eq for DotKernel<V> {}

impl<V: Clone> Convergent for DotKernel<V> {
    fn converge(&mut self, other: &Self) -> bool {
        let mut changed = false;
        // Add: events we have never observed.
        for (&dot, value) in &other.map {
            if !self.ctx.contains(dot) {
                if let Entry::Vacant(slot) = self.map.entry(dot) {
                    slot.insert(value.clone());
                    changed = true;
                }
            }
        }
        // Remove: events the other side observed and chose not to retain.
        let stale: Vec<Dot> = self
            .map
            .keys()
            .copied()
            .filter(|&dot| !other.map.contains_key(&dot) && other.ctx.contains(dot))
            .collect();
        for dot in stale {
            self.map.remove(&dot);
            changed = true;
        }
        // History: finalize so future merges are idempotent.
        changed |= self.ctx.converge(&other.ctx);
        changed
    }
}

impl<V: Clone> Causal for DotKernel<V> {
    type Scalar = Scalar<V>;

    fn create(replica: ReplicaId) -> Self {
        Self::new(replica)
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&mut self) -> Self {
        self.remove_all()
    }

    fn to_tokens(&self) -> Vec<Token<Scalar<V>>> {
        let mut out = vec![Token::Count(3), Token::Scalar(Scalar::Replica(self.replica))];
        out.push(Token::Count(3 * self.map.len() as u64));
        for (dot, value) in &self.map {
            out.push(Token::Scalar(Scalar::Replica(dot.replica)));
            out.push(Token::Scalar(Scalar::Seq(dot.seq)));
            out.push(Token::Scalar(Scalar::Value(value.clone())));
        }
        self.ctx.write_tokens(&mut out);
        out
    }

    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<V>>>,
    {
        let mut reader = TokenReader::new(tokens);
        reader.expect_count(3)?;
        let replica = reader.replica()?;
        let entries = reader.entries(3)?;
        let mut map = BTreeMap::new();
        for _ in 0..entries {
            let dot_replica = reader.replica()?;
            let seq = reader.seq()?;
            let value = reader.value()?;
            map.insert(Dot::new(dot_replica, seq), value);
        }
        let ctx = DotContext::read_tokens(&mut reader)?;
        reader.finish()?;
        for &dot in map.keys() {
            if !ctx.contains(dot) {
                return Err(CrdtError::MalformedTokens(format!(
                    "mapped dot {dot} missing from context"
                )));
            }
        }
        Ok(Self { replica, ctx, map })
    }
}
