use crate::dot::{Dot, ReplicaId, SeqNum};
use crate::tokens::{Scalar, Token, TokenReader};
use crate::traits::{Convergent, CrdtError};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// A compact set of every dot any replica has ever observed locally.
///
/// The context remembers, per replica, a **dense prefix** `[1..=head]` of
/// contiguous sequence numbers plus a **gap set** of later, out-of-order
/// dots. Compaction folds any contiguous run at the front of the gap set
/// into the dense prefix, so the common case of sequential events costs one
/// map entry per replica.
///
/// # Example
///
/// ```
/// use delta_crdt_types::{Dot, DotContext};
///
/// let mut ctx = DotContext::new();
/// ctx.insert(Dot::new(1, 2));
/// ctx.insert(Dot::new(1, 3));
/// assert!(!ctx.contains(Dot::new(1, 1)));
///
/// // Filling the hole collapses the run into the dense prefix.
/// ctx.insert(Dot::new(1, 1));
/// assert!(ctx.contains(Dot::new(1, 3)));
/// assert_eq!(ctx.next_dot(1), Dot::new(1, 4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotContext {
    /// Per-replica head of the dense prefix: all seqs in `[1..=head]` are
    /// observed.
    dense: BTreeMap<ReplicaId, SeqNum>,
    /// Observed dots above the dense prefix.
    gaps: BTreeSet<Dot>,
}

impl DotContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no dot has ever been observed.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty() && self.gaps.is_empty()
    }

    /// Head of the dense prefix for `replica` (0 if none).
    pub fn max_contiguous(&self, replica: ReplicaId) -> SeqNum {
        self.dense.get(&replica).copied().unwrap_or(0)
    }

    /// Returns true if `dot` has been observed.
    pub fn contains(&self, dot: Dot) -> bool {
        dot.seq <= self.max_contiguous(dot.replica) || self.gaps.contains(&dot)
    }

    /// Records an observed dot and compacts.
    pub fn insert(&mut self, dot: Dot) {
        self.insert_with(dot, true);
    }

    /// Records an observed dot, optionally deferring compaction.
    ///
    /// Deferring is useful when collecting many dots at once; the caller is
    /// expected to [`compact`](Self::compact) afterwards.
    pub fn insert_with(&mut self, dot: Dot, compact_now: bool) {
        if !self.contains(dot) {
            self.gaps.insert(dot);
        }
        if compact_now {
            self.compact();
        }
    }

    /// Mints the next unused dot for `replica`, records it, and compacts.
    ///
    /// The result is the smallest sequence number not already contained:
    /// normally `max_contiguous + 1`, skipping past any uncompacted run at
    /// the front of the gap set.
    pub fn next_dot(&mut self, replica: ReplicaId) -> Dot {
        let mut seq = self.max_contiguous(replica) + 1;
        while self.gaps.contains(&Dot::new(replica, seq)) {
            seq += 1;
        }
        let dot = Dot::new(replica, seq);
        self.insert_with(dot, true);
        dot
    }

    /// Folds every contiguous run at the front of a replica's gap set into
    /// its dense prefix.
    pub fn compact(&mut self) {
        // gaps iterate ascending per replica, so one pass absorbs whole runs
        let gaps = std::mem::take(&mut self.gaps);
        for dot in gaps {
            let head = self.max_contiguous(dot.replica);
            if dot.seq <= head {
                // already covered by the dense prefix
            } else if dot.seq == head + 1 {
                self.dense.insert(dot.replica, dot.seq);
            } else {
                self.gaps.insert(dot);
            }
        }
    }

    /// Iterates every observed dot (dense prefixes expanded).
    pub fn dots(&self) -> impl Iterator<Item = Dot> + '_ {
        self.dense
            .iter()
            .flat_map(|(&replica, &head)| (1..=head).map(move |seq| Dot::new(replica, seq)))
            .chain(self.gaps.iter().copied())
    }

    pub(crate) fn write_tokens<V>(&self, out: &mut Vec<Token<Scalar<V>>>) {
        out.push(Token::Count(2));
        out.push(Token::Count(2 * self.dense.len() as u64));
        for (&replica, &head) in &self.dense {
            out.push(Token::Scalar(Scalar::Replica(replica)));
            out.push(Token::Scalar(Scalar::Seq(head)));
        }
        out.push(Token::Count(2 * self.gaps.len() as u64));
        for dot in &self.gaps {
            out.push(Token::Scalar(Scalar::Replica(dot.replica)));
            out.push(Token::Scalar(Scalar::Seq(dot.seq)));
        }
    }

    pub(crate) fn read_tokens<V, I>(reader: &mut TokenReader<V, I>) -> Result<Self, CrdtError>
    where
        I: Iterator<Item = Token<Scalar<V>>>,
    {
        reader.expect_count(2)?;
        let mut ctx = Self::new();
        let dense_entries = reader.entries(2)?;
        for _ in 0..dense_entries {
            let replica = reader.replica()?;
            let head = reader.seq()?;
            ctx.dense.insert(replica, head);
        }
        let gap_entries = reader.entries(2)?;
        for _ in 0..gap_entries {
            let replica = reader.replica()?;
            let seq = reader.seq()?;
            ctx.insert_with(Dot::new(replica, seq), false);
        }
        ctx.compact();
        Ok(ctx)
    }

    /// Emits the token form: a count of 2, then the dense map and the gap
    /// set as counted `(replica, seq)` pair groups.
    pub fn to_tokens(&self) -> Vec<Token<Scalar<()>>> {
        let mut out = Vec::new();
        self.write_tokens(&mut out);
        out
    }

    /// Reconstructs a context from its token form.
    pub fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Scalar<()>>>,
    {
        let mut reader = TokenReader::new(tokens);
        let ctx = Self::read_tokens(&mut reader)?;
        reader.finish()?;
        Ok(ctx)
    }
}

impl Convergent for DotContext {
    /// Union of dense prefixes by max and of gap sets, followed by one
    /// compaction. Returns true iff any entry grew.
    fn converge(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (&replica, &head) in &other.dense {
            match self.dense.entry(replica) {
                Entry::Vacant(slot) => {
                    slot.insert(head);
                    changed = true;
                }
                Entry::Occupied(mut slot) => {
                    if head > *slot.get() {
                        slot.insert(head);
                        changed = true;
                    }
                }
            }
        }
        for &dot in &other.gaps {
            if !self.contains(dot) {
                self.gaps.insert(dot);
                changed = true;
            }
        }
        self.compact();
        changed
    }
}
