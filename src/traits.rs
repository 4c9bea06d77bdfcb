// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use crate::dot::ReplicaId;
use crate::tokens::Token;
use thiserror::Error;

/// Error type for CRDT operations
#[derive(Debug, Error)]
pub enum CrdtError {
    #[error("malformed token stream: {0}")]
    MalformedTokens(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("deserialization error: {0}")]
    Deserialization(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convergent join - the core merge contract shared by every CRDT in this crate.
///
/// `converge` combines two states into their least upper bound, mutating
/// `self` in place. The `other` side may be a full replica state or a delta
/// produced by a mutator; both merge through the same operation.
///
/// # Requirements
///
/// Implementations must satisfy the following algebraic properties:
/// - **Commutativity**: merging `b` then `c` equals merging `c` then `b`.
/// - **Associativity**: `(a ∪ b) ∪ c == a ∪ (b ∪ c)`.
/// - **Idempotence**: converging the same state twice changes nothing the
///   second time, and the second call reports `false`.
pub trait Convergent {
    /// Merges another state into this one.
    ///
    /// Returns `true` iff `self` gained information. Duplicate deltas, empty
    /// merges, and merging a copy of oneself are all expected and report
    /// `false` - never an error.
    fn converge(&mut self, other: &Self) -> bool;
}

/// The full CRDT surface: construction, emptiness, clearing, and the token
/// wire form.
///
/// Every mutator on a concrete CRDT returns a delta of the same type - a
/// minimal instance carrying only the new dots and values the mutation
/// introduced. Shipping deltas and shipping full states are both just
/// [`Convergent::converge`] on the receiving side.
pub trait Causal: Convergent + Sized {
    /// Leaf type of this CRDT's token stream.
    type Scalar;

    /// Creates an empty instance owned by `replica`.
    ///
    /// Passing [`crate::READ_ONLY_REPLICA`] yields an instance whose
    /// mutators are no-ops returning empty deltas.
    fn create(replica: ReplicaId) -> Self;

    /// Returns true if the CRDT holds no live values.
    fn is_empty(&self) -> bool;

    /// Removes every live value, returning the delta that conveys the
    /// removal to other replicas.
    fn clear(&mut self) -> Self;

    /// Emits the structure-preserving token form of this state.
    ///
    /// The stream starts with a count of the type's top-level fields; each
    /// group field carries its own count. See [`crate::tokens`] for the
    /// framing rules.
    fn to_tokens(&self) -> Vec<Token<Self::Scalar>>;

    /// Reconstructs an instance from a token stream.
    ///
    /// Fails with [`CrdtError::MalformedTokens`] when the leading count is
    /// wrong for this type, a group count has the wrong arity, a scalar has
    /// the wrong variant, or the stream ends prematurely.
    fn from_tokens<I>(tokens: I) -> Result<Self, CrdtError>
    where
        I: IntoIterator<Item = Token<Self::Scalar>>;
}
