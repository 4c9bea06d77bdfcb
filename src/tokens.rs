//! Token stream framework.
//!
//! Every CRDT in this crate serializes to a flat stream of [`Token`]s: a
//! tree of counted groups whose leaves are scalars drawn from the crate-wide
//! union [`Scalar`]. The stream is transport-agnostic - it carries structure,
//! not bytes - and a decoder that knows the target type can reconstruct the
//! value without ambiguity.
//!
//! # Framing rules
//!
//! - A stream begins with `Count(f)` where `f` is the number of top-level
//!   fields of the type (fixed per type; e.g. 2 for a dot context, 3 for a
//!   kernel).
//! - A group field begins with `Count(s)` where `s` is the number of scalar
//!   tokens inside the group. Groups of `(replica, seq)` or
//!   `(replica, value)` pairs have entry arity 2; dot-keyed map entries
//!   `(replica, seq, value)` have entry arity 3. A group count that is not a
//!   multiple of its entry arity is rejected.
//! - Decoders read exactly `count / arity` entries and then require the
//!   stream to be exhausted.

use crate::dot::{ReplicaId, SeqNum};
use crate::traits::CrdtError;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A single token in a CRDT wire stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token<S> {
    /// Size prefix of the group that follows.
    Count(u64),
    /// A leaf value.
    Scalar(S),
}

/// The scalar union shared by every CRDT in this crate.
///
/// Counters only ever emit `Replica` and `Value`; contexts only `Replica`
/// and `Seq`; kernels all three. A decoder that meets the wrong variant for
/// its schema position reports [`CrdtError::MalformedTokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scalar<V> {
    /// A replica identifier.
    Replica(ReplicaId),
    /// A sequence number.
    Seq(SeqNum),
    /// A user-supplied payload value.
    Value(V),
}

/// Checked pull-decoder over a token stream.
///
/// Wraps the token iterator and exposes one accessor per schema position.
/// Every accessor fails with [`CrdtError::MalformedTokens`] instead of
/// panicking, so a truncated or reordered stream surfaces as an error at the
/// exact position it diverges from the schema.
pub struct TokenReader<V, I> {
    tokens: I,
    _value: PhantomData<V>,
}

impl<V, I> TokenReader<V, I>
where
    I: Iterator<Item = Token<Scalar<V>>>,
{
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<Item = Token<Scalar<V>>, IntoIter = I>,
    {
        Self {
            tokens: tokens.into_iter(),
            _value: PhantomData,
        }
    }

    fn next(&mut self) -> Result<Token<Scalar<V>>, CrdtError> {
        self.tokens
            .next()
            .ok_or_else(|| CrdtError::MalformedTokens("stream ended prematurely".into()))
    }

    /// Reads a group count.
    pub fn count(&mut self) -> Result<u64, CrdtError> {
        match self.next()? {
            Token::Count(n) => Ok(n),
            Token::Scalar(_) => Err(CrdtError::MalformedTokens(
                "expected count, found scalar".into(),
            )),
        }
    }

    /// Reads a group count and checks it against the expected field arity.
    pub fn expect_count(&mut self, expected: u64) -> Result<(), CrdtError> {
        let n = self.count()?;
        if n != expected {
            return Err(CrdtError::MalformedTokens(format!(
                "expected count {expected}, found {n}"
            )));
        }
        Ok(())
    }

    /// Reads a group count and checks divisibility by the group's entry
    /// arity, returning the number of entries.
    pub fn entries(&mut self, arity: u64) -> Result<u64, CrdtError> {
        let n = self.count()?;
        if n % arity != 0 {
            return Err(CrdtError::MalformedTokens(format!(
                "group count {n} has wrong arity for {arity}-scalar entries"
            )));
        }
        Ok(n / arity)
    }

    /// Reads a replica-id scalar.
    pub fn replica(&mut self) -> Result<ReplicaId, CrdtError> {
        match self.next()? {
            Token::Scalar(Scalar::Replica(id)) => Ok(id),
            _ => Err(CrdtError::MalformedTokens(
                "expected replica-id scalar".into(),
            )),
        }
    }

    /// Reads a sequence-number scalar.
    pub fn seq(&mut self) -> Result<SeqNum, CrdtError> {
        match self.next()? {
            Token::Scalar(Scalar::Seq(seq)) => Ok(seq),
            _ => Err(CrdtError::MalformedTokens(
                "expected sequence-number scalar".into(),
            )),
        }
    }

    /// Reads a payload-value scalar.
    pub fn value(&mut self) -> Result<V, CrdtError> {
        match self.next()? {
            Token::Scalar(Scalar::Value(v)) => Ok(v),
            _ => Err(CrdtError::MalformedTokens("expected value scalar".into())),
        }
    }

    /// Requires the stream to be exhausted.
    pub fn finish(mut self) -> Result<(), CrdtError> {
        if self.tokens.next().is_some() {
            return Err(CrdtError::MalformedTokens(
                "trailing tokens after value".into(),
            ));
        }
        Ok(())
    }
}
