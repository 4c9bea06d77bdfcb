// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! CRDT Compaction Module
//!
//! Provides utilities for compacting multiple CRDT states into a single
//! merged state. Compaction is essential for storage efficiency and for
//! reducing synchronization overhead in distributed systems.
//!
//! # Two Compaction Pathways
//!
//! - **Token compaction**: merges token-encoded states of one statically
//!   known CRDT type; the natural pathway for transports that ship token
//!   streams.
//! - **JSON compaction**: merges serde-JSON states by string-dispatched
//!   [`CrdtType`], for web APIs and JSON-based storage systems.
//!
//! # Example
//!
//! ```
//! use delta_crdt_types::compaction::compact_json_values;
//! use delta_crdt_types::CrdtType;
//! use serde_json::json;
//!
//! let values = vec![
//!     json!({"replica": 1, "data": {"1": 10}}),
//!     json!({"replica": 2, "data": {"2": 20}}),
//! ];
//!
//! let compacted = compact_json_values(CrdtType::GCounter, &values).unwrap();
//! ```

use crate::enums::CrdtType;
use crate::tokens::Token;
use crate::traits::{Causal, CrdtError};
use crate::{CCounter, GCounter, LWWRegister, MVRegister, ORMap, ORSet, PNCounter, ReplicaId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Merges N token-encoded states of one CRDT type into a single stream.
///
/// The result is owned by `replica` and encodes the least upper bound of
/// every input. An empty input yields the token form of the empty CRDT.
///
/// # Example
///
/// ```
/// use delta_crdt_types::compaction::compact_tokens;
/// use delta_crdt_types::{Causal, GCounter};
///
/// let mut a = GCounter::<u64>::new(1);
/// a.increment_by(10);
/// let mut b = GCounter::<u64>::new(2);
/// b.increment_by(20);
///
/// let compacted = compact_tokens::<GCounter>(0, &[a.to_tokens(), b.to_tokens()]).unwrap();
/// assert_eq!(GCounter::<u64>::from_tokens(compacted).unwrap().value(), 30);
/// ```
pub fn compact_tokens<C>(
    replica: ReplicaId,
    streams: &[Vec<Token<C::Scalar>>],
) -> Result<Vec<Token<C::Scalar>>, CrdtError>
where
    C: Causal,
    C::Scalar: Clone,
{
    let mut merged = C::create(replica);
    for stream in streams {
        let state = C::from_tokens(stream.iter().cloned())?;
        merged.converge(&state);
    }
    Ok(merged.to_tokens())
}

/// Merges multiple CRDT JSON values into a single merged value.
///
/// Generic payloads are dispatched at this crate's reference parameters:
/// `u64` for counters, `String` for set/register/map payloads. An empty
/// input compacts to `Value::Null`.
pub fn compact_json_values(crdt_type: CrdtType, values: &[Value]) -> Result<Value, CrdtError> {
    if values.is_empty() {
        return Ok(Value::Null);
    }

    match crdt_type {
        CrdtType::GCounter => merge_json::<GCounter<u64>>(values),
        CrdtType::PNCounter => merge_json::<PNCounter<u64>>(values),
        CrdtType::CCounter => merge_json::<CCounter<u64>>(values),
        CrdtType::ORSet => merge_json::<ORSet<String>>(values),
        CrdtType::MVRegister => merge_json::<MVRegister<String>>(values),
        CrdtType::LWWRegister => merge_json::<LWWRegister<String>>(values),
        CrdtType::ORMap => merge_json::<ORMap<String, String>>(values),
    }
}

fn merge_json<C>(values: &[Value]) -> Result<Value, CrdtError>
where
    C: Causal + Serialize + DeserializeOwned,
{
    let mut states = values.iter().map(|value| {
        serde_json::from_value::<C>(value.clone())
            .map_err(|e| CrdtError::Deserialization(e.to_string()))
    });
    let mut merged = states.next().expect("values is non-empty")?;
    for state in states {
        merged.converge(&state?);
    }
    serde_json::to_value(&merged).map_err(|e| CrdtError::Serialization(e.to_string()))
}
