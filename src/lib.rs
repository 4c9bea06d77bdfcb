//! # delta-crdt-types
//!
//! A library of delta-state Conflict-free Replicated Data Types (CRDTs)
//! built on dotted causal contexts.
//!
//! Replicas mutate their local state and ship the returned **delta** - a
//! minimal CRDT of the same type carrying only the new dots and values - to
//! their peers, who apply it with [`Convergent::converge`]. Full states
//! merge through the same operation, so anti-entropy and delta propagation
//! share one code path. Given that every update eventually reaches every
//! replica, in any order and with duplicates, all replicas converge to the
//! same value.
//!
//! The causal machinery is layered:
//!
//! - [`DotContext`] - a compact set of every causal event observed.
//! - [`DotKernel`] / [`DotKernelSingle`] - dot-to-value maps with
//!   observed-remove semantics, the engine behind every causal type.
//! - [`ORSet`], [`MVRegister`], [`LWWRegister`], [`ORMap`], [`CCounter`] -
//!   thin facades fixing the kernel's aggregation rule.
//! - [`GCounter`], [`PNCounter`] - vector-style counters that converge by
//!   per-replica maximum and need no dots.
//!
//! Every CRDT serializes to a structure-preserving [`tokens`] stream and,
//! through serde, to any self-describing format.

pub mod compaction;
pub mod dot;
pub mod dot_context;
pub mod dot_kernel;
pub mod dot_kernel_single;
pub mod enums;
pub mod tokens;
pub mod traits;

pub mod c_counter;
pub mod g_counter;
pub mod lww_register;
pub mod mv_register;
pub mod or_map;
pub mod or_set;
pub mod pn_counter;

// Re-export core traits
pub use traits::{Causal, Convergent, CrdtError};

// Re-export the causal machinery
pub use dot::{Dot, ReplicaId, SeqNum, READ_ONLY_REPLICA};
pub use dot_context::DotContext;
pub use dot_kernel::DotKernel;
pub use dot_kernel_single::DotKernelSingle;
pub use tokens::{Scalar, Token, TokenReader};

// Re-export the CRDT types
pub use c_counter::CCounter;
pub use enums::CrdtType;
pub use g_counter::{CounterValue, GCounter};
pub use lww_register::LWWRegister;
pub use mv_register::MVRegister;
pub use or_map::{MapEntry, ORMap};
pub use or_set::ORSet;
pub use pn_counter::PNCounter;
