// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use crate::traits::CrdtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of the CRDT types shipped by this crate.
///
/// Used by the string-dispatched compaction pathway, where external systems
/// name the type of the states they hand over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrdtType {
    GCounter,
    PNCounter,
    CCounter,
    ORSet,
    MVRegister,
    LWWRegister,
    ORMap,
}

impl fmt::Display for CrdtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrdtType::GCounter => write!(f, "GCounter"),
            CrdtType::PNCounter => write!(f, "PNCounter"),
            CrdtType::CCounter => write!(f, "CCounter"),
            CrdtType::ORSet => write!(f, "ORSet"),
            CrdtType::MVRegister => write!(f, "MVRegister"),
            CrdtType::LWWRegister => write!(f, "LWWRegister"),
            CrdtType::ORMap => write!(f, "ORMap"),
        }
    }
}

impl FromStr for CrdtType {
    type Err = CrdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "").to_lowercase().as_str() {
            "gcounter" => Ok(CrdtType::GCounter),
            "pncounter" => Ok(CrdtType::PNCounter),
            "ccounter" => Ok(CrdtType::CCounter),
            "orset" => Ok(CrdtType::ORSet),
            "mvregister" => Ok(CrdtType::MVRegister),
            "lwwregister" => Ok(CrdtType::LWWRegister),
            "ormap" => Ok(CrdtType::ORMap),
            _ => Err(CrdtError::InvalidInput(format!("Unknown CRDT type: {}", s))),
        }
    }
}
