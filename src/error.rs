// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Errors

use crate::types::{BlockId, Yen};
use rust_decimal::Decimal;
use serde::Serialize;

/// Precondition violations raised by the circulation pipeline.
///
/// None of these are transient: each is detected before state is mutated
/// and aborts the run it occurs in.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail")]
pub enum HeartError {
    #[error("invalid amount {0}: monetary flows must be non-negative")]
    InvalidAmount(Yen),

    #[error("invalid fair value {0}: must be strictly positive")]
    InvalidFairValue(Yen),

    #[error("triage attempted with no blocks configured")]
    EmptyBlockCollection,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("duplicate block id: {0}")]
    DuplicateBlock(BlockId),

    #[error("conservation violated ({invariant}): expected {expected}, got {actual}")]
    ConservationViolated {
        invariant: &'static str,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("failed to parse input: {0}")]
    Parse(String),

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

impl From<serde_json::Error> for HeartError {
    fn from(e: serde_json::Error) -> Self {
        HeartError::Parse(e.to_string())
    }
}

impl HeartError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "InvalidAmount",
            Self::InvalidFairValue(_) => "InvalidFairValue",
            Self::EmptyBlockCollection => "EmptyBlockCollection",
            Self::InvalidConfiguration(_) => "InvalidConfiguration",
            Self::DuplicateBlock(_) => "DuplicateBlock",
            Self::ConservationViolated { .. } => "ConservationViolated",
            Self::Parse(_) => "Parse",
            Self::Overflow(_) => "Overflow",
        }
    }
}
