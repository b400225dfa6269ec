// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Type Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

// ─── BlockId ─────────────────────────────────────────────────────────────────

/// Opaque identifier of a block (region) in the simulated world.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self { BlockId(s) }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self { BlockId(s.to_string()) }
}

// ─── Yen ─────────────────────────────────────────────────────────────────────

/// Monetary amount backed by `rust_decimal::Decimal`, so budget splits and
/// pool accounting stay exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Yen(pub Decimal);

impl Yen {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Scale by a dimensionless rate (fee rates, distortion factors).
    /// `None` when the product leaves Decimal range.
    pub fn checked_scale(&self, rate: Decimal) -> Option<Self> {
        self.0.checked_mul(rate).map(Self)
    }

    pub fn checked_add(&self, rhs: Yen) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(&self, rhs: Yen) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl From<i32> for Yen {
    fn from(v: i32) -> Self { Self(Decimal::from(v)) }
}

impl From<i64> for Yen {
    fn from(v: i64) -> Self { Self(Decimal::from(v)) }
}

impl From<u64> for Yen {
    fn from(v: u64) -> Self { Self(Decimal::from(v)) }
}

impl From<Decimal> for Yen {
    fn from(d: Decimal) -> Self { Self(d) }
}

impl Add for Yen {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Yen {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Yen {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Yen {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Yen::zero(), |acc, y| acc + y)
    }
}

impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "¥{}", self.0.round_dp(0))
    }
}

// ─── Proposal / Transfer ─────────────────────────────────────────────────────

/// A spending proposal produced by the Leviathan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub budget: Yen,
    pub fair_value: Yen,
}

/// Outcome of regulation: what was executed and what the valve cut away.
///
/// `paid + saved == budget` always; `saved` is zero when the valve stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub paid: Yen,
    pub saved: Yen,
}

/// Receipt of a single transfusion into a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfusion {
    pub block: BlockId,
    pub amount: Yen,
    pub vitality_before: f64,
    pub vitality_after: f64,
    pub wealth_after: Yen,
}
