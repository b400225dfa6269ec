//! Adapter layer: converts between the f64 world (vitality, random scales)
//! and Decimal money.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::types::Yen;

/// Convert f64 to Decimal (lossy but sufficient for simulation).
/// `None` for NaN, infinities and magnitudes beyond Decimal range.
pub fn to_decimal(v: f64) -> Option<Decimal> {
    Decimal::from_f64(v)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Yen amount as a plain f64 (for rendering and statistics).
pub fn yen_to_f64(amount: Yen) -> f64 {
    from_decimal(amount.0)
}
