// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Standard Block
//
// A block is a plain record. Criticality and healing are decided by named
// policies resolved once at setup, never by literals inside the logic.

use serde::{Deserialize, Serialize};

use crate::adapter::from_decimal;
use crate::error::HeartError;
use crate::events::{HeartEvent, Journal};
use crate::types::{BlockId, Transfusion, Yen};

/// Population of the reference block used to normalise region size.
pub const STANDARD_POPULATION: f64 = 72_176.0;

// ─── Policies ────────────────────────────────────────────────────────────────

/// When a block needs a transfusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CriticalPolicy {
    /// `vitality < vitality_below`
    VitalityOnly { vitality_below: f64 },
    /// `vitality < vitality_below OR wealth < wealth_below`
    VitalityOrWealth { vitality_below: f64, wealth_below: Yen },
}

impl CriticalPolicy {
    pub fn vitality_only() -> Self {
        Self::VitalityOnly { vitality_below: 0.4 }
    }

    pub fn vitality_or_wealth() -> Self {
        Self::VitalityOrWealth {
            vitality_below: 0.3,
            wealth_below: Yen::from(10_000),
        }
    }

    pub fn vitality_threshold(&self) -> f64 {
        match self {
            Self::VitalityOnly { vitality_below }
            | Self::VitalityOrWealth { vitality_below, .. } => *vitality_below,
        }
    }
}

impl Default for CriticalPolicy {
    fn default() -> Self {
        Self::vitality_or_wealth()
    }
}

/// How much vitality a transfusion restores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HealingPolicy {
    /// `healing = amount / unit * rate`
    Proportional { unit: Yen, rate: f64 },
    /// Fixed increment regardless of amount.
    Flat { increment: f64 },
}

impl HealingPolicy {
    pub fn proportional() -> Self {
        Self::Proportional { unit: Yen::from(100_000_000), rate: 0.1 }
    }

    pub fn flat() -> Self {
        Self::Flat { increment: 0.2 }
    }

    /// Healing increment for a transfusion of `amount`.
    pub fn healing(&self, amount: Yen) -> f64 {
        match self {
            Self::Proportional { unit, rate } => {
                if unit.is_zero() {
                    return 0.0;
                }
                // A ratio beyond Decimal range heals fully once capped.
                amount.0.checked_div(unit.0).map_or(f64::MAX, from_decimal) * rate
            }
            Self::Flat { increment } => *increment,
        }
    }
}

impl Default for HealingPolicy {
    fn default() -> Self {
        Self::proportional()
    }
}

// ─── Block ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub population: u64,
    pub wealth: Yen,
    /// Health indicator in [0.0, 1.0].
    pub vitality: f64,
}

impl Block {
    pub fn new(
        id: impl Into<BlockId>,
        name: impl Into<String>,
        population: u64,
        wealth: impl Into<Yen>,
        vitality: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            population,
            wealth: wealth.into(),
            vitality,
        }
    }

    /// Region size relative to the standard block.
    pub fn scale_factor(&self) -> f64 {
        self.population as f64 / STANDARD_POPULATION
    }

    pub fn is_critical(&self, policy: &CriticalPolicy) -> bool {
        match policy {
            CriticalPolicy::VitalityOnly { vitality_below } => self.vitality < *vitality_below,
            CriticalPolicy::VitalityOrWealth { vitality_below, wealth_below } => {
                self.vitality < *vitality_below || self.wealth < *wealth_below
            }
        }
    }

    /// Inject `amount` into the block: wealth grows by the full amount and
    /// vitality heals per `healing`, capped at 1.0. Vitality never drops; a
    /// policy yielding negative healing is rejected before any mutation.
    pub fn receive_transfusion(
        &mut self,
        amount: Yen,
        healing: &HealingPolicy,
        journal: &mut Journal,
    ) -> Result<Transfusion, HeartError> {
        if amount.is_negative() {
            return Err(HeartError::InvalidAmount(amount));
        }

        let increment = healing.healing(amount);
        if !(increment >= 0.0) {
            return Err(HeartError::InvalidConfiguration(format!(
                "healing increment {increment} for {} must be non-negative",
                self.id
            )));
        }
        let wealth = self
            .wealth
            .checked_add(amount)
            .ok_or(HeartError::Overflow("block wealth"))?;

        let vitality_before = self.vitality;
        self.vitality = (self.vitality + increment).min(1.0);
        self.wealth = wealth;

        let receipt = Transfusion {
            block: self.id.clone(),
            amount,
            vitality_before,
            vitality_after: self.vitality,
            wealth_after: self.wealth,
        };
        journal.emit(HeartEvent::TransfusionDelivered {
            block: self.id.clone(),
            name: self.name.clone(),
            amount,
            vitality_before,
            vitality_after: self.vitality,
            wealth_after: self.wealth,
        });
        Ok(receipt)
    }
}

/// Sum of wealth across a block collection.
pub fn total_wealth(blocks: &[Block]) -> Result<Yen, HeartError> {
    blocks.iter().try_fold(Yen::zero(), |acc, b| {
        acc.checked_add(b.wealth).ok_or(HeartError::Overflow("total wealth"))
    })
}

/// Reject negative wealth and out-of-range vitality supplied at setup.
pub(crate) fn validate_block(block: &Block) -> Result<(), HeartError> {
    if block.wealth.is_negative() {
        return Err(HeartError::InvalidAmount(block.wealth));
    }
    if !(0.0..=1.0).contains(&block.vitality) {
        return Err(HeartError::InvalidConfiguration(format!(
            "block {} vitality {} outside [0, 1]",
            block.id, block.vitality
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yubari() -> Block {
        Block::new("C", "Yubari-Like", 6000, 1000, 0.15)
    }

    #[test]
    fn vitality_or_wealth_flags_poor_blocks() {
        let policy = CriticalPolicy::vitality_or_wealth();
        let poor_but_healthy = Block::new("P", "Poor", 10, 9_999, 0.9);
        let rich_and_healthy = Block::new("R", "Rich", 10, 999_999_999, 0.95);
        assert!(poor_but_healthy.is_critical(&policy));
        assert!(!rich_and_healthy.is_critical(&policy));
        assert!(yubari().is_critical(&policy));
    }

    #[test]
    fn vitality_only_ignores_wealth() {
        let policy = CriticalPolicy::vitality_only();
        let poor_but_healthy = Block::new("P", "Poor", 10, 1, 0.9);
        let weak = Block::new("W", "Weak", 10, 50_000_000, 0.39);
        let borderline = Block::new("B", "Border", 10, 50_000_000, 0.4);
        assert!(!poor_but_healthy.is_critical(&policy));
        assert!(weak.is_critical(&policy));
        assert!(!borderline.is_critical(&policy), "threshold is strict");
    }

    #[test]
    fn proportional_healing_scales_with_amount() {
        let mut block = yubari();
        let mut journal = Journal::new();
        let receipt = block
            .receive_transfusion(Yen::from(90_000_000), &HealingPolicy::proportional(), &mut journal)
            .expect("test: transfusion");

        assert!((receipt.vitality_after - 0.24).abs() < 1e-9);
        assert_eq!(block.wealth, Yen::from(90_001_000));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn flat_healing_caps_at_one() {
        let mut block = Block::new("A", "Tokyo-Minato", 200_000, 999_999_999, 0.95);
        let mut journal = Journal::new();
        block
            .receive_transfusion(Yen::from(1), &HealingPolicy::flat(), &mut journal)
            .expect("test: transfusion");
        assert_eq!(block.vitality, 1.0);
    }

    #[test]
    fn negative_transfusion_is_rejected_without_mutation() {
        let mut block = yubari();
        let before = block.clone();
        let mut journal = Journal::new();
        let err = block.receive_transfusion(Yen::from(-5), &HealingPolicy::flat(), &mut journal);
        assert!(matches!(err, Err(HeartError::InvalidAmount(_))), "got {err:?}");
        assert_eq!(block, before);
        assert!(journal.is_empty());
    }

    #[test]
    fn negative_healing_is_rejected_without_mutation() {
        let mut block = yubari();
        let before = block.clone();
        let mut journal = Journal::new();
        for policy in [
            HealingPolicy::Flat { increment: -0.5 },
            HealingPolicy::Proportional { unit: Yen::from(100_000_000), rate: -0.1 },
            HealingPolicy::Flat { increment: f64::NAN },
        ] {
            let err = block.receive_transfusion(Yen::from(1_000), &policy, &mut journal);
            assert!(matches!(err, Err(HeartError::InvalidConfiguration(_))), "got {err:?}");
        }
        assert_eq!(block, before);
        assert!(journal.is_empty());
    }

    #[test]
    fn tiny_healing_unit_saturates_instead_of_overflowing() {
        let policy = HealingPolicy::Proportional { unit: Yen(rust_decimal::Decimal::new(1, 28)), rate: 0.1 };
        let mut block = yubari();
        let mut journal = Journal::new();
        let t = block
            .receive_transfusion(Yen::from(1_000_000_000), &policy, &mut journal)
            .expect("test: transfusion");
        assert_eq!(t.vitality_after, 1.0);
    }

    #[test]
    fn wealth_overflow_is_rejected_without_mutation() {
        let mut block = Block::new("R", "Rich", 1, Yen(rust_decimal::Decimal::MAX), 0.2);
        let before = block.clone();
        let mut journal = Journal::new();
        let err = block.receive_transfusion(Yen::from(1), &HealingPolicy::flat(), &mut journal);
        assert_eq!(err, Err(HeartError::Overflow("block wealth")));
        assert_eq!(block, before);
        assert_eq!(
            total_wealth(&[before.clone(), before]),
            Err(HeartError::Overflow("total wealth"))
        );
    }

    #[test]
    fn scale_factor_is_relative_to_standard_block() {
        let block = Block::new("S", "Standard", 72_176, 0, 0.5);
        assert!((block.scale_factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn setup_validation() {
        assert!(validate_block(&yubari()).is_ok());
        assert!(validate_block(&Block::new("X", "X", 0, -1, 0.5)).is_err());
        assert!(validate_block(&Block::new("X", "X", 0, 0, 1.5)).is_err());
    }
}
