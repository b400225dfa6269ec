// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - The Heart (circulation pump)
//
// Diastole draws a fraction of every valve surplus into the arterial pool.
// Systole sends the whole pool to the weakest critical block. Disbursement
// is all-or-nothing: the pool is never split across blocks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::block::{Block, CriticalPolicy, HealingPolicy};
use crate::error::HeartError;
use crate::events::{HeartEvent, Journal};
use crate::types::{Transfusion, Yen};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    arterial_pool: Yen,
    fee_rate: Decimal,
}

impl Heart {
    pub fn new(fee_rate: Decimal) -> Self {
        Self { arterial_pool: Yen::zero(), fee_rate }
    }

    pub fn arterial_pool(&self) -> Yen {
        self.arterial_pool
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// Intake phase. Returns the flow added to the pool (zero when nothing
    /// was saved, in which case no event is emitted).
    pub fn diastole(&mut self, saved: Yen, journal: &mut Journal) -> Result<Yen, HeartError> {
        if saved.is_negative() {
            return Err(HeartError::InvalidAmount(saved));
        }
        if !saved.is_positive() {
            return Ok(Yen::zero());
        }

        let flow = saved
            .checked_scale(self.fee_rate)
            .ok_or(HeartError::Overflow("diastole flow"))?;
        self.arterial_pool = self
            .arterial_pool
            .checked_add(flow)
            .ok_or(HeartError::Overflow("arterial pool"))?;
        journal.emit(HeartEvent::PoolReplenished {
            flow,
            pool_total: self.arterial_pool,
        });
        Ok(flow)
    }

    /// Outflow phase. Returns the transfusion performed, if any.
    pub fn systole(
        &mut self,
        blocks: &mut [Block],
        critical: &CriticalPolicy,
        healing: &HealingPolicy,
        journal: &mut Journal,
    ) -> Result<Option<Transfusion>, HeartError> {
        if !self.arterial_pool.is_positive() {
            return Ok(None);
        }
        if blocks.is_empty() {
            return Err(HeartError::EmptyBlockCollection);
        }

        let Some(idx) = triage(blocks, critical) else {
            journal.emit(HeartEvent::EnergyConserved { pool_total: self.arterial_pool });
            return Ok(None);
        };

        let injection = self.arterial_pool;
        let receipt = blocks[idx].receive_transfusion(injection, healing, journal)?;
        self.arterial_pool = Yen::zero();
        tracing::debug!(block = %receipt.block, amount = %injection, "systole disbursed pool");
        Ok(Some(receipt))
    }
}

/// Index of the critical block with the lowest vitality. Ties go to the
/// first block in iteration order.
pub fn triage(blocks: &[Block], critical: &CriticalPolicy) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, block) in blocks.iter().enumerate() {
        if !block.is_critical(critical) {
            continue;
        }
        match best {
            Some(b) if blocks[b].vitality <= block.vitality => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn world() -> Vec<Block> {
        vec![
            Block::new("A", "Tokyo-Minato", 200_000, 999_999_999, 0.95),
            Block::new("B", "Osaka-Kita", 150_000, 50_000_000, 0.70),
            Block::new("C", "Yubari-Like", 6_000, 1_000, 0.15),
        ]
    }

    #[test]
    fn diastole_adds_fee_share_of_surplus() {
        let mut heart = Heart::new(dec!(0.3));
        let mut journal = Journal::new();
        let flow = heart.diastole(Yen::from(900_000_000), &mut journal).expect("test: diastole");
        assert_eq!(flow, Yen::from(270_000_000));
        assert_eq!(heart.arterial_pool(), Yen::from(270_000_000));

        heart.diastole(Yen::from(100), &mut journal).expect("test: diastole");
        assert_eq!(heart.arterial_pool(), Yen::from(270_000_030));
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn pool_overflow_is_an_error_and_leaves_pool_intact() {
        let mut heart = Heart::new(dec!(1));
        let mut journal = Journal::new();
        heart.diastole(Yen(Decimal::MAX), &mut journal).expect("test: fill pool");
        let err = heart.diastole(Yen::from(1), &mut journal);
        assert_eq!(err, Err(HeartError::Overflow("arterial pool")));
        assert_eq!(heart.arterial_pool(), Yen(Decimal::MAX));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn diastole_ignores_zero_surplus() {
        let mut heart = Heart::new(dec!(0.1));
        let mut journal = Journal::new();
        assert_eq!(heart.diastole(Yen::zero(), &mut journal), Ok(Yen::zero()));
        assert!(journal.is_empty());
        assert!(heart.diastole(Yen::from(-1), &mut journal).is_err());
    }

    #[test]
    fn systole_is_noop_on_empty_pool() {
        let mut heart = Heart::new(dec!(0.1));
        let mut blocks = world();
        let mut journal = Journal::new();
        let r = heart
            .systole(&mut blocks, &CriticalPolicy::vitality_only(), &HealingPolicy::flat(), &mut journal)
            .expect("test: systole");
        assert!(r.is_none());
        assert!(journal.is_empty());
        assert_eq!(blocks, world());
    }

    #[test]
    fn systole_transfuses_whole_pool_to_weakest_critical_block() {
        let mut heart = Heart::new(dec!(0.3));
        let mut blocks = world();
        let mut journal = Journal::new();
        heart.diastole(Yen::from(900_000_000), &mut journal).expect("test: diastole");

        let receipt = heart
            .systole(&mut blocks, &CriticalPolicy::vitality_only(), &HealingPolicy::flat(), &mut journal)
            .expect("test: systole")
            .expect("test: a block is critical");

        assert_eq!(receipt.block.0, "C");
        assert_eq!(heart.arterial_pool(), Yen::zero());
        assert_eq!(blocks[2].wealth, Yen::from(270_001_000));
        assert!((blocks[2].vitality - 0.35).abs() < 1e-9);
        assert_eq!(blocks[0].wealth, Yen::from(999_999_999));
        assert_eq!(blocks[1].wealth, Yen::from(50_000_000));
    }

    #[test]
    fn systole_conserves_pool_when_nobody_is_critical() {
        let mut heart = Heart::new(dec!(0.3));
        let mut blocks = vec![
            Block::new("A", "A", 1, 1_000_000, 0.9),
            Block::new("B", "B", 1, 1_000_000, 0.4),
        ];
        let mut journal = Journal::new();
        heart.diastole(Yen::from(1000), &mut journal).expect("test: diastole");

        let r = heart
            .systole(&mut blocks, &CriticalPolicy::vitality_only(), &HealingPolicy::flat(), &mut journal)
            .expect("test: systole");
        assert!(r.is_none());
        assert_eq!(heart.arterial_pool(), Yen::from(300));
        assert_eq!(journal.records().last().map(|r| r.event.kind()), Some("energy_conserved"));
    }

    #[test]
    fn systole_with_no_blocks_is_an_error() {
        let mut heart = Heart::new(dec!(0.3));
        let mut journal = Journal::new();
        heart.diastole(Yen::from(1000), &mut journal).expect("test: diastole");
        let err = heart.systole(&mut [], &CriticalPolicy::vitality_only(), &HealingPolicy::flat(), &mut journal);
        assert_eq!(err, Err(HeartError::EmptyBlockCollection));
        assert_eq!(heart.arterial_pool(), Yen::from(300));
    }

    #[test]
    fn triage_prefers_lowest_vitality_then_first() {
        let policy = CriticalPolicy::vitality_only();
        let blocks = vec![
            Block::new("A", "A", 1, 1, 0.35),
            Block::new("B", "B", 1, 1, 0.10),
            Block::new("C", "C", 1, 1, 0.10),
            Block::new("D", "D", 1, 1, 0.05),
            Block::new("E", "E", 1, 1, 0.05),
        ];
        assert_eq!(triage(&blocks, &policy), Some(3));
        assert_eq!(triage(&blocks[..3], &policy), Some(1));
        assert_eq!(triage(&[Block::new("H", "H", 1, 1, 0.9)], &policy), None);
    }

    #[test]
    fn triage_with_wealth_policy_can_pick_healthy_but_poor_block() {
        let policy = CriticalPolicy::vitality_or_wealth();
        let blocks = vec![
            Block::new("A", "A", 1, 1_000_000, 0.9),
            Block::new("P", "Poor", 1, 500, 0.8),
        ];
        assert_eq!(triage(&blocks, &policy), Some(1));
    }
}
