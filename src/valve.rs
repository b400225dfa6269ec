// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Distortion Valve
//
// The valve compares the distortion index (budget / fair value) against a
// threshold. Above it, the budget is clamped to fair value and the cut
// becomes surplus for the Heart. Equality is not a distortion.

use rust_decimal::Decimal;

use crate::block::Block;
use crate::error::HeartError;
use crate::events::{HeartEvent, Journal};
use crate::types::{Proposal, Transfer, Yen};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valve {
    threshold: Decimal,
    announce_approvals: bool,
}

impl Valve {
    pub fn new(threshold: Decimal, announce_approvals: bool) -> Self {
        Self { threshold, announce_approvals }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Distortion index of a proposal.
    pub fn distortion(proposal: &Proposal) -> Result<Decimal, HeartError> {
        if !proposal.fair_value.is_positive() {
            return Err(HeartError::InvalidFairValue(proposal.fair_value));
        }
        if proposal.budget.is_negative() {
            return Err(HeartError::InvalidAmount(proposal.budget));
        }
        proposal
            .budget
            .0
            .checked_div(proposal.fair_value.0)
            .ok_or(HeartError::Overflow("distortion index"))
    }

    pub fn regulate(
        &self,
        proposal: &Proposal,
        block: &Block,
        journal: &mut Journal,
    ) -> Result<Transfer, HeartError> {
        let distortion = Self::distortion(proposal)?;

        if distortion > self.threshold {
            let saved = proposal.budget - proposal.fair_value;
            tracing::debug!(block = %block.id, %distortion, "valve closed");
            journal.emit(HeartEvent::DistortionDetected {
                block: block.id.clone(),
                distortion,
                fair_value: proposal.fair_value,
                saved,
            });
            return Ok(Transfer { paid: proposal.fair_value, saved });
        }

        if self.announce_approvals {
            journal.emit(HeartEvent::ProposalApproved {
                block: block.id.clone(),
                distortion,
                budget: proposal.budget,
            });
        }
        Ok(Transfer { paid: proposal.budget, saved: Yen::zero() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Yen;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rust_decimal_macros::dec;

    fn tokyo() -> Block {
        Block::new("A", "Tokyo-Minato", 200_000, 999_999_999, 0.95)
    }

    fn proposal(budget: i64, fair: i64) -> Proposal {
        Proposal { budget: Yen::from(budget), fair_value: Yen::from(fair) }
    }

    #[test]
    fn equality_to_threshold_passes_through() {
        let valve = Valve::new(dec!(10.0), false);
        let mut journal = Journal::new();
        let t = valve
            .regulate(&proposal(1_000_000_000, 100_000_000), &tokyo(), &mut journal)
            .expect("test: regulate");
        assert_eq!(t.paid, Yen::from(1_000_000_000));
        assert_eq!(t.saved, Yen::zero());
        assert!(journal.is_empty(), "silent pass-through without approvals");
    }

    #[test]
    fn above_threshold_clamps_to_fair_value() {
        let valve = Valve::new(dec!(9.9), false);
        let mut journal = Journal::new();
        let t = valve
            .regulate(&proposal(1_000_000_000, 100_000_000), &tokyo(), &mut journal)
            .expect("test: regulate");
        assert_eq!(t.paid, Yen::from(100_000_000));
        assert_eq!(t.saved, Yen::from(900_000_000));
        assert_eq!(journal.records()[0].event.kind(), "distortion_detected");
    }

    #[test]
    fn approvals_are_announced_when_configured() {
        let valve = Valve::new(dec!(10.0), true);
        let mut journal = Journal::new();
        valve
            .regulate(&proposal(100_000_000, 100_000_000), &tokyo(), &mut journal)
            .expect("test: regulate");
        assert_eq!(journal.records()[0].event.kind(), "proposal_approved");
    }

    #[test]
    fn non_positive_fair_value_is_rejected() {
        let valve = Valve::new(dec!(10.0), false);
        let mut journal = Journal::new();
        let err = valve.regulate(&proposal(100, 0), &tokyo(), &mut journal);
        assert!(matches!(err, Err(HeartError::InvalidFairValue(_))), "got {err:?}");
        let err = valve.regulate(&proposal(100, -3), &tokyo(), &mut journal);
        assert!(matches!(err, Err(HeartError::InvalidFairValue(_))), "got {err:?}");
        assert!(journal.is_empty());
    }

    #[test]
    fn conservation_and_clamp_hold_for_random_budgets() {
        let valve = Valve::new(dec!(10.0), false);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut journal = Journal::new();
        for _ in 0..1000 {
            let fair: i64 = rng.gen_range(1..1_000_000);
            let budget: i64 = rng.gen_range(0..fair * 40);
            let p = proposal(budget, fair);
            let t = valve.regulate(&p, &tokyo(), &mut journal).expect("test: regulate");

            assert_eq!(t.paid + t.saved, p.budget);
            if p.budget.0 / p.fair_value.0 > dec!(10.0) {
                assert_eq!(t.paid, p.fair_value);
            } else {
                assert_eq!(t.paid, p.budget);
                assert_eq!(t.saved, Yen::zero());
            }
        }
    }

    #[test]
    fn distortion_beyond_decimal_range_is_an_error() {
        let valve = Valve::new(dec!(10.0), false);
        let mut journal = Journal::new();
        let p = Proposal {
            budget: Yen(Decimal::from_i128_with_scale(10i128.pow(22), 0)),
            fair_value: Yen(Decimal::new(1, 8)),
        };
        let err = valve.regulate(&p, &tokyo(), &mut journal);
        assert_eq!(err, Err(HeartError::Overflow("distortion index")));
        assert!(journal.is_empty());
    }
}
