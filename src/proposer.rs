// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Leviathan (spending proposer)

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::adapter::to_decimal;
use crate::block::Block;
use crate::error::HeartError;
use crate::events::{HeartEvent, Journal};
use crate::types::{Proposal, Yen};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ProposerPolicy {
    /// Always the same bloated budget for the same fair value.
    Fixed { budget: Yen, fair_value: Yen },
    /// Honest with `honest_probability`, otherwise inflated by a factor
    /// drawn uniformly from `[min_scale, max_scale]`.
    Stochastic {
        fair_value: Yen,
        honest_probability: f64,
        min_scale: f64,
        max_scale: f64,
    },
}

impl ProposerPolicy {
    pub fn fixed() -> Self {
        Self::Fixed {
            budget: Yen::from(1_000_000_000),
            fair_value: Yen::from(100_000_000),
        }
    }

    pub fn stochastic() -> Self {
        Self::Stochastic {
            fair_value: Yen::from(100_000_000),
            honest_probability: 0.5,
            min_scale: 15.0,
            max_scale: 30.0,
        }
    }
}

impl Default for ProposerPolicy {
    fn default() -> Self {
        Self::fixed()
    }
}

/// The spending actor. Carries no state of its own; randomness is injected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leviathan {
    policy: ProposerPolicy,
}

impl Leviathan {
    pub fn new(policy: ProposerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ProposerPolicy {
        &self.policy
    }

    /// Fails when an inflated budget cannot be represented as money.
    pub fn propose<R: Rng + ?Sized>(
        &self,
        target: &Block,
        rng: &mut R,
        journal: &mut Journal,
    ) -> Result<Proposal, HeartError> {
        let proposal = match self.policy {
            ProposerPolicy::Fixed { budget, fair_value } => Proposal { budget, fair_value },
            ProposerPolicy::Stochastic { fair_value, honest_probability, min_scale, max_scale } => {
                if rng.gen_bool(honest_probability) {
                    Proposal { budget: fair_value, fair_value }
                } else {
                    let scale = if min_scale < max_scale {
                        rng.gen_range(min_scale..=max_scale)
                    } else {
                        min_scale
                    };
                    let budget = inflate(fair_value, scale)?;
                    Proposal { budget, fair_value }
                }
            }
        };

        tracing::debug!(
            target_block = %target.id,
            budget = %proposal.budget,
            fair_value = %proposal.fair_value,
            "leviathan proposal"
        );
        journal.emit(HeartEvent::ProposalSubmitted {
            block: target.id.clone(),
            budget: proposal.budget,
            fair_value: proposal.fair_value,
        });
        Ok(proposal)
    }
}

/// `fair_value * scale`, rounded to whole yen.
pub(crate) fn inflate(fair_value: Yen, scale: f64) -> Result<Yen, HeartError> {
    let factor = to_decimal(scale).ok_or_else(|| {
        HeartError::InvalidConfiguration(format!("distortion scale {scale} is not representable"))
    })?;
    let budget = fair_value
        .checked_scale(factor)
        .ok_or(HeartError::Overflow("inflated proposal budget"))?;
    Ok(Yen(budget.0.round_dp(0)))
}
