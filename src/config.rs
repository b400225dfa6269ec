// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Configuration
//
// Every variant constant (threshold, fee rate, criticality, healing,
// proposer) lives here as a named option, resolved once at setup.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::block::{CriticalPolicy, HealingPolicy};
use crate::error::HeartError;
use crate::proposer::{inflate, ProposerPolicy};

/// How the orchestrator picks the block a round's proposal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelection {
    /// Always the first block in the collection.
    #[default]
    First,
    /// Uniformly at random, independently per round.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distortion index above which the valve closes (strict `>`).
    pub distortion_threshold: Decimal,
    /// Share of every valve surplus drawn into the arterial pool, in [0, 1].
    pub protocol_fee_rate: Decimal,
    pub critical_policy: CriticalPolicy,
    pub healing_policy: HealingPolicy,
    pub proposer_policy: ProposerPolicy,
    pub target_selection: TargetSelection,
    pub turn_count: u32,
    /// `None` draws a seed from entropy at setup.
    pub random_seed: Option<u64>,
    /// Emit an event when a proposal passes the valve untouched.
    pub announce_approvals: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl SimulationConfig {
    /// Single deterministic heartbeat: 10x overshoot against a 10.0 valve.
    pub fn classic() -> Self {
        Self {
            distortion_threshold: dec!(10.0),
            protocol_fee_rate: dec!(0.1),
            critical_policy: CriticalPolicy::vitality_or_wealth(),
            healing_policy: HealingPolicy::proportional(),
            proposer_policy: ProposerPolicy::fixed(),
            target_selection: TargetSelection::First,
            turn_count: 1,
            random_seed: None,
            announce_approvals: false,
        }
    }

    /// Multi-turn run with a randomly distorting proposer and random targets.
    pub fn stochastic() -> Self {
        Self {
            distortion_threshold: dec!(9.9),
            protocol_fee_rate: dec!(0.3),
            critical_policy: CriticalPolicy::vitality_only(),
            healing_policy: HealingPolicy::flat(),
            proposer_policy: ProposerPolicy::stochastic(),
            target_selection: TargetSelection::Uniform,
            turn_count: 10,
            random_seed: None,
            announce_approvals: true,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "stochastic" => Some(Self::stochastic()),
            _ => None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turn_count = turns;
        self
    }

    /// Parse a JSON document. Missing fields fall back to `classic()`.
    pub fn from_json(json: &str) -> Result<Self, HeartError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HeartError> {
        if self.distortion_threshold <= Decimal::ZERO {
            return Err(invalid(format!(
                "distortion_threshold must be positive, got {}",
                self.distortion_threshold
            )));
        }
        if self.protocol_fee_rate < Decimal::ZERO || self.protocol_fee_rate > Decimal::ONE {
            return Err(invalid(format!(
                "protocol_fee_rate must be within [0, 1], got {}",
                self.protocol_fee_rate
            )));
        }
        if self.turn_count == 0 {
            return Err(invalid("turn_count must be at least 1".to_string()));
        }

        let vitality_below = self.critical_policy.vitality_threshold();
        if !(0.0..=1.0).contains(&vitality_below) {
            return Err(invalid(format!(
                "critical vitality threshold must be within [0, 1], got {vitality_below}"
            )));
        }
        if let CriticalPolicy::VitalityOrWealth { wealth_below, .. } = self.critical_policy {
            if wealth_below.is_negative() {
                return Err(invalid(format!("critical wealth threshold is negative: {wealth_below}")));
            }
        }

        match self.healing_policy {
            HealingPolicy::Proportional { unit, rate } => {
                if !unit.is_positive() || !(rate.is_finite() && rate >= 0.0) {
                    return Err(invalid(format!(
                        "proportional healing needs a positive unit and non-negative rate (unit {unit}, rate {rate})"
                    )));
                }
            }
            HealingPolicy::Flat { increment } => {
                if !(increment.is_finite() && increment >= 0.0) {
                    return Err(invalid(format!("flat healing increment must be non-negative, got {increment}")));
                }
            }
        }

        if let ProposerPolicy::Stochastic { fair_value, honest_probability, min_scale, max_scale } =
            self.proposer_policy
        {
            if !(0.0..=1.0).contains(&honest_probability) {
                return Err(invalid(format!(
                    "honest_probability must be within [0, 1], got {honest_probability}"
                )));
            }
            if !(min_scale.is_finite() && max_scale.is_finite()) || min_scale < 0.0 || min_scale > max_scale {
                return Err(invalid(format!(
                    "distortion scale range [{min_scale}, {max_scale}] is not a valid range"
                )));
            }
            // The largest draw must still be a representable budget.
            if inflate(fair_value, max_scale).is_err() {
                return Err(invalid(format!(
                    "fair value {fair_value} inflated by {max_scale} exceeds the money range"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> HeartError {
    HeartError::InvalidConfiguration(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Yen;

    #[test]
    fn presets_are_valid() {
        assert!(SimulationConfig::classic().validate().is_ok());
        assert!(SimulationConfig::stochastic().validate().is_ok());
        assert_eq!(SimulationConfig::default(), SimulationConfig::classic());
        assert!(SimulationConfig::preset("nope").is_none());
    }

    #[test]
    fn fee_rate_out_of_bounds_is_rejected() {
        let mut config = SimulationConfig::classic();
        config.protocol_fee_rate = dec!(-0.1);
        assert!(matches!(config.validate(), Err(HeartError::InvalidConfiguration(_))));
        config.protocol_fee_rate = dec!(1.5);
        assert!(matches!(config.validate(), Err(HeartError::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_turns_and_zero_threshold_are_rejected() {
        assert!(SimulationConfig::classic().with_turns(0).validate().is_err());
        let mut config = SimulationConfig::classic();
        config.distortion_threshold = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_stochastic_ranges_are_rejected() {
        let mut config = SimulationConfig::stochastic();
        config.proposer_policy = ProposerPolicy::Stochastic {
            fair_value: Yen::from(100),
            honest_probability: 1.2,
            min_scale: 15.0,
            max_scale: 30.0,
        };
        assert!(config.validate().is_err());
        config.proposer_policy = ProposerPolicy::Stochastic {
            fair_value: Yen::from(100),
            honest_probability: 0.5,
            min_scale: 30.0,
            max_scale: 15.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_overrides_merge_onto_classic() {
        let config = SimulationConfig::from_json(
            r#"{
                "distortion_threshold": 9.9,
                "protocol_fee_rate": "0.3",
                "critical_policy": { "policy": "vitality_only", "vitality_below": 0.4 },
                "healing_policy": { "policy": "flat", "increment": 0.2 },
                "random_seed": 7
            }"#,
        )
        .expect("test: valid json config");

        assert_eq!(config.distortion_threshold, dec!(9.9));
        assert_eq!(config.protocol_fee_rate, dec!(0.3));
        assert_eq!(config.critical_policy, CriticalPolicy::vitality_only());
        assert_eq!(config.healing_policy, HealingPolicy::flat());
        assert_eq!(config.proposer_policy, ProposerPolicy::fixed());
        assert_eq!(config.turn_count, 1);
        assert_eq!(config.random_seed, Some(7));
    }

    #[test]
    fn json_with_invalid_bounds_fails_validation() {
        let err = SimulationConfig::from_json(r#"{ "protocol_fee_rate": 2 }"#);
        assert!(matches!(err, Err(HeartError::InvalidConfiguration(_))), "got {err:?}");
        let err = SimulationConfig::from_json("{ not json");
        assert!(matches!(err, Err(HeartError::Parse(_))), "got {err:?}");
    }

    #[test]
    fn unrepresentable_scale_range_is_rejected() {
        let mut config = SimulationConfig::stochastic();
        config.proposer_policy = ProposerPolicy::Stochastic {
            fair_value: Yen::from(100_000_000),
            honest_probability: 0.5,
            min_scale: 1e30,
            max_scale: 1e30,
        };
        assert!(matches!(config.validate(), Err(HeartError::InvalidConfiguration(_))));

        // representable factor, but the product leaves the Decimal range
        config.proposer_policy = ProposerPolicy::Stochastic {
            fair_value: Yen::from(100_000_000),
            honest_probability: 0.5,
            min_scale: 15.0,
            max_scale: 1e21,
        };
        assert!(matches!(config.validate(), Err(HeartError::InvalidConfiguration(_))));
    }
}
