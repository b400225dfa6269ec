// Scenario Definitions — named (world, config) pairs for `run` and `batch`

use heart_engine::world::{archipelago, standard_world};
use heart_engine::{Block, CriticalPolicy, HealingPolicy, ProposerPolicy, SimulationConfig};
use rust_decimal_macros::dec;

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub world: fn() -> Vec<Block>,
    pub config: fn() -> SimulationConfig,
}

/// 10x overshoot against a 9.9 valve: clamps, pools 30%, heals flat.
fn strict_valve() -> SimulationConfig {
    SimulationConfig {
        distortion_threshold: dec!(9.9),
        protocol_fee_rate: dec!(0.3),
        critical_policy: CriticalPolicy::vitality_only(),
        healing_policy: HealingPolicy::flat(),
        proposer_policy: ProposerPolicy::fixed(),
        ..SimulationConfig::classic()
    }
}

fn archipelago_config() -> SimulationConfig {
    SimulationConfig::stochastic().with_turns(50)
}

fn healthy_world() -> Vec<Block> {
    standard_world()
        .into_iter()
        .map(|mut b| {
            b.vitality = b.vitality.max(0.6);
            b
        })
        .collect()
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "classic",
            label: "Classic heartbeat (valve at 10.0)",
            world: standard_world,
            config: SimulationConfig::classic,
        },
        Scenario {
            name: "strict-valve",
            label: "Strict valve (9.9), flat healing",
            world: standard_world,
            config: strict_valve,
        },
        Scenario {
            name: "stochastic",
            label: "Stochastic Leviathan, 10 turns",
            world: standard_world,
            config: SimulationConfig::stochastic,
        },
        Scenario {
            name: "archipelago",
            label: "Archipelago triage, 50 turns",
            world: archipelago,
            config: archipelago_config,
        },
        Scenario {
            name: "healthy-world",
            label: "No critical blocks, pool retained",
            world: healthy_world,
            config: strict_valve,
        },
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    scenarios().into_iter().find(|s| s.name == name)
}
