// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation ("The Heart")

pub mod types;
pub mod error;
pub mod adapter;
pub mod events;
pub mod block;
pub mod proposer;
pub mod valve;
pub mod heart;
pub mod ledger;
pub mod config;
pub mod simulation;
pub mod world;

pub use block::{Block, CriticalPolicy, HealingPolicy};
pub use config::{SimulationConfig, TargetSelection};
pub use error::HeartError;
pub use events::{EventRecord, HeartEvent, Journal, Observer, TracingObserver};
pub use heart::{triage, Heart};
pub use ledger::FlowLedger;
pub use proposer::{Leviathan, ProposerPolicy};
pub use simulation::{simulate, RoundReport, Simulation, SimulationFailure, SimulationReport};
pub use types::*;
pub use valve::Valve;

use serde::Serialize;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Math, js_name = random)]
    fn js_random() -> f64;
}

// ─── WASM Interface ──────────────────────────────────────────────────────────
//
// The page embedding the engine is the observer: it pulls structured
// events and renders them itself.

#[wasm_bindgen]
pub struct HeartSimulation {
    inner: Simulation,
    initial_blocks: Vec<Block>,
    config: SimulationConfig,
}

#[wasm_bindgen]
impl HeartSimulation {
    /// `blocks` and `config` are plain JS objects; an undefined config means
    /// the classic preset, undefined blocks the standard world.
    #[wasm_bindgen(constructor)]
    pub fn new(blocks: JsValue, config: JsValue) -> Result<HeartSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let blocks: Vec<Block> = if blocks.is_undefined() || blocks.is_null() {
            world::standard_world()
        } else {
            serde_wasm_bindgen::from_value(blocks)?
        };
        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::classic()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let inner = Simulation::new(blocks.clone(), config.clone()).map_err(|e| to_js_failure(0, &e))?;
        Ok(Self { inner, initial_blocks: blocks, config })
    }

    /// Run one round; returns the round report. Throws `{ round, error }`.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.step() {
            Ok(report) => Ok(serde_wasm_bindgen::to_value(&report)?),
            Err(error) => {
                let round = self.inner.failure().map_or(self.inner.round() + 1, |(r, _)| r);
                Err(to_js_failure(round, &error))
            }
        }
    }

    /// Run every remaining turn; returns the full simulation report.
    /// Throws `{ round, error }` naming the round that aborted.
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        self.inner
            .advance()
            .map_err(|(round, error)| to_js_failure(round, &error))?;
        Ok(serde_wasm_bindgen::to_value(&self.inner.report())?)
    }

    pub fn get_blocks(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.blocks()).unwrap_or(JsValue::NULL)
    }

    pub fn get_events(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.events()).unwrap_or(JsValue::NULL)
    }

    /// Plain-text rendering of every event so far, one per line.
    pub fn event_lines(&self) -> Vec<String> {
        self.inner
            .events()
            .iter()
            .map(|r| format!("[{}] {}", r.round, r.event))
            .collect()
    }

    pub fn arterial_pool(&self) -> f64 {
        adapter::yen_to_f64(self.inner.heart().arterial_pool())
    }

    pub fn rounds_completed(&self) -> u32 {
        self.inner.round()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Restart from the initial blocks. Seeded configs replay identically.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner = Simulation::new(self.initial_blocks.clone(), self.config.clone())
            .map_err(|e| to_js_failure(0, &e))?;
        Ok(())
    }
}

#[wasm_bindgen]
pub fn standard_world() -> JsValue {
    serde_wasm_bindgen::to_value(&world::standard_world()).unwrap_or(JsValue::NULL)
}

/// What JS receives when a call fails. Round 0 means setup was rejected.
#[derive(Serialize)]
struct RoundFailure<'a> {
    round: u32,
    error: &'a HeartError,
}

fn to_js_failure(round: u32, error: &HeartError) -> JsValue {
    serde_wasm_bindgen::to_value(&RoundFailure { round, error })
        .unwrap_or_else(|_| JsValue::from_str(&format!("round {round}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_round_travels_with_the_error() {
        let config = SimulationConfig {
            proposer_policy: ProposerPolicy::Fixed {
                budget: Yen::from(1_000),
                fair_value: Yen::zero(),
            },
            turn_count: 3,
            ..SimulationConfig::classic()
        };
        let mut sim = Simulation::new(world::standard_world(), config).expect("test: setup");
        let (round, error) = sim.advance().expect_err("test: abort");
        assert_eq!(sim.failure(), Some((round, &error)));

        let json = serde_json::to_value(RoundFailure { round, error: &error }).expect("test: json");
        assert_eq!(json["round"], 1);
        assert_eq!(json["error"]["kind"], error.kind());
    }

    #[test]
    fn setup_rejection_is_round_zero() {
        let error = Simulation::new(Vec::new(), SimulationConfig::classic()).err().expect("test: reject");
        let json = serde_json::to_value(RoundFailure { round: 0, error: &error }).expect("test: json");
        assert_eq!(json["round"], 0);
        assert_eq!(json["error"]["kind"], "EmptyBlockCollection");
    }
}
