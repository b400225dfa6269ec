// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Simulation Core
//
// One round: pick a target, Leviathan proposes, the valve regulates, the
// Heart draws surplus (diastole) and disburses to the weakest critical
// block (systole). Pool and block state persist across rounds. The first
// error aborts the whole run.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::block::{total_wealth, validate_block, Block};
use crate::config::{SimulationConfig, TargetSelection};
use crate::error::HeartError;
use crate::events::{EventRecord, HeartEvent, Journal, Observer};
use crate::heart::Heart;
use crate::ledger::FlowLedger;
use crate::proposer::Leviathan;
use crate::types::{BlockId, Proposal, Transfer, Transfusion, Yen};
use crate::valve::Valve;

// ─── Reports ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u32,
    pub target: BlockId,
    pub proposal: Proposal,
    pub transfer: Transfer,
    /// Surplus drawn into the pool this round.
    pub flow: Yen,
    pub transfusion: Option<Transfusion>,
    pub pool_after: Yen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: Option<u64>,
    pub rounds_completed: u32,
    pub blocks: Vec<Block>,
    pub arterial_pool: Yen,
    pub ledger: FlowLedger,
    pub rounds: Vec<RoundReport>,
    pub events: Vec<EventRecord>,
}

/// A run that aborted. `round` is 1-based; 0 means setup failed.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("simulation aborted in round {round}: {error}")]
pub struct SimulationFailure {
    pub round: u32,
    #[source]
    pub error: HeartError,
    pub blocks: Vec<Block>,
    pub events: Vec<EventRecord>,
}

// ─── Simulation ──────────────────────────────────────────────────────────────

pub struct Simulation<R: Rng = ChaCha8Rng> {
    pub(crate) blocks: Vec<Block>,
    pub(crate) config: SimulationConfig,
    pub(crate) leviathan: Leviathan,
    pub(crate) valve: Valve,
    pub(crate) heart: Heart,
    pub(crate) ledger: FlowLedger,
    pub(crate) journal: Journal,
    pub(crate) rng: R,
    pub(crate) seed: Option<u64>,
    pub(crate) round: u32,
    pub(crate) rounds: Vec<RoundReport>,
    pub(crate) aborted: Option<(u32, HeartError)>,
}

impl Simulation<ChaCha8Rng> {
    /// Seeded from `config.random_seed`, or from entropy when unset.
    pub fn new(blocks: Vec<Block>, config: SimulationConfig) -> Result<Self, HeartError> {
        let seed = config.random_seed.unwrap_or_else(entropy_seed);
        let mut sim = Self::with_rng(blocks, config, ChaCha8Rng::seed_from_u64(seed))?;
        sim.seed = Some(seed);
        Ok(sim)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(blocks: Vec<Block>, config: SimulationConfig, rng: R) -> Result<Self, HeartError> {
        config.validate()?;
        if blocks.is_empty() {
            return Err(HeartError::EmptyBlockCollection);
        }
        {
            let mut seen = HashSet::new();
            for block in &blocks {
                validate_block(block)?;
                if !seen.insert(&block.id) {
                    return Err(HeartError::DuplicateBlock(block.id.clone()));
                }
            }
        }

        let ledger = FlowLedger::new(total_wealth(&blocks)?);
        Ok(Self {
            leviathan: Leviathan::new(config.proposer_policy),
            valve: Valve::new(config.distortion_threshold, config.announce_approvals),
            heart: Heart::new(config.protocol_fee_rate),
            ledger,
            journal: Journal::new(),
            rng,
            seed: None,
            round: 0,
            rounds: Vec::new(),
            aborted: None,
            blocks,
            config,
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.journal.subscribe(observer);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn heart(&self) -> &Heart {
        &self.heart
    }

    pub fn ledger(&self) -> &FlowLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Rounds completed so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The round that aborted the run and its error, if any.
    pub fn failure(&self) -> Option<(u32, &HeartError)> {
        self.aborted.as_ref().map(|(round, error)| (*round, error))
    }

    pub fn is_finished(&self) -> bool {
        self.aborted.is_some() || self.round >= self.config.turn_count
    }

    /// Pick the next target per the configured selection and run one round.
    pub fn step(&mut self) -> Result<RoundReport, HeartError> {
        let target = match self.config.target_selection {
            TargetSelection::First => 0,
            TargetSelection::Uniform => self.rng.gen_range(0..self.blocks.len()),
        };
        self.run_round(target)
    }

    /// Run one full heartbeat against `blocks[target]`.
    pub fn run_round(&mut self, target: usize) -> Result<RoundReport, HeartError> {
        if let Some((_, error)) = &self.aborted {
            return Err(error.clone());
        }
        let round = self.round + 1;
        match self.beat(round, target) {
            Ok(report) => {
                self.round = round;
                self.rounds.push(report.clone());
                Ok(report)
            }
            Err(error) => {
                tracing::warn!(round, error = %error, "simulation aborted");
                self.aborted = Some((round, error.clone()));
                Err(error)
            }
        }
    }

    fn beat(&mut self, round: u32, target: usize) -> Result<RoundReport, HeartError> {
        let Some(block) = self.blocks.get(target) else {
            return Err(HeartError::InvalidConfiguration(format!(
                "target index {target} out of range for {} blocks",
                self.blocks.len()
            )));
        };

        self.journal.set_round(round);
        self.journal.emit(HeartEvent::RoundStarted {
            target: block.id.clone(),
            target_name: block.name.clone(),
        });

        let proposal = self.leviathan.propose(block, &mut self.rng, &mut self.journal)?;
        let transfer = self.valve.regulate(&proposal, block, &mut self.journal)?;
        let target_id = block.id.clone();
        self.journal.emit(HeartEvent::RoundSettled {
            paid: transfer.paid,
            saved: transfer.saved,
        });
        self.ledger.record_regulation(proposal.budget, &transfer)?;

        let flow = self.heart.diastole(transfer.saved, &mut self.journal)?;
        self.ledger.record_diastole(transfer.saved, flow)?;

        let transfusion = self.heart.systole(
            &mut self.blocks,
            &self.config.critical_policy,
            &self.config.healing_policy,
            &mut self.journal,
        )?;
        if let Some(t) = &transfusion {
            self.ledger.record_transfusion(t.amount)?;
        }

        self.ledger
            .verify(self.heart.arterial_pool(), total_wealth(&self.blocks)?)?;

        Ok(RoundReport {
            round,
            target: target_id,
            proposal,
            transfer,
            flow,
            transfusion,
            pool_after: self.heart.arterial_pool(),
        })
    }

    /// Drive every remaining configured turn. Returns the failing round and
    /// error on abort.
    pub fn advance(&mut self) -> Result<(), (u32, HeartError)> {
        while !self.is_finished() {
            self.step().map_err(|e| (self.round + 1, e))?;
        }
        match &self.aborted {
            Some((round, error)) => Err((*round, error.clone())),
            None => Ok(()),
        }
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            seed: self.seed,
            rounds_completed: self.round,
            blocks: self.blocks.clone(),
            arterial_pool: self.heart.arterial_pool(),
            ledger: self.ledger.clone(),
            rounds: self.rounds.clone(),
            events: self.journal.records().to_vec(),
        }
    }

    /// Run all configured turns and consume the simulation.
    pub fn run(mut self) -> Result<SimulationReport, SimulationFailure> {
        tracing::info!(
            blocks = self.blocks.len(),
            turns = self.config.turn_count,
            seed = ?self.seed,
            "simulation started"
        );
        match self.advance() {
            Ok(()) => {
                tracing::info!(
                    rounds = self.round,
                    pool = %self.heart.arterial_pool(),
                    transfused = %self.ledger.total_transfused,
                    "simulation finished"
                );
                Ok(self.report())
            }
            Err((round, error)) => Err(SimulationFailure {
                round,
                error,
                blocks: self.blocks,
                events: self.journal.drain(),
            }),
        }
    }
}

/// One-call entry point: set up, run every turn, return the final state and
/// the full event log.
pub fn simulate(
    blocks: Vec<Block>,
    config: SimulationConfig,
) -> Result<SimulationReport, SimulationFailure> {
    let initial = blocks.clone();
    let sim = Simulation::new(blocks, config).map_err(|error| SimulationFailure {
        round: 0,
        error,
        blocks: initial,
        events: Vec::new(),
    })?;
    sim.run()
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_seed() -> u64 {
    rand::random()
}

#[cfg(target_arch = "wasm32")]
fn entropy_seed() -> u64 {
    (crate::js_random() * u64::MAX as f64) as u64
}
