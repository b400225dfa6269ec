// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Event Journal
//
// Core components never format for a presentation medium. They emit typed
// events into a `Journal`, which stamps the round, keeps the full log and
// fans each record out to registered observers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::adapter::from_decimal;
use crate::types::{BlockId, Yen};
use rust_decimal::Decimal;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeartEvent {
    RoundStarted {
        target: BlockId,
        target_name: String,
    },
    ProposalSubmitted {
        block: BlockId,
        budget: Yen,
        fair_value: Yen,
    },
    /// The valve closed: budget clamped down to fair value.
    DistortionDetected {
        block: BlockId,
        distortion: Decimal,
        fair_value: Yen,
        saved: Yen,
    },
    ProposalApproved {
        block: BlockId,
        distortion: Decimal,
        budget: Yen,
    },
    RoundSettled {
        paid: Yen,
        saved: Yen,
    },
    /// Diastole: part of the surplus flowed into the arterial pool.
    PoolReplenished {
        flow: Yen,
        pool_total: Yen,
    },
    TransfusionDelivered {
        block: BlockId,
        name: String,
        amount: Yen,
        vitality_before: f64,
        vitality_after: f64,
        wealth_after: Yen,
    },
    /// Systole found no critical block; the pool is kept.
    EnergyConserved {
        pool_total: Yen,
    },
}

impl HeartEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoundStarted { .. } => "round_started",
            Self::ProposalSubmitted { .. } => "proposal_submitted",
            Self::DistortionDetected { .. } => "distortion_detected",
            Self::ProposalApproved { .. } => "proposal_approved",
            Self::RoundSettled { .. } => "round_settled",
            Self::PoolReplenished { .. } => "pool_replenished",
            Self::TransfusionDelivered { .. } => "transfusion_delivered",
            Self::EnergyConserved { .. } => "energy_conserved",
        }
    }
}

impl fmt::Display for HeartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStarted { target, target_name } => {
                write!(f, "round targets {target_name} ({target})")
            }
            Self::ProposalSubmitted { block, budget, fair_value } => {
                write!(f, "proposal for {block}: budget {budget}, fair value {fair_value}")
            }
            Self::DistortionDetected { block, distortion, fair_value, saved } => write!(
                f,
                "distortion {:.1} detected at {block}; valve closed, clamped to {fair_value} (saved {saved})",
                from_decimal(*distortion)
            ),
            Self::ProposalApproved { block, distortion, budget } => write!(
                f,
                "distortion {:.1} at {block} within bounds; {budget} approved",
                from_decimal(*distortion)
            ),
            Self::RoundSettled { paid, saved } => write!(f, "executed {paid}, surplus {saved}"),
            Self::PoolReplenished { flow, pool_total } => {
                write!(f, "diastole: +{flow} into arterial pool (total {pool_total})")
            }
            Self::TransfusionDelivered {
                block, name, amount, vitality_before, vitality_after, wealth_after,
            } => write!(
                f,
                "transfusion of {amount} to {name} ({block}): vitality {vitality_before:.2} => {vitality_after:.2}, wealth {wealth_after}"
            ),
            Self::EnergyConserved { pool_total } => {
                write!(f, "systole: no critical block, conserving {pool_total}")
            }
        }
    }
}

/// An event stamped with the round it happened in (1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub round: u32,
    #[serde(flatten)]
    pub event: HeartEvent,
}

// ─── Observer ────────────────────────────────────────────────────────────────

/// External sink for event records. Sinks are fire-and-forget.
pub trait Observer {
    fn observe(&mut self, record: &EventRecord);
}

impl<F: FnMut(&EventRecord)> Observer for F {
    fn observe(&mut self, record: &EventRecord) {
        self(record)
    }
}

/// Forwards every record to `tracing` as a structured event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&mut self, record: &EventRecord) {
        tracing::info!(
            round = record.round,
            kind = record.event.kind(),
            "{}",
            record.event
        );
    }
}

// ─── Journal ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Journal {
    round: u32,
    records: Vec<EventRecord>,
    observers: Vec<Box<dyn Observer>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn emit(&mut self, event: HeartEvent) {
        let record = EventRecord { round: self.round, event };
        for observer in &mut self.observers {
            observer.observe(&record);
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take the log, leaving observers attached.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("round", &self.round)
            .field("records", &self.records.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
