// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - Flow Ledger
//
// Cumulative monetary accounting for one run. Money is Decimal, so every
// invariant is checked exactly:
//
//   proposed    = paid + saved
//   saved       = pooled + retained
//   pooled      = transfused + arterial_pool
//   wealth_now  = wealth_initial + transfused

use serde::{Deserialize, Serialize};

use crate::error::HeartError;
use crate::types::{Transfer, Yen};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowLedger {
    pub initial_wealth: Yen,
    pub total_proposed: Yen,
    pub total_paid: Yen,
    pub total_saved: Yen,
    /// Surplus drawn into the arterial pool by diastole.
    pub total_pooled: Yen,
    /// Surplus left with the treasury (`saved - pooled`).
    pub total_retained: Yen,
    pub total_transfused: Yen,
    pub clamp_count: u32,
    pub transfusion_count: u32,
}

impl FlowLedger {
    pub fn new(initial_wealth: Yen) -> Self {
        Self { initial_wealth, ..Self::default() }
    }

    // Each recorder either applies every total or none of them.

    pub fn record_regulation(&mut self, budget: Yen, transfer: &Transfer) -> Result<(), HeartError> {
        let proposed = accumulate(self.total_proposed, budget, "total proposed")?;
        let paid = accumulate(self.total_paid, transfer.paid, "total paid")?;
        let saved = accumulate(self.total_saved, transfer.saved, "total saved")?;
        self.total_proposed = proposed;
        self.total_paid = paid;
        self.total_saved = saved;
        if transfer.saved.is_positive() {
            self.clamp_count += 1;
        }
        Ok(())
    }

    pub fn record_diastole(&mut self, saved: Yen, flow: Yen) -> Result<(), HeartError> {
        let retained_now = saved.checked_sub(flow).ok_or(HeartError::Overflow("retained surplus"))?;
        let pooled = accumulate(self.total_pooled, flow, "total pooled")?;
        let retained = accumulate(self.total_retained, retained_now, "total retained")?;
        self.total_pooled = pooled;
        self.total_retained = retained;
        Ok(())
    }

    pub fn record_transfusion(&mut self, amount: Yen) -> Result<(), HeartError> {
        self.total_transfused = accumulate(self.total_transfused, amount, "total transfused")?;
        self.transfusion_count += 1;
        Ok(())
    }

    /// Verify every flow invariant against the live pool and block wealth.
    pub fn verify(&self, arterial_pool: Yen, wealth_now: Yen) -> Result<(), HeartError> {
        check(
            "proposed = paid + saved",
            self.total_proposed,
            accumulate(self.total_paid, self.total_saved, "paid + saved")?,
        )?;
        check(
            "saved = pooled + retained",
            self.total_saved,
            accumulate(self.total_pooled, self.total_retained, "pooled + retained")?,
        )?;
        check(
            "pooled = transfused + pool",
            self.total_pooled,
            accumulate(self.total_transfused, arterial_pool, "transfused + pool")?,
        )?;
        check(
            "wealth = initial + transfused",
            accumulate(self.initial_wealth, self.total_transfused, "initial + transfused")?,
            wealth_now,
        )
    }
}

fn accumulate(total: Yen, amount: Yen, what: &'static str) -> Result<Yen, HeartError> {
    total.checked_add(amount).ok_or(HeartError::Overflow(what))
}

fn check(invariant: &'static str, expected: Yen, actual: Yen) -> Result<(), HeartError> {
    if expected == actual {
        Ok(())
    } else {
        Err(HeartError::ConservationViolated {
            invariant,
            expected: expected.0,
            actual: actual.0,
        })
    }
}
