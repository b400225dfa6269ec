// Monte Carlo Infrastructure — N runs per scenario with statistical aggregation
// Run i uses seed base_seed + i, so any single run can be replayed with `heart run --seed`.

use heart_engine::adapter::yen_to_f64;
use heart_engine::{simulate, Block, SimulationReport};

use crate::report::*;
use crate::scenarios::Scenario;

use std::path::Path;
use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, seed: u64, event_dir: Option<&Path>) -> RunResult {
    let start = Instant::now();
    let config = (scenario.config)().with_seed(seed);
    let critical_policy = config.critical_policy;
    let outcome = simulate((scenario.world)(), config);
    let elapsed_us = start.elapsed().as_micros();

    let (report, blocks, events, failure) = match outcome {
        Ok(report) => {
            let blocks = report.blocks.clone();
            let events = report.events.clone();
            (Some(report), blocks, events, None)
        }
        Err(failure) => {
            tracing::warn!(seed, round = failure.round, error = %failure.error, "run aborted");
            let kind = failure.error.kind().to_string();
            (None, failure.blocks, failure.events, Some((kind, failure.round)))
        }
    };

    if let Some(dir) = event_dir {
        let path = dir.join(format!("seed-{seed}.jsonl"));
        if let Err(e) = crate::event_log::write_jsonl(&path, &events) {
            tracing::warn!(path = %path.display(), error = %e, "event log not written");
        }
    }

    let critical_at_end = blocks.iter().filter(|b| b.is_critical(&critical_policy)).count();
    summarize(seed, report.as_ref(), &blocks, critical_at_end, failure, elapsed_us)
}

fn summarize(
    seed: u64,
    report: Option<&SimulationReport>,
    blocks: &[Block],
    critical_at_end: usize,
    failure: Option<(String, u32)>,
    elapsed_us: u128,
) -> RunResult {
    let vitalities: Vec<f64> = blocks.iter().map(|b| b.vitality).collect();
    let min_vitality = vitalities.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean_vitality = vitalities.iter().sum::<f64>() / vitalities.len().max(1) as f64;

    let ledger = report.map(|r| r.ledger.clone()).unwrap_or_default();
    RunResult {
        seed,
        completed: failure.is_none(),
        failure,
        rounds: report.map(|r| r.rounds_completed).unwrap_or(0),
        clamp_count: ledger.clamp_count,
        transfusion_count: ledger.transfusion_count,
        total_saved: yen_to_f64(ledger.total_saved),
        total_pooled: yen_to_f64(ledger.total_pooled),
        total_transfused: yen_to_f64(ledger.total_transfused),
        final_pool: report.map(|r| yen_to_f64(r.arterial_pool)).unwrap_or(0.0),
        min_vitality: if vitalities.is_empty() { 0.0 } else { min_vitality },
        mean_vitality,
        critical_at_end,
        elapsed_us,
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    event_base: Option<&Path>,
) -> BatchReport {
    let event_dir = event_base.map(|base| base.join(scenario.name));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed.wrapping_add(i as u64);
        results.push(run_single(scenario, seed, event_dir.as_deref()));
    }

    aggregate(scenario, base_seed, results)
}

/// Aggregate individual runs into a BatchReport.
fn aggregate(scenario: &Scenario, base_seed: u64, results: Vec<RunResult>) -> BatchReport {
    let n = results.len();
    let completed = results.iter().filter(|r| r.completed).count();
    let stats = |f: fn(&RunResult) -> f64| results.iter().map(f).collect::<Stats>();

    BatchReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        prng: "ChaCha8Rng",
        base_seed,
        n_runs: n,
        completion_rate: if n == 0 { 0.0 } else { completed as f64 / n as f64 },
        clamp_count: stats(|r| r.clamp_count as f64),
        transfusion_count: stats(|r| r.transfusion_count as f64),
        total_transfused: stats(|r| r.total_transfused),
        final_pool: stats(|r| r.final_pool),
        min_vitality: stats(|r| r.min_vitality),
        mean_vitality: stats(|r| r.mean_vitality),
        critical_at_end: stats(|r| r.critical_at_end as f64),
        elapsed_us: stats(|r| r.elapsed_us as f64),
        individual_runs: results,
    }
}
