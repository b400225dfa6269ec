// Batch Report Types
// Structured output for Monte Carlo batches over a scenario

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

/// Normal-approximation z for a 95% interval.
const Z_95: f64 = 1.96;

/// Summary of one metric across a batch. `margin` is the half-width of the
/// 95% confidence interval around `mean`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub margin: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    pub fn ci(&self) -> (f64, f64) {
        (self.mean - self.margin, self.mean + self.margin)
    }
}

/// Welford's running mean and squared deviation, so samples stream in once.
impl FromIterator<f64> for Stats {
    fn from_iter<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut n = 0usize;
        let (mut mean, mut m2) = (0.0, 0.0);
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for x in samples {
            n += 1;
            let delta = x - mean;
            mean += delta / n as f64;
            m2 += delta * (x - mean);
            min = min.min(x);
            max = max.max(x);
        }
        if n == 0 {
            return Self::default();
        }
        let std_dev = if n > 1 { (m2 / (n - 1) as f64).sqrt() } else { 0.0 };
        Self {
            n,
            mean,
            std_dev,
            margin: Z_95 * std_dev / (n as f64).sqrt(),
            min,
            max,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub seed: u64,
    pub completed: bool,
    /// Error kind and round when the run aborted.
    pub failure: Option<(String, u32)>,
    pub rounds: u32,
    pub clamp_count: u32,
    pub transfusion_count: u32,
    pub total_saved: f64,
    pub total_pooled: f64,
    pub total_transfused: f64,
    pub final_pool: f64,
    pub min_vitality: f64,
    pub mean_vitality: f64,
    pub critical_at_end: usize,
    pub elapsed_us: u128,
}

// ─── Batch Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub scenario_name: String,
    pub label: String,
    pub prng: &'static str,
    pub base_seed: u64,
    pub n_runs: usize,
    pub completion_rate: f64,
    pub clamp_count: Stats,
    pub transfusion_count: Stats,
    pub total_transfused: Stats,
    pub final_pool: Stats,
    pub min_vitality: Stats,
    pub mean_vitality: Stats,
    pub critical_at_end: Stats,
    pub elapsed_us: Stats,
    pub individual_runs: Vec<RunResult>,
}
