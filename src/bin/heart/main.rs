// The Heart Runner — single seeded runs with a live console log, and
// Monte Carlo batches with mean ± 95% CI per scenario
//
// Usage:
//   cargo run --bin heart -- run                          # Classic heartbeat on the standard world
//   cargo run --bin heart -- run strict-valve             # Named scenario
//   cargo run --bin heart -- run --preset stochastic --turns 25
//   cargo run --bin heart -- run --config c.json --blocks b.json --seed 42 --jsonl out/events.jsonl
//   cargo run --release --bin heart -- batch --runs 30    # Every scenario, 30 seeds each
//   cargo run --bin heart -- scenarios                    # List scenario names

mod event_log;
mod monte_carlo;
mod render;
mod report;
mod scenarios;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use heart_engine::{Block, Simulation, SimulationConfig, SimulationReport, TracingObserver};
use render::{banner, format_yen, TerminalObserver};
use scenarios::{find, scenarios, Scenario};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "The Heart: circulation simulation runner")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation and print the event log.
    Run(RunArgs),
    /// Run every matching scenario across many seeds.
    Batch(BatchArgs),
    /// List the built-in scenarios.
    Scenarios,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Built-in scenario providing the default world and config.
    #[arg(default_value = "classic")]
    scenario: String,
    /// JSON array of blocks replacing the scenario's world.
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// JSON simulation config replacing the scenario's config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Config preset (`classic` or `stochastic`) replacing the scenario's config.
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    #[arg(long)]
    turns: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Write every event as one JSON line to this file.
    #[arg(long)]
    jsonl: Option<PathBuf>,
    /// Print the final report as JSON instead of the console log.
    #[arg(long)]
    json: bool,
    /// Also forward every event to the tracing log.
    #[arg(long)]
    trace_events: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Substring filter on scenario name or label.
    filter: Option<String>,
    #[arg(long, default_value_t = 30)]
    runs: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Directory for per-seed JSONL event logs.
    #[arg(long)]
    events_dir: Option<PathBuf>,
    /// Write the batch report as JSON to this file.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing subscriber failed")?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::Batch(args) => batch(args),
        Command::Scenarios => {
            for s in scenarios() {
                println!("  {:<16} {}", s.name, s.label);
            }
            Ok(())
        }
    }
}

// ─── run ────────────────────────────────────────────────────────────────────

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} in {}", path.display()))
}

fn run(args: RunArgs) -> Result<()> {
    let scenario = find(&args.scenario).with_context(|| {
        format!("unknown scenario {:?} (see `heart scenarios`)", args.scenario)
    })?;

    let blocks: Vec<Block> = match &args.blocks {
        Some(path) => read_json(path, "blocks")?,
        None => (scenario.world)(),
    };
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            SimulationConfig::from_json(&text)
                .with_context(|| format!("invalid config in {}", path.display()))?
        }
        (None, Some(name)) => SimulationConfig::preset(name)
            .with_context(|| format!("unknown preset {name:?} (classic, stochastic)"))?,
        (None, None) => (scenario.config)(),
    };
    if let Some(turns) = args.turns {
        config = config.with_turns(turns);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sim = Simulation::new(blocks, config).context("invalid simulation setup")?;
    if !args.json {
        banner("SYSTEM BOOT: The Heart (Global Liquidity Protocol)");
        println!("Scenario: {} | Turns: {} | Seed: {}",
            scenario.label,
            sim.config().turn_count,
            sim.seed().map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
        );
        sim.subscribe(Box::new(TerminalObserver::new()));
    }
    if args.trace_events {
        sim.subscribe(Box::new(TracingObserver));
    }

    match sim.run() {
        Ok(report) => {
            if let Some(path) = &args.jsonl {
                event_log::write_jsonl(path, &report.events)
                    .with_context(|| format!("writing event log to {}", path.display()))?;
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            Ok(())
        }
        Err(failure) => {
            if let Some(path) = &args.jsonl {
                event_log::write_jsonl(path, &failure.events)
                    .with_context(|| format!("writing event log to {}", path.display()))?;
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            Err(failure.into())
        }
    }
}

fn print_summary(report: &SimulationReport) {
    println!();
    banner("SIMULATION COMPLETE");
    println!("  {:<6} {:<16} {:>9} {:>18}", "Block", "Name", "Vitality", "Wealth");
    println!("  {}", "-".repeat(52));
    for block in &report.blocks {
        println!("  {:<6} {:<16} {:>9.2} {:>18}",
            block.id.0, block.name, block.vitality, format_yen(block.wealth));
    }
    let ledger = &report.ledger;
    println!("  {}", "-".repeat(52));
    println!("  Rounds: {}  Clamps: {}  Transfusions: {}",
        report.rounds_completed, ledger.clamp_count, ledger.transfusion_count);
    println!("  Surplus saved: {}  Pooled: {}  Transfused: {}  Pool now: {}\n",
        format_yen(ledger.total_saved),
        format_yen(ledger.total_pooled),
        format_yen(ledger.total_transfused),
        format_yen(report.arterial_pool),
    );
}

// ─── batch ──────────────────────────────────────────────────────────────────

fn batch(args: BatchArgs) -> Result<()> {
    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &args.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.contains(&f_lower) || s.label.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };
    if to_run.is_empty() {
        bail!("no scenarios match filter {:?}", args.filter);
    }
    if args.runs == 0 {
        bail!("--runs must be at least 1");
    }

    println!("\n  The Heart Batch Runner");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", args.runs, args.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>8} {:>10} {:>16} {:>11} {:>8}",
        "Scenario", "Done%", "Clamps", "Transfus.", "Transfused(mean)", "MinVital", "Time");
    println!("  {}", "-".repeat(100));

    let suite_start = Instant::now();
    let mut reports = Vec::with_capacity(to_run.len());
    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, args.runs, args.seed, args.events_dir.as_deref());
        println!("  {:<36} {:>4}% {:>8.1} {:>10.1} {:>16.0} {:>5.2}±{:<4.2} {:>6.0}us",
            report.label,
            (report.completion_rate * 100.0) as u32,
            report.clamp_count.mean,
            report.transfusion_count.mean,
            report.total_transfused.mean,
            report.min_vitality.mean,
            report.min_vitality.margin,
            report.elapsed_us.mean,
        );
        reports.push(report);
    }

    let aborted: usize = reports.iter()
        .map(|r| r.individual_runs.iter().filter(|run| !run.completed).count())
        .sum();
    println!("  {}", "-".repeat(100));
    println!("  Scenarios: {}  Aborted runs: {}  Suite time: {:.1}s\n",
        reports.len(), aborted, suite_start.elapsed().as_secs_f64());

    if let Some(path) = &args.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("  Results saved to: {}\n", path.display());
    }

    if aborted > 0 {
        bail!("{aborted} run(s) aborted");
    }
    Ok(())
}
