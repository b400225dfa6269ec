// Terminal Observer — renders engine events as the classic console log
// The engine itself never formats; everything presentational lives here.

use heart_engine::adapter::from_decimal;
use heart_engine::{EventRecord, HeartEvent, Observer, Yen};

/// `¥1,234,567` with thousands separators, rounded to whole yen.
pub fn format_yen(amount: Yen) -> String {
    let whole = amount.0.round_dp(0).to_string();
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}¥{grouped}")
}

pub fn banner(title: &str) {
    println!("{}", "=".repeat(50));
    println!("   {title}");
    println!("{}", "=".repeat(50));
}

/// Prints each event as it happens.
pub struct TerminalObserver {
    last_round: u32,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self { last_round: 0 }
    }
}

impl Observer for TerminalObserver {
    fn observe(&mut self, record: &EventRecord) {
        if record.round != self.last_round {
            self.last_round = record.round;
            println!("\n--- Round {} ---", record.round);
        }
        for line in render(&record.event) {
            println!("{line}");
        }
    }
}

pub fn render(event: &HeartEvent) -> Vec<String> {
    match event {
        HeartEvent::RoundStarted { target, target_name } => {
            vec![format!("Target: {target_name} ({target})")]
        }
        HeartEvent::ProposalSubmitted { budget, fair_value, .. } => vec![format!(
            "  [LEVIATHAN] proposed budget: {} (fair value {})",
            format_yen(*budget),
            format_yen(*fair_value)
        )],
        HeartEvent::DistortionDetected { block, distortion, fair_value, .. } => vec![
            format!(
                "  [G-CART] anomaly: distortion index {:.1} (Block: {block})",
                from_decimal(*distortion)
            ),
            format!("    -> valve closed. Clamped to fair value {}.", format_yen(*fair_value)),
        ],
        HeartEvent::ProposalApproved { distortion, budget, .. } => vec![format!(
            "  [G-CART] normal: distortion index {:.1}, {} approved",
            from_decimal(*distortion),
            format_yen(*budget)
        )],
        HeartEvent::RoundSettled { paid, saved } => vec![format!(
            "-> executed: {} | surplus: {}",
            format_yen(*paid),
            format_yen(*saved)
        )],
        HeartEvent::PoolReplenished { flow, pool_total } => vec![format!(
            "  [DIASTOLE] arterial pool inflow: +{} (Total: {})",
            format_yen(*flow),
            format_yen(*pool_total)
        )],
        HeartEvent::TransfusionDelivered {
            name, amount, vitality_before, vitality_after, wealth_after, ..
        } => vec![
            format!("  [THE HEART] transfusion -> Target: {name}"),
            format!("    -> special quest budget: {}", format_yen(*amount)),
            format!("    -> vitality: {vitality_before:.2} => {vitality_after:.2}"),
            format!("    -> regional wealth: {}", format_yen(*wealth_after)),
        ],
        HeartEvent::EnergyConserved { pool_total } => vec![format!(
            "  [SYSTOLE] all blocks healthy. Conserving energy ({}).",
            format_yen(*pool_total)
        )],
    }
}
