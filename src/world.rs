// Copyright 2026 Hypermesh Foundation. All rights reserved.
// The Heart Circulation Simulation - World Presets

use crate::block::Block;

/// The three-block reference world: one overheated metropolis, one healthy
/// city and one dying town.
pub fn standard_world() -> Vec<Block> {
    vec![
        Block::new("A", "Tokyo-Minato", 200_000, 999_999_999, 0.95),
        Block::new("B", "Osaka-Kita", 150_000, 50_000_000, 0.70),
        Block::new("C", "Yubari-Like", 6_000, 1_000, 0.15),
    ]
}

/// A wider world with several critical blocks competing for triage.
pub fn archipelago() -> Vec<Block> {
    vec![
        Block::new("SAP", "Sapporo-Chuo", 250_000, 400_000_000, 0.80),
        Block::new("YUB", "Yubari-Like", 6_000, 1_000, 0.15),
        Block::new("NIG", "Niigata-Coast", 40_000, 8_000, 0.45),
        Block::new("MIN", "Tokyo-Minato", 200_000, 999_999_999, 0.95),
        Block::new("KOC", "Kochi-Valley", 12_000, 2_000_000, 0.22),
        Block::new("OKI", "Oki-Islands", 2_500, 500, 0.08),
        Block::new("FUK", "Fukuoka-Hakata", 180_000, 300_000_000, 0.75),
    ]
}

/// Look up a world by name.
pub fn by_name(name: &str) -> Option<Vec<Block>> {
    match name {
        "standard" => Some(standard_world()),
        "archipelago" => Some(archipelago()),
        _ => None,
    }
}
