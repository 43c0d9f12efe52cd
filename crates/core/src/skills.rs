//! Skill level / tier lookup tables and aggregation helpers.
//!
//! Game data delivers skills as a flat `name -> level` map. The dashboard
//! needs the derived values: which tier a level falls in, a member's total
//! level, and the top profession shown in directories.

use std::collections::BTreeMap;

/// Minimum skill level for each tier, tiers 1..=10.
///
/// Index 0 is tier 1. A level below the tier-1 threshold still counts as
/// tier 1; the game has no tier 0.
pub const TIER_THRESHOLDS: [i32; 10] = [1, 10, 20, 30, 40, 50, 60, 70, 80, 90];

/// Highest tier defined by the game.
pub const MAX_TIER: u8 = 10;

/// Tier for a single skill level.
pub fn tier_for_level(level: i32) -> u8 {
    let mut tier = 1u8;
    for (i, &min) in TIER_THRESHOLDS.iter().enumerate() {
        if level >= min {
            tier = (i + 1) as u8;
        }
    }
    tier
}

/// Sum of all skill levels. Negative levels never occur in game data but
/// are clamped anyway so a corrupt row cannot produce a nonsense total.
pub fn total_level(skills: &BTreeMap<String, i32>) -> i64 {
    skills.values().map(|&l| l.max(0) as i64).sum()
}

/// The skill with the highest level, ties broken by name ascending so the
/// result is deterministic for identical inputs.
pub fn top_profession(skills: &BTreeMap<String, i32>) -> Option<&str> {
    skills
        .iter()
        .max_by(|(name_a, level_a), (name_b, level_b)| {
            level_a.cmp(level_b).then(name_b.cmp(name_a))
        })
        .map(|(name, _)| name.as_str())
}

/// Group skill names by tier, highest tier first. Used by the skills page
/// to render one bucket per tier.
pub fn bucket_by_tier(skills: &BTreeMap<String, i32>) -> BTreeMap<u8, Vec<&str>> {
    let mut buckets: BTreeMap<u8, Vec<&str>> = BTreeMap::new();
    for (name, &level) in skills {
        buckets.entry(tier_for_level(level)).or_default().push(name);
    }
    buckets
}
