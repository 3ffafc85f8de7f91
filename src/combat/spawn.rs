//! Picking which monster a camp spawns.

use super::con::con;
use super::types::MonsterInstance;
use crate::config::ConfigStore;
use crate::core::log::{LogColor, LogEntry, LogKind};
use crate::core::settings::Settings;
use rand::Rng;
use tracing::warn;

/// Weighted draw over the camp's spawn entries. Returns `None` when the camp
/// has no entries or the chosen monster is missing from the store.
pub fn select_monster(camp_id: &str, store: &ConfigStore, rng: &mut impl Rng) -> Option<MonsterInstance> {
    let entries: Vec<_> = store.spawns_for_camp(camp_id).collect();
    let Some(first) = entries.first() else {
        warn!(camp = camp_id, "camp has no spawn entries");
        return None;
    };

    let total: f64 = entries.iter().map(|e| e.weight).sum();
    let mut remaining = rng.gen::<f64>() * total;
    let chosen = entries
        .iter()
        .filter(|e| e.weight > 0.0)
        .find(|e| {
            remaining -= e.weight;
            remaining <= 0.0
        })
        .unwrap_or(first);

    let Some(archetype) = store.monster(&chosen.monster_id) else {
        warn!(camp = camp_id, monster = %chosen.monster_id, "spawn entry references unknown monster");
        return None;
    };

    let mut instance = MonsterInstance::new(archetype);
    if let Some((lo, hi)) = chosen.level_range {
        instance = instance.with_level(rng.gen_range(lo..=hi.max(lo)));
    }
    Some(instance)
}

/// Log line announcing a spawn, colored by con; rare spawns stand out.
pub fn spawn_message(monster: &MonsterInstance, player_level: u32, settings: &Settings) -> LogEntry {
    if monster.archetype.is_rare {
        LogEntry::with_color(
            LogKind::Spawn,
            LogColor::Purple,
            format!("A rare {} (level {}) appears!", monster.name(), monster.level),
        )
    } else {
        let con = con(player_level, monster.level, settings);
        LogEntry::with_color(
            LogKind::Spawn,
            con.color(),
            format!("{} {}.", capitalize(monster.name()), con.describe()),
        )
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
