//! Loot table resolution.
//!
//! A table's entries are partitioned by `group`; each group makes one
//! weighted draw, so a table with a currency group and an item group yields
//! at most one currency roll and one item roll. Entries may point at other
//! tables, which are resolved recursively up to `LOOT_MAX_DEPTH`. A single
//! roll resolves at most `LOOT_MAX_RESOLUTIONS` tables in total, so wide
//! nested quantities cannot fan out without bound.

use crate::config::types::{ItemDef, LootEntry, LootTable, LootTarget};
use crate::config::ConfigStore;
use crate::core::constants::{LOOT_MAX_DEPTH, LOOT_MAX_RESOLUTIONS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One item stack produced by a loot roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub item: ItemDef,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    /// Copper.
    pub currency: u64,
    pub items: Vec<LootItem>,
}

impl Loot {
    pub fn is_empty(&self) -> bool {
        self.currency == 0 && self.items.is_empty()
    }

    pub fn merge(&mut self, other: Loot) {
        self.currency = self.currency.saturating_add(other.currency);
        self.items.extend(other.items);
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, i| sum.saturating_add(i.quantity))
    }
}

/// Resolves `table_id` against the store's tables and items.
pub fn generate_loot(table_id: &str, store: &ConfigStore, rng: &mut impl Rng) -> Loot {
    generate_loot_from(table_id, &store.loot_tables, &store.items, 0, rng)
}

/// Resolves a table at a given recursion depth. Missing tables and runaway
/// recursion yield empty loot plus a warning, never an error.
pub fn generate_loot_from(
    table_id: &str,
    tables: &BTreeMap<String, LootTable>,
    items: &BTreeMap<String, ItemDef>,
    depth: u32,
    rng: &mut impl Rng,
) -> Loot {
    let mut budget = Budget::new(LOOT_MAX_RESOLUTIONS);
    let loot = resolve(table_id, tables, items, depth, &mut budget, rng);
    if budget.exhausted {
        warn!(
            table = table_id,
            limit = LOOT_MAX_RESOLUTIONS,
            "loot resolution budget exhausted, result truncated"
        );
    }
    loot
}

/// Table resolutions left for the current roll.
struct Budget {
    remaining: u32,
    exhausted: bool,
}

impl Budget {
    fn new(limit: u32) -> Self {
        Self {
            remaining: limit,
            exhausted: false,
        }
    }

    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            self.exhausted = true;
            return false;
        }
        self.remaining -= 1;
        true
    }
}

fn resolve(
    table_id: &str,
    tables: &BTreeMap<String, LootTable>,
    items: &BTreeMap<String, ItemDef>,
    depth: u32,
    budget: &mut Budget,
    rng: &mut impl Rng,
) -> Loot {
    let mut loot = Loot::default();

    if depth > LOOT_MAX_DEPTH {
        warn!(table = table_id, depth, "loot table recursion limit reached, aborting");
        return loot;
    }
    let Some(table) = tables.get(table_id) else {
        warn!(table = table_id, "unknown loot table");
        return loot;
    };
    if !budget.take() {
        return loot;
    }

    for entry in select_entries(table, rng) {
        let quantity = roll_quantity(entry, rng);
        match &entry.target {
            LootTarget::Nothing => {}
            LootTarget::Currency(coin) => {
                let coins = coin.denomination().saturating_mul(quantity as u64);
                loot.currency = loot.currency.saturating_add(coins);
            }
            LootTarget::Table(nested) => {
                for _ in 0..quantity {
                    if budget.exhausted {
                        break;
                    }
                    loot.merge(resolve(nested, tables, items, depth + 1, budget, rng));
                }
            }
            LootTarget::Item(item_id) => match items.get(item_id) {
                Some(item) => loot.items.push(LootItem {
                    item: item.clone(),
                    quantity,
                }),
                None => {
                    warn!(table = table_id, item = %item_id, "loot entry references unknown item, skipped");
                }
            },
        }
    }

    debug!(
        table = table_id,
        depth,
        currency = loot.currency,
        items = loot.items.len(),
        "loot resolved"
    );
    loot
}

/// Picks at most one entry per group, groups in ascending tag order.
pub fn select_entries<'a>(table: &'a LootTable, rng: &mut impl Rng) -> Vec<&'a LootEntry> {
    let mut groups: BTreeMap<u32, Vec<&LootEntry>> = BTreeMap::new();
    for entry in &table.entries {
        groups.entry(entry.group).or_default().push(entry);
    }
    groups
        .values()
        .filter_map(|entries| weighted_pick(entries, rng))
        .filter(|entry| entry.target != LootTarget::Nothing)
        .collect()
}

/// Weighted draw: uniform roll in `[0, total)`, subtract weights until the
/// remainder is non-positive. Zero-weight entries are never picked; rounding
/// falls back to the last positive-weight entry.
fn weighted_pick<'a>(entries: &[&'a LootEntry], rng: &mut impl Rng) -> Option<&'a LootEntry> {
    let total: f64 = entries.iter().map(|e| e.weight).sum();
    if total <= 0.0 {
        return None;
    }
    let mut remaining = rng.gen::<f64>() * total;
    for entry in entries.iter().filter(|e| e.weight > 0.0) {
        remaining -= entry.weight;
        if remaining <= 0.0 {
            return Some(*entry);
        }
    }
    entries.iter().rev().find(|e| e.weight > 0.0).copied()
}

/// `min + step * k` for uniform `k` in `0..=(max - min) / step`.
pub fn roll_quantity(entry: &LootEntry, rng: &mut impl Rng) -> u32 {
    if entry.max_quantity <= entry.min_quantity {
        return entry.min_quantity;
    }
    let step = entry.step.max(1);
    let steps = (entry.max_quantity - entry.min_quantity) / step;
    entry.min_quantity + step * rng.gen_range(0..=steps)
}
