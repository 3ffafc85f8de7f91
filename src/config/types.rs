//! Typed config records, built once at load time from untyped rows.

use crate::economy::currency::Coin;
use crate::skills::types::{AbilityId, SkillKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub name: String,
    pub strength: i32,
    pub hp: i32,
    pub stamina: i32,
    pub armor_class: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub abilities: Vec<AbilityId>,
    /// Skills trained from level 1, in addition to the always-present
    /// offense/defense/dodge.
    pub skills: Vec<SkillKind>,
    pub starting_weapon: Option<String>,
    pub starting_shield: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub min_level: u32,
    pub max_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camp {
    pub id: String,
    pub zone_id: String,
    pub name: String,
}

/// Immutable monster template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterArchetype {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub max_hp: i32,
    pub armor_class: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub xp_reward: u64,
    pub loot_table_id: Option<String>,
    pub is_rare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub min_damage: i32,
    pub max_damage: i32,
    pub skill: SkillKind,
}

impl WeaponProfile {
    pub fn is_piercing(&self) -> bool {
        self.skill == SkillKind::Piercing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    /// Base value in copper.
    pub value: u64,
    pub stackable: bool,
    pub max_stack: u32,
    pub weapon: Option<WeaponProfile>,
    pub is_shield: bool,
    pub armor_class: i32,
}

impl ItemDef {
    /// Largest quantity one inventory slot may hold.
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub camp_id: String,
    pub monster_id: String,
    pub weight: f64,
    pub level_range: Option<(u32, u32)>,
}

/// What a loot entry resolves to, classified when tables are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LootTarget {
    Nothing,
    Currency(Coin),
    Table(String),
    Item(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub target: LootTarget,
    pub group: u32,
    pub weight: f64,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub id: String,
    pub entries: Vec<LootEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    /// Percent of item value paid when the player sells.
    pub buy_rate: u32,
    /// Percent of item value charged when the player buys.
    pub sell_rate: u32,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Kill,
    Collect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Monster,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestTargets {
    Any,
    Ids(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub id: String,
    pub kind: QuestKind,
    pub target_type: TargetType,
    pub targets: QuestTargets,
    pub min_required: u32,
    pub max_required: u32,
    pub min_level: u32,
    pub max_level: u32,
    pub reward_xp: u64,
    pub reward_currency: u64,
    pub reward_loot_table: Option<String>,
    pub title: String,
    pub description: String,
}

impl QuestTemplate {
    pub fn fits_level(&self, level: u32) -> bool {
        self.min_level <= level && level <= self.max_level
    }
}
