use crate::config::types::MonsterArchetype;
use crate::core::log::LogEntry;
use crate::loot::generation::LootItem;
use crate::skills::types::SkillKind;
use serde::{Deserialize, Serialize};

/// A live monster: a copy of its archetype plus mutable hit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterInstance {
    pub archetype: MonsterArchetype,
    /// Level rolled from the spawn entry's range, else the archetype level.
    pub level: u32,
    pub current_hp: i32,
}

impl MonsterInstance {
    pub fn new(archetype: &MonsterArchetype) -> Self {
        Self {
            level: archetype.level,
            current_hp: archetype.max_hp,
            archetype: archetype.clone(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn id(&self) -> &str {
        &self.archetype.id
    }

    pub fn name(&self) -> &str {
        &self.archetype.name
    }

    pub fn max_hp(&self) -> i32 {
        self.archetype.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Stores a hit point value returned by a round, clamped to `0..=max_hp`.
    pub fn set_hp(&mut self, hp: i32) {
        self.current_hp = hp.clamp(0, self.archetype.max_hp);
    }
}

/// Relative danger of a monster, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Con {
    Green,
    LightBlue,
    White,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUp {
    pub skill: SkillKind,
    pub value: u32,
}

/// Field-level changes for the caller's state reducer. The player object
/// passed into a round is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub hp: i32,
    pub stamina: i32,
    pub xp_gained: u64,
    /// Copper.
    pub currency_gained: u64,
    pub loot: Vec<LootItem>,
    /// The current target is gone (dead) and should be cleared.
    pub clear_target: bool,
}

/// Everything one attack round produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub log: Vec<LogEntry>,
    pub updates: StateUpdate,
    pub skill_ups: Vec<SkillUp>,
    /// The monster's hit points after the round; the caller stores it.
    pub monster_hp: i32,
    pub monster_died: bool,
    pub player_died: bool,
}
