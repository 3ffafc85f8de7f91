use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every trainable skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    OneHandSlashing,
    OneHandBlunt,
    Piercing,
    TwoHandSlashing,
    TwoHandBlunt,
    HandToHand,
    Offense,
    Defense,
    Dodge,
    Kick,
    Bash,
    Backstab,
    DoubleAttack,
}

impl SkillKind {
    pub const ALL: [SkillKind; 13] = [
        SkillKind::OneHandSlashing,
        SkillKind::OneHandBlunt,
        SkillKind::Piercing,
        SkillKind::TwoHandSlashing,
        SkillKind::TwoHandBlunt,
        SkillKind::HandToHand,
        SkillKind::Offense,
        SkillKind::Defense,
        SkillKind::Dodge,
        SkillKind::Kick,
        SkillKind::Bash,
        SkillKind::Backstab,
        SkillKind::DoubleAttack,
    ];

    /// Display name for the log.
    pub fn name(&self) -> &'static str {
        match self {
            SkillKind::OneHandSlashing => "1H Slashing",
            SkillKind::OneHandBlunt => "1H Blunt",
            SkillKind::Piercing => "Piercing",
            SkillKind::TwoHandSlashing => "2H Slashing",
            SkillKind::TwoHandBlunt => "2H Blunt",
            SkillKind::HandToHand => "Hand to Hand",
            SkillKind::Offense => "Offense",
            SkillKind::Defense => "Defense",
            SkillKind::Dodge => "Dodge",
            SkillKind::Kick => "Kick",
            SkillKind::Bash => "Bash",
            SkillKind::Backstab => "Backstab",
            SkillKind::DoubleAttack => "Double Attack",
        }
    }

    pub fn is_weapon_skill(&self) -> bool {
        matches!(
            self,
            SkillKind::OneHandSlashing
                | SkillKind::OneHandBlunt
                | SkillKind::Piercing
                | SkillKind::TwoHandSlashing
                | SkillKind::TwoHandBlunt
                | SkillKind::HandToHand
        )
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SkillKind {
    type Err = ();

    /// Accepts the spellings used in the skills sheet ("1hs", "1h_slashing",
    /// "one_hand_slashing", "piercing", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "1hs" | "1hslashing" | "onehandslashing" | "slashing" => Ok(SkillKind::OneHandSlashing),
            "1hb" | "1hblunt" | "onehandblunt" | "blunt" => Ok(SkillKind::OneHandBlunt),
            "pierce" | "piercing" | "1hp" | "1hpiercing" => Ok(SkillKind::Piercing),
            "2hs" | "2hslashing" | "twohandslashing" => Ok(SkillKind::TwoHandSlashing),
            "2hb" | "2hblunt" | "twohandblunt" => Ok(SkillKind::TwoHandBlunt),
            "h2h" | "handtohand" | "unarmed" => Ok(SkillKind::HandToHand),
            "offense" => Ok(SkillKind::Offense),
            "defense" => Ok(SkillKind::Defense),
            "dodge" => Ok(SkillKind::Dodge),
            "kick" => Ok(SkillKind::Kick),
            "bash" => Ok(SkillKind::Bash),
            "backstab" => Ok(SkillKind::Backstab),
            "doubleattack" => Ok(SkillKind::DoubleAttack),
            _ => Err(()),
        }
    }
}

/// Current value and level-derived cap of one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub current: u32,
    pub max: u32,
}

impl SkillRecord {
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_capped(&self) -> bool {
        self.current >= self.max
    }

    /// Sets a new cap, pulling `current` down if it now exceeds it.
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }
}

/// A character's skills, keyed by kind. Skills a class cannot train are
/// simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    skills: BTreeMap<SkillKind, SkillRecord>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: SkillKind) -> Option<&SkillRecord> {
        self.skills.get(&kind)
    }

    /// Current value, 0 for untrained skills.
    pub fn value(&self, kind: SkillKind) -> u32 {
        self.skills.get(&kind).map_or(0, |s| s.current)
    }

    pub fn has(&self, kind: SkillKind) -> bool {
        self.skills.contains_key(&kind)
    }

    pub fn insert(&mut self, kind: SkillKind, record: SkillRecord) {
        self.skills.insert(kind, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SkillKind, &SkillRecord)> {
        self.skills.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SkillKind, &mut SkillRecord)> {
        self.skills.iter_mut()
    }

    /// Sets a skill's current value, clamped to its cap. Unknown skills are
    /// ignored.
    pub fn set_current(&mut self, kind: SkillKind, value: u32) {
        if let Some(record) = self.skills.get_mut(&kind) {
            record.current = value.min(record.max);
        }
    }
}

/// Combat abilities that can proc during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityId {
    Kick,
    Bash,
    Backstab,
    DoubleAttack,
}

impl AbilityId {
    /// Order in which abilities are tried each round; the first one that
    /// procs wins.
    pub const PRIORITY: [AbilityId; 4] = [
        AbilityId::Kick,
        AbilityId::Bash,
        AbilityId::Backstab,
        AbilityId::DoubleAttack,
    ];

    pub fn skill(&self) -> SkillKind {
        match self {
            AbilityId::Kick => SkillKind::Kick,
            AbilityId::Bash => SkillKind::Bash,
            AbilityId::Backstab => SkillKind::Backstab,
            AbilityId::DoubleAttack => SkillKind::DoubleAttack,
        }
    }

    pub fn name(&self) -> &'static str {
        self.skill().name()
    }
}

impl FromStr for AbilityId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SkillKind>()? {
            SkillKind::Kick => Ok(AbilityId::Kick),
            SkillKind::Bash => Ok(AbilityId::Bash),
            SkillKind::Backstab => Ok(AbilityId::Backstab),
            SkillKind::DoubleAttack => Ok(AbilityId::DoubleAttack),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCategory {
    Passive,
    Active,
}

/// What an ability does when it procs. A definition carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityEffect {
    /// `bonus + skill / 10` added to the hit.
    FlatBonus(i32),
    /// Weapon damage scaled by the factor.
    Multiplier(f64),
    /// A second, independent swing.
    ExtraAttack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub category: AbilityCategory,
    pub stamina_cost: i32,
    /// Fraction in [0, 1].
    pub base_proc_chance: f64,
    pub effect: AbilityEffect,
    pub requires_shield: bool,
    pub requires_piercing_weapon: bool,
    /// Class ids allowed to use this ability. Empty means every class.
    pub classes: Vec<String>,
}

impl AbilityDefinition {
    pub fn usable_by_class(&self, class_id: &str) -> bool {
        self.classes.is_empty() || self.classes.iter().any(|c| c.eq_ignore_ascii_case(class_id))
    }
}
