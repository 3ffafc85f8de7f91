// Hit chance curve
pub const HIT_CHANCE_BASE: f64 = 50.0;
pub const HIT_CHANCE_MIN: f64 = 5.0;
pub const HIT_CHANCE_MAX: f64 = 95.0;
pub const HIT_SKILL_PER_DEFENDER_LEVEL: f64 = 5.0; // K1
pub const HIT_SKILL_FACTOR: f64 = 2.0; // K2
pub const HIT_LEVEL_FACTOR: f64 = 5.0; // K3

// Damage curve
pub const STRENGTH_DAMAGE_DIVISOR: i32 = 10;
pub const DAMAGE_BONUS_MIN: i32 = 0;
pub const DAMAGE_BONUS_MAX: i32 = 2;
pub const UNARMED_MIN_DAMAGE: i32 = 1;
pub const UNARMED_MAX_DAMAGE: i32 = 3;

// Armor class curve: raw * (1 - AC / (AC + C1 + level * C2))
pub const AC_MITIGATION_BASE: f64 = 100.0; // C1
pub const AC_MITIGATION_PER_LEVEL: f64 = 5.0; // C2

// XP triviality and con bands (diff = player level - monster level)
pub const XP_GREEN_THRESHOLD: i32 = 5;
pub const XP_REDUCED_THRESHOLD: i32 = 3;
pub const XP_REDUCED_MULTIPLIER: f64 = 0.5;

// XP and leveling
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;
pub const HP_PER_LEVEL: i32 = 10;
pub const STAMINA_PER_LEVEL: i32 = 5;
pub const HP_REGEN_PER_TICK: i32 = 2;
pub const STAMINA_REGEN_PER_TICK: i32 = 3;

// Skill caps: (level + bonus) * multiplier
pub const SKILL_CAP_LEVEL_BONUS: u32 = 1;
pub const SKILL_CAP_LEVEL_MULTIPLIER: u32 = 5;

// Skill-up tiers, keyed on current / cap
pub const SKILL_UP_TIER_THRESHOLDS: [f64; 4] = [0.95, 0.80, 0.60, 0.40];
pub const SKILL_UP_TIER_CHANCES: [f64; 5] = [0.01, 0.05, 0.15, 0.30, 0.50];

// Dodge: base + min(skill / divisor, max_bonus)
pub const DODGE_BASE_CHANCE: f64 = 0.05;
pub const DODGE_SKILL_DIVISOR: f64 = 500.0;
pub const DODGE_MAX_BONUS: f64 = 0.20;

// Ability proc: base + min(skill / divisor, cap)
pub const ABILITY_SKILL_DIVISOR: f64 = 100.0;
pub const ABILITY_SKILL_BONUS_CAP: f64 = 0.20;
pub const ABILITY_FLAT_SKILL_DIVISOR: i32 = 10;

// Loot
pub const LOOT_MAX_DEPTH: u32 = 10;
/// Table resolutions allowed for one top-level roll.
pub const LOOT_MAX_RESOLUTIONS: u32 = 1000;
pub const LOOT_DEFAULT_GROUP: u32 = 1;
pub const LOOT_NOTHING_ID: &str = "nothing";

// Inventory
pub const INVENTORY_SLOTS: usize = 10;
pub const DEFAULT_MAX_STACK: u32 = 20;

// Quests
pub const QUEST_DAILY_LIMIT: u32 = 5;
pub const MAX_ACTIVE_QUESTS: usize = 3;
pub const QUEST_TARGET_ANY: &str = "any";

// Merchants (percent of item value)
pub const MERCHANT_DEFAULT_BUY_RATE: u32 = 25;
pub const MERCHANT_DEFAULT_SELL_RATE: u32 = 100;

// Starting character stats when a race row leaves them out
pub const BASE_STRENGTH: i32 = 75;
pub const BASE_HP: i32 = 100;
pub const BASE_STAMINA: i32 = 50;
pub const BASE_ARMOR_CLASS: i32 = 10;
