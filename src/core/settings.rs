//! Numeric tuning constants.
//!
//! Settings arrive as a flat, externally editable key/value map. Every key is
//! optional; anything absent or unparsable keeps the default from
//! `core::constants`.

use super::constants::*;
use crate::config::coerce::{self, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // Hit chance
    pub hit_chance_base: f64,
    pub hit_chance_min: f64,
    pub hit_chance_max: f64,
    pub hit_skill_per_level: f64,
    pub hit_skill_factor: f64,
    pub hit_level_factor: f64,

    // Damage
    pub strength_damage_divisor: i32,
    pub damage_bonus_min: i32,
    pub damage_bonus_max: i32,
    pub unarmed_min_damage: i32,
    pub unarmed_max_damage: i32,

    // Armor class
    pub ac_mitigation_base: f64,
    pub ac_mitigation_per_level: f64,

    // XP triviality
    pub xp_green_threshold: i32,
    pub xp_reduced_threshold: i32,
    pub xp_reduced_multiplier: f64,

    // Leveling
    pub xp_curve_base: f64,
    pub xp_curve_exponent: f64,
    pub hp_per_level: i32,
    pub stamina_per_level: i32,
    pub hp_regen_per_tick: i32,
    pub stamina_regen_per_tick: i32,

    // Skills
    pub skill_cap_level_bonus: u32,
    pub skill_cap_level_multiplier: u32,
    pub skill_up_thresholds: [f64; 4],
    pub skill_up_chances: [f64; 5],

    // Dodge
    pub dodge_base_chance: f64,
    pub dodge_skill_divisor: f64,
    pub dodge_max_bonus: f64,

    // Abilities
    pub ability_skill_divisor: f64,
    pub ability_skill_bonus_cap: f64,
    pub ability_flat_skill_divisor: i32,

    // Quests
    pub quest_daily_limit: u32,
    pub max_active_quests: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hit_chance_base: HIT_CHANCE_BASE,
            hit_chance_min: HIT_CHANCE_MIN,
            hit_chance_max: HIT_CHANCE_MAX,
            hit_skill_per_level: HIT_SKILL_PER_DEFENDER_LEVEL,
            hit_skill_factor: HIT_SKILL_FACTOR,
            hit_level_factor: HIT_LEVEL_FACTOR,
            strength_damage_divisor: STRENGTH_DAMAGE_DIVISOR,
            damage_bonus_min: DAMAGE_BONUS_MIN,
            damage_bonus_max: DAMAGE_BONUS_MAX,
            unarmed_min_damage: UNARMED_MIN_DAMAGE,
            unarmed_max_damage: UNARMED_MAX_DAMAGE,
            ac_mitigation_base: AC_MITIGATION_BASE,
            ac_mitigation_per_level: AC_MITIGATION_PER_LEVEL,
            xp_green_threshold: XP_GREEN_THRESHOLD,
            xp_reduced_threshold: XP_REDUCED_THRESHOLD,
            xp_reduced_multiplier: XP_REDUCED_MULTIPLIER,
            xp_curve_base: XP_CURVE_BASE,
            xp_curve_exponent: XP_CURVE_EXPONENT,
            hp_per_level: HP_PER_LEVEL,
            stamina_per_level: STAMINA_PER_LEVEL,
            hp_regen_per_tick: HP_REGEN_PER_TICK,
            stamina_regen_per_tick: STAMINA_REGEN_PER_TICK,
            skill_cap_level_bonus: SKILL_CAP_LEVEL_BONUS,
            skill_cap_level_multiplier: SKILL_CAP_LEVEL_MULTIPLIER,
            skill_up_thresholds: SKILL_UP_TIER_THRESHOLDS,
            skill_up_chances: SKILL_UP_TIER_CHANCES,
            dodge_base_chance: DODGE_BASE_CHANCE,
            dodge_skill_divisor: DODGE_SKILL_DIVISOR,
            dodge_max_bonus: DODGE_MAX_BONUS,
            ability_skill_divisor: ABILITY_SKILL_DIVISOR,
            ability_skill_bonus_cap: ABILITY_SKILL_BONUS_CAP,
            ability_flat_skill_divisor: ABILITY_FLAT_SKILL_DIVISOR,
            quest_daily_limit: QUEST_DAILY_LIMIT,
            max_active_quests: MAX_ACTIVE_QUESTS,
        }
    }
}

impl Settings {
    /// Builds settings from a flat key/value map, keeping defaults for
    /// anything missing or invalid.
    pub fn from_map(map: &Row) -> Self {
        let d = Settings::default();
        let f = |key: &str, default: f64| coerce::number(map, key, default);
        let i = |key: &str, default: i32| coerce::int(map, key, default);
        let u = |key: &str, default: u32| coerce::uint(map, key, default);

        let mut thresholds = d.skill_up_thresholds;
        for (idx, slot) in thresholds.iter_mut().enumerate() {
            *slot = f(&format!("skillUpThreshold{}", idx + 1), *slot);
        }
        let mut chances = d.skill_up_chances;
        for (idx, slot) in chances.iter_mut().enumerate() {
            *slot = f(&format!("skillUpChance{}", idx + 1), *slot);
        }

        let settings = Self {
            hit_chance_base: f("hitChanceBase", d.hit_chance_base),
            hit_chance_min: f("hitChanceMin", d.hit_chance_min),
            hit_chance_max: f("hitChanceMax", d.hit_chance_max),
            hit_skill_per_level: f("hitSkillPerLevel", d.hit_skill_per_level),
            hit_skill_factor: f("hitSkillFactor", d.hit_skill_factor),
            hit_level_factor: f("hitLevelFactor", d.hit_level_factor),
            strength_damage_divisor: i("strengthDamageDivisor", d.strength_damage_divisor),
            damage_bonus_min: i("damageBonusMin", d.damage_bonus_min),
            damage_bonus_max: i("damageBonusMax", d.damage_bonus_max),
            unarmed_min_damage: i("unarmedMinDamage", d.unarmed_min_damage),
            unarmed_max_damage: i("unarmedMaxDamage", d.unarmed_max_damage),
            ac_mitigation_base: f("acMitigationBase", d.ac_mitigation_base),
            ac_mitigation_per_level: f("acMitigationPerLevel", d.ac_mitigation_per_level),
            xp_green_threshold: i("xpGreenThreshold", d.xp_green_threshold),
            xp_reduced_threshold: i("xpReducedThreshold", d.xp_reduced_threshold),
            xp_reduced_multiplier: f("xpReducedMultiplier", d.xp_reduced_multiplier),
            xp_curve_base: f("xpCurveBase", d.xp_curve_base),
            xp_curve_exponent: f("xpCurveExponent", d.xp_curve_exponent),
            hp_per_level: i("hpPerLevel", d.hp_per_level),
            stamina_per_level: i("staminaPerLevel", d.stamina_per_level),
            hp_regen_per_tick: i("hpRegenPerTick", d.hp_regen_per_tick),
            stamina_regen_per_tick: i("staminaRegenPerTick", d.stamina_regen_per_tick),
            skill_cap_level_bonus: u("skillCapLevelBonus", d.skill_cap_level_bonus),
            skill_cap_level_multiplier: u("skillCapLevelMultiplier", d.skill_cap_level_multiplier),
            skill_up_thresholds: thresholds,
            skill_up_chances: chances,
            dodge_base_chance: f("dodgeBaseChance", d.dodge_base_chance),
            dodge_skill_divisor: f("dodgeSkillDivisor", d.dodge_skill_divisor),
            dodge_max_bonus: f("dodgeMaxBonus", d.dodge_max_bonus),
            ability_skill_divisor: f("abilitySkillDivisor", d.ability_skill_divisor),
            ability_skill_bonus_cap: f("abilitySkillBonusCap", d.ability_skill_bonus_cap),
            ability_flat_skill_divisor: i("abilityFlatSkillDivisor", d.ability_flat_skill_divisor),
            quest_daily_limit: u("questDailyLimit", d.quest_daily_limit),
            max_active_quests: u("maxActiveQuests", d.max_active_quests as u32) as usize,
        };
        settings.sanitized()
    }

    /// Repairs combinations that would break the formulas (zero divisors,
    /// inverted ranges).
    fn sanitized(mut self) -> Self {
        let d = Settings::default();
        if self.hit_chance_min > self.hit_chance_max {
            std::mem::swap(&mut self.hit_chance_min, &mut self.hit_chance_max);
        }
        if self.damage_bonus_min > self.damage_bonus_max {
            std::mem::swap(&mut self.damage_bonus_min, &mut self.damage_bonus_max);
        }
        if self.unarmed_min_damage > self.unarmed_max_damage {
            std::mem::swap(&mut self.unarmed_min_damage, &mut self.unarmed_max_damage);
        }
        if self.strength_damage_divisor <= 0 {
            self.strength_damage_divisor = d.strength_damage_divisor;
        }
        if self.ability_flat_skill_divisor <= 0 {
            self.ability_flat_skill_divisor = d.ability_flat_skill_divisor;
        }
        if self.dodge_skill_divisor <= 0.0 {
            self.dodge_skill_divisor = d.dodge_skill_divisor;
        }
        if self.ability_skill_divisor <= 0.0 {
            self.ability_skill_divisor = d.ability_skill_divisor;
        }
        if self.skill_cap_level_multiplier == 0 {
            self.skill_cap_level_multiplier = d.skill_cap_level_multiplier;
        }
        self
    }
}
