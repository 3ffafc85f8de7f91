//! Skill caps, skill-up rolls, dodge, and ability proc math.
//!
//! All functions are pure apart from the random draws, which come from the
//! caller's generator.

use super::types::{AbilityDefinition, SkillKind, SkillRecord, SkillSet};
use crate::core::settings::Settings;
use rand::Rng;

/// Maximum value any skill may reach at `level`.
pub fn skill_cap(level: u32, settings: &Settings) -> u32 {
    level
        .saturating_add(settings.skill_cap_level_bonus)
        .saturating_mul(settings.skill_cap_level_multiplier)
}

/// Chance (0..1) that a skill at `current` out of `cap` improves on use.
///
/// Five tiers keyed on `current / cap`; the closer to cap, the slower.
pub fn skill_up_chance(current: u32, cap: u32, settings: &Settings) -> f64 {
    if cap == 0 || current >= cap {
        return 0.0;
    }
    let ratio = current as f64 / cap as f64;
    let tier = settings
        .skill_up_thresholds
        .iter()
        .position(|threshold| ratio >= *threshold)
        .unwrap_or(settings.skill_up_thresholds.len());
    settings.skill_up_chances[tier]
}

/// Rolls a skill-up without mutating anything. Returns the new value on
/// success. A skill already at cap never improves.
pub fn roll_skill_up(record: &SkillRecord, settings: &Settings, rng: &mut impl Rng) -> Option<u32> {
    if record.is_capped() {
        return None;
    }
    let chance = skill_up_chance(record.current, record.max, settings);
    if rng.gen::<f64>() < chance {
        Some(record.current + 1)
    } else {
        None
    }
}

/// Rolls a skill-up and applies it to `record`. Returns true on success.
pub fn try_skill_up(record: &mut SkillRecord, settings: &Settings, rng: &mut impl Rng) -> bool {
    match roll_skill_up(record, settings, rng) {
        Some(value) => {
            record.current = value;
            true
        }
        None => false,
    }
}

/// Sets every skill's cap for `level`, clamping current values down.
pub fn recompute_caps(skills: &mut SkillSet, level: u32, settings: &Settings) {
    let cap = skill_cap(level, settings);
    for (_, record) in skills.iter_mut() {
        record.set_max(cap);
    }
}

/// Builds a fresh skill set for the given kinds, all at 0 with the level's cap.
pub fn starting_skills(kinds: &[SkillKind], level: u32, settings: &Settings) -> SkillSet {
    let cap = skill_cap(level, settings);
    let mut skills = SkillSet::new();
    for kind in kinds {
        skills.insert(*kind, SkillRecord::new(0, cap));
    }
    skills
}

/// Chance (0..1) to dodge an incoming attack.
pub fn dodge_chance(dodge_skill: u32, settings: &Settings) -> f64 {
    settings.dodge_base_chance
        + (dodge_skill as f64 / settings.dodge_skill_divisor).min(settings.dodge_max_bonus)
}

/// What the character currently has equipped, as far as ability
/// requirements care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquipmentShape {
    pub has_shield: bool,
    pub piercing_weapon: bool,
}

/// Whether the equipped gear satisfies an ability's requirements.
pub fn ability_eligible(ability: &AbilityDefinition, shape: EquipmentShape) -> bool {
    (!ability.requires_shield || shape.has_shield)
        && (!ability.requires_piercing_weapon || shape.piercing_weapon)
}

/// Chance (0..1) that an ability procs at the given skill value.
pub fn ability_proc_chance(ability: &AbilityDefinition, skill: u32, settings: &Settings) -> f64 {
    ability.base_proc_chance
        + (skill as f64 / settings.ability_skill_divisor).min(settings.ability_skill_bonus_cap)
}
