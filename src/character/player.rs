//! The player character as the engine sees it.

use super::leveling::apply_xp;
use crate::combat::types::RoundOutcome;
use crate::config::types::{ItemDef, WeaponProfile};
use crate::config::ConfigStore;
use crate::core::constants::{BASE_ARMOR_CLASS, BASE_HP, BASE_STAMINA, BASE_STRENGTH};
use crate::loot::inventory::{add_loot_to_inventory, InsertResult, Inventory};
use crate::skills::logic::{skill_cap, starting_skills, EquipmentShape};
use crate::skills::types::{AbilityId, SkillKind, SkillRecord, SkillSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<String>,
    pub shield: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub race_id: String,
    pub class_id: String,
    pub level: u32,
    /// XP into the current level.
    pub xp: u64,
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub strength: i32,
    /// Base armor class before equipment.
    pub armor_class: i32,
    /// Copper.
    pub currency: u64,
    pub skills: SkillSet,
    pub abilities: Vec<AbilityId>,
    pub equipment: Equipment,
    pub inventory: Inventory,
}

/// What applying a round to the player changed beyond the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedRound {
    pub levels_gained: u32,
    pub inventory: InsertResult,
}

impl PlayerState {
    /// Creates a level 1 character. Unknown race or class ids fall back to
    /// baseline stats and no class kit.
    pub fn new(name: impl Into<String>, race_id: &str, class_id: &str, store: &ConfigStore) -> Self {
        let settings = &store.settings;
        let race = store.race(race_id);
        if race.is_none() {
            warn!(race = race_id, "unknown race, using baseline stats");
        }
        let class = store.class(class_id);
        if class.is_none() {
            warn!(class = class_id, "unknown class, no abilities or starting gear");
        }

        let hp = race.map_or(BASE_HP, |r| r.hp);
        let stamina = race.map_or(BASE_STAMINA, |r| r.stamina);

        let abilities: Vec<AbilityId> = class
            .map(|c| {
                c.abilities
                    .iter()
                    .copied()
                    .filter(|a| store.ability(*a).map_or(true, |def| def.usable_by_class(class_id)))
                    .collect()
            })
            .unwrap_or_default();

        let equipment = Equipment {
            weapon: class.and_then(|c| c.starting_weapon.clone()),
            shield: class.and_then(|c| c.starting_shield.clone()),
        };

        let mut kinds = vec![SkillKind::Offense, SkillKind::Defense, SkillKind::Dodge];
        if let Some(c) = class {
            kinds.extend(c.skills.iter().copied());
        }
        kinds.extend(abilities.iter().map(AbilityId::skill));
        let weapon_skill = equipment
            .weapon
            .as_deref()
            .and_then(|id| store.item(id))
            .and_then(|item| item.weapon)
            .map_or(SkillKind::HandToHand, |w| w.skill);
        kinds.push(weapon_skill);
        kinds.sort();
        kinds.dedup();

        Self {
            name: name.into(),
            race_id: race_id.to_string(),
            class_id: class_id.to_string(),
            level: 1,
            xp: 0,
            hp,
            max_hp: hp,
            stamina,
            max_stamina: stamina,
            strength: race.map_or(BASE_STRENGTH, |r| r.strength),
            armor_class: race.map_or(BASE_ARMOR_CLASS, |r| r.armor_class),
            currency: 0,
            skills: starting_skills(&kinds, 1, settings),
            abilities,
            equipment,
            inventory: Inventory::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// The equipped weapon's item definition, if it exists and is a weapon.
    pub fn weapon<'a>(&self, store: &'a ConfigStore) -> Option<&'a ItemDef> {
        let id = self.equipment.weapon.as_deref()?;
        store.item(id).filter(|item| item.weapon.is_some())
    }

    pub fn shield<'a>(&self, store: &'a ConfigStore) -> Option<&'a ItemDef> {
        let id = self.equipment.shield.as_deref()?;
        store.item(id).filter(|item| item.is_shield)
    }

    /// Weapon stats used for a swing; fists when nothing usable is equipped.
    pub fn weapon_profile(&self, store: &ConfigStore) -> WeaponProfile {
        self.weapon(store)
            .and_then(|w| w.weapon)
            .unwrap_or(WeaponProfile {
                min_damage: store.settings.unarmed_min_damage,
                max_damage: store.settings.unarmed_max_damage,
                skill: SkillKind::HandToHand,
            })
    }

    pub fn equipment_shape(&self, store: &ConfigStore) -> EquipmentShape {
        EquipmentShape {
            has_shield: self.shield(store).is_some(),
            piercing_weapon: self.weapon_profile(store).is_piercing(),
        }
    }

    /// Base armor class plus weapon and shield armor class.
    pub fn total_armor_class(&self, store: &ConfigStore) -> i32 {
        [self.weapon(store), self.shield(store)]
            .into_iter()
            .flatten()
            .fold(self.armor_class, |ac, item| ac.saturating_add(item.armor_class))
    }

    /// Equips a weapon by id, adding its skill at 0 if the character never
    /// trained it.
    pub fn equip_weapon(&mut self, item_id: &str, store: &ConfigStore) -> bool {
        let Some(profile) = store.item(item_id).and_then(|item| item.weapon) else {
            return false;
        };
        self.equipment.weapon = Some(item_id.to_string());
        if !self.skills.has(profile.skill) {
            let cap = skill_cap(self.level, &store.settings);
            self.skills.insert(profile.skill, SkillRecord::new(0, cap));
        }
        true
    }

    /// Reference reducer for a round: applies the state update, inserts loot,
    /// applies skill-ups, and processes level-ups.
    pub fn apply_round(&mut self, outcome: &RoundOutcome, store: &ConfigStore) -> AppliedRound {
        let updates = &outcome.updates;
        self.hp = updates.hp.clamp(0, self.max_hp);
        self.stamina = updates.stamina.clamp(0, self.max_stamina);
        self.currency = self.currency.saturating_add(updates.currency_gained);
        for skill_up in &outcome.skill_ups {
            self.skills.set_current(skill_up.skill, skill_up.value);
        }
        let inventory = add_loot_to_inventory(&mut self.inventory, &updates.loot);
        let levels_gained = apply_xp(self, updates.xp_gained, &store.settings);
        AppliedRound {
            levels_gained,
            inventory,
        }
    }
}
