//! The read-only config store and its loader.
//!
//! A bundle is a JSON object whose keys are table names and whose values are
//! arrays of string-keyed rows, exactly as exported from the content sheets.
//! Rows are validated and coerced once here so the engine only ever sees
//! typed records.

use super::coerce::{self, Row};
use super::error::ConfigError;
use super::types::*;
use crate::core::constants::{
    BASE_ARMOR_CLASS, BASE_HP, BASE_STAMINA, BASE_STRENGTH, DEFAULT_MAX_STACK,
    LOOT_DEFAULT_GROUP, LOOT_NOTHING_ID, MERCHANT_DEFAULT_BUY_RATE, MERCHANT_DEFAULT_SELL_RATE,
    QUEST_TARGET_ANY,
};
use crate::core::settings::Settings;
use crate::economy::currency::Coin;
use crate::skills::types::{AbilityCategory, AbilityDefinition, AbilityEffect, AbilityId, SkillKind};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    pub races: BTreeMap<String, Race>,
    pub classes: BTreeMap<String, Class>,
    pub monsters: BTreeMap<String, MonsterArchetype>,
    pub items: BTreeMap<String, ItemDef>,
    pub zones: BTreeMap<String, Zone>,
    pub camps: BTreeMap<String, Camp>,
    pub abilities: BTreeMap<AbilityId, AbilityDefinition>,
    pub spawns: Vec<SpawnEntry>,
    pub loot_tables: BTreeMap<String, LootTable>,
    pub merchants: BTreeMap<String, Merchant>,
    pub quest_templates: Vec<QuestTemplate>,
    pub settings: Settings,
}

impl ConfigStore {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let root = value.as_object().ok_or(ConfigError::NotAnObject)?;

        let mut store = ConfigStore {
            settings: load_settings(root.get("settings")),
            ..Default::default()
        };

        for row in table(root, &["races"])? {
            if let Some(race) = parse_race(row) {
                insert_unique(&mut store.races, race.id.clone(), race, "race");
            }
        }
        for row in table(root, &["classes"])? {
            if let Some(class) = parse_class(row) {
                insert_unique(&mut store.classes, class.id.clone(), class, "class");
            }
        }
        for row in table(root, &["zones"])? {
            if let Some(zone) = parse_zone(row) {
                insert_unique(&mut store.zones, zone.id.clone(), zone, "zone");
            }
        }
        for row in table(root, &["camps"])? {
            if let Some(camp) = parse_camp(row) {
                insert_unique(&mut store.camps, camp.id.clone(), camp, "camp");
            }
        }
        for row in table(root, &["monsters"])? {
            if let Some(monster) = parse_monster(row) {
                insert_unique(&mut store.monsters, monster.id.clone(), monster, "monster");
            }
        }
        for row in table(root, &["items"])? {
            if let Some(item) = parse_item(row) {
                insert_unique(&mut store.items, item.id.clone(), item, "item");
            }
        }
        for row in table(root, &["abilities", "skills"])? {
            if let Some(ability) = parse_ability(row) {
                store.abilities.insert(ability.id, ability);
            }
        }
        for row in table(root, &["spawns", "spawnTables"])? {
            if let Some(spawn) = parse_spawn(row) {
                store.spawns.push(spawn);
            }
        }
        for row in table(root, &["merchants"])? {
            if let Some(merchant) = parse_merchant(row) {
                insert_unique(&mut store.merchants, merchant.id.clone(), merchant, "merchant");
            }
        }
        for row in table(root, &["questTemplates", "quests"])? {
            if let Some(template) = parse_quest_template(row) {
                store.quest_templates.push(template);
            }
        }
        store.loot_tables = load_loot_tables(&table(root, &["lootTables", "loot"])?);

        debug!(
            monsters = store.monsters.len(),
            items = store.items.len(),
            loot_tables = store.loot_tables.len(),
            quest_templates = store.quest_templates.len(),
            "config store loaded"
        );
        Ok(store)
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterArchetype> {
        self.monsters.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn loot_table(&self, id: &str) -> Option<&LootTable> {
        self.loot_tables.get(id)
    }

    pub fn merchant(&self, id: &str) -> Option<&Merchant> {
        self.merchants.get(id)
    }

    pub fn ability(&self, id: AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(&id)
    }

    pub fn race(&self, id: &str) -> Option<&Race> {
        self.races.get(id)
    }

    pub fn class(&self, id: &str) -> Option<&Class> {
        self.classes.get(id)
    }

    pub fn spawns_for_camp<'a>(&'a self, camp_id: &'a str) -> impl Iterator<Item = &'a SpawnEntry> {
        self.spawns.iter().filter(move |s| s.camp_id == camp_id)
    }
}

fn table<'a>(root: &'a Row, names: &[&str]) -> Result<Vec<&'a Row>, ConfigError> {
    let Some((name, value)) = names.iter().find_map(|n| root.get(*n).map(|v| (*n, v))) else {
        return Ok(Vec::new());
    };
    let rows = value
        .as_array()
        .ok_or_else(|| ConfigError::TableNotArray(name.to_string()))?;
    Ok(rows
        .iter()
        .filter_map(|row| {
            let parsed = row.as_object();
            if parsed.is_none() {
                warn!(table = name, "skipping non-object row");
            }
            parsed
        })
        .collect())
}

fn insert_unique<T>(map: &mut BTreeMap<String, T>, id: String, value: T, what: &str) {
    if map.contains_key(&id) {
        warn!(kind = what, id = %id, "duplicate id, later row wins");
    }
    map.insert(id, value);
}

fn required_id(row: &Row, what: &str) -> Option<String> {
    let id = coerce::string(row, "id");
    if id.is_none() {
        warn!(kind = what, "row without an id skipped");
    }
    id
}

/// Accepts `{"key": value}` or an array of `{key, value}` rows.
fn load_settings(value: Option<&Value>) -> Settings {
    match value {
        Some(Value::Object(map)) => Settings::from_map(map),
        Some(Value::Array(rows)) => {
            let mut map = Row::new();
            for row in rows.iter().filter_map(Value::as_object) {
                if let (Some(key), Some(v)) = (coerce::string(row, "key"), row.get("value")) {
                    map.insert(key, v.clone());
                }
            }
            Settings::from_map(&map)
        }
        Some(_) => {
            warn!("settings is neither an object nor an array, using defaults");
            Settings::default()
        }
        None => Settings::default(),
    }
}

fn parse_race(row: &Row) -> Option<Race> {
    let id = required_id(row, "race")?;
    Some(Race {
        name: coerce::string_or(row, "name", &id),
        strength: coerce::int(row, "strength", BASE_STRENGTH),
        hp: coerce::int(row, "hp", BASE_HP).max(1),
        stamina: coerce::int(row, "stamina", BASE_STAMINA).max(0),
        armor_class: coerce::int(row, "ac", BASE_ARMOR_CLASS).max(0),
        id,
    })
}

fn parse_class(row: &Row) -> Option<Class> {
    let id = required_id(row, "class")?;
    let abilities = coerce::list(row, "abilities")
        .iter()
        .filter_map(|a| {
            let parsed = a.parse::<AbilityId>().ok();
            if parsed.is_none() {
                warn!(class = %id, ability = %a, "unknown ability on class");
            }
            parsed
        })
        .collect();
    let skills = coerce::list(row, "skills")
        .iter()
        .filter_map(|s| {
            let parsed = s.parse::<SkillKind>().ok();
            if parsed.is_none() {
                warn!(class = %id, skill = %s, "unknown skill on class");
            }
            parsed
        })
        .collect();
    Some(Class {
        name: coerce::string_or(row, "name", &id),
        abilities,
        skills,
        starting_weapon: coerce::string(row, "startingWeapon"),
        starting_shield: coerce::string(row, "startingShield"),
        id,
    })
}

fn parse_zone(row: &Row) -> Option<Zone> {
    let id = required_id(row, "zone")?;
    let min_level = coerce::uint(row, "minLevel", 1);
    Some(Zone {
        name: coerce::string_or(row, "name", &id),
        min_level,
        max_level: coerce::uint(row, "maxLevel", min_level).max(min_level),
        id,
    })
}

fn parse_camp(row: &Row) -> Option<Camp> {
    let id = required_id(row, "camp")?;
    Some(Camp {
        name: coerce::string_or(row, "name", &id),
        zone_id: coerce::string_or(row, "zoneId", ""),
        id,
    })
}

fn parse_monster(row: &Row) -> Option<MonsterArchetype> {
    let id = required_id(row, "monster")?;
    let min_damage = coerce::int(row, "minDamage", 1).max(0);
    let max_damage = coerce::int(row, "maxDamage", min_damage).max(min_damage);
    Some(MonsterArchetype {
        name: coerce::string_or(row, "name", &id),
        level: coerce::uint(row, "level", 1).max(1),
        max_hp: coerce::int(row, "maxHp", 10).max(1),
        armor_class: coerce::int(row, "ac", 0).max(0),
        min_damage,
        max_damage,
        xp_reward: coerce::number(row, "xp", 0.0).max(0.0) as u64,
        loot_table_id: coerce::string(row, "lootTableId"),
        is_rare: coerce::boolean(row, "isRare", false),
        id,
    })
}

fn parse_item(row: &Row) -> Option<ItemDef> {
    let id = required_id(row, "item")?;
    let weapon = coerce::string(row, "weaponSkill").and_then(|skill_name| {
        let Ok(skill) = skill_name.parse::<SkillKind>() else {
            warn!(item = %id, skill = %skill_name, "unknown weapon skill, item is not a weapon");
            return None;
        };
        if !skill.is_weapon_skill() {
            warn!(item = %id, skill = %skill_name, "weapon skill is not a weapon skill");
            return None;
        }
        let min_damage = coerce::int(row, "minDamage", 1).max(0);
        Some(WeaponProfile {
            min_damage,
            max_damage: coerce::int(row, "maxDamage", min_damage).max(min_damage),
            skill,
        })
    });
    let is_shield = coerce::boolean(row, "isShield", false)
        || coerce::string(row, "type").is_some_and(|t| t.eq_ignore_ascii_case("shield"));
    let stackable = coerce::boolean(row, "stackable", false);
    Some(ItemDef {
        name: coerce::string_or(row, "name", &id),
        value: coerce::number(row, "value", 0.0).max(0.0) as u64,
        stackable,
        max_stack: if stackable {
            coerce::uint(row, "maxStack", DEFAULT_MAX_STACK).max(1)
        } else {
            1
        },
        weapon,
        is_shield,
        armor_class: coerce::int(row, "ac", 0).max(0),
        id,
    })
}

/// Proc chances may be authored as a fraction (0.15) or a percent (15).
fn proc_fraction(raw: f64) -> f64 {
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    fraction.clamp(0.0, 1.0)
}

fn parse_ability(row: &Row) -> Option<AbilityDefinition> {
    let raw_id = required_id(row, "ability")?;
    let Ok(id) = raw_id.parse::<AbilityId>() else {
        debug!(id = %raw_id, "skill row is not a combat ability, skipped");
        return None;
    };
    let category = match coerce::string(row, "category").as_deref() {
        Some(c) if c.eq_ignore_ascii_case("passive") => AbilityCategory::Passive,
        _ => AbilityCategory::Active,
    };
    let bonus = coerce::string(row, "damageBonus").map(|_| coerce::int(row, "damageBonus", 0));
    let multiplier = coerce::string(row, "damageMultiplier")
        .map(|_| coerce::number(row, "damageMultiplier", 1.0))
        .filter(|m| *m > 0.0);
    let effect = if id == AbilityId::DoubleAttack {
        AbilityEffect::ExtraAttack
    } else {
        match (bonus, multiplier) {
            (Some(_), Some(m)) => {
                warn!(ability = %raw_id, "both damageBonus and damageMultiplier set, using multiplier");
                AbilityEffect::Multiplier(m)
            }
            (None, Some(m)) => AbilityEffect::Multiplier(m),
            (Some(b), None) => AbilityEffect::FlatBonus(b),
            (None, None) => AbilityEffect::FlatBonus(0),
        }
    };
    Some(AbilityDefinition {
        id,
        name: coerce::string_or(row, "name", id.name()),
        category,
        stamina_cost: coerce::int(row, "staminaCost", 0).max(0),
        base_proc_chance: proc_fraction(coerce::number(row, "procChance", 0.0)),
        effect,
        requires_shield: coerce::boolean(row, "requiresShield", id == AbilityId::Bash),
        requires_piercing_weapon: coerce::boolean(
            row,
            "requiresPiercing",
            id == AbilityId::Backstab,
        ),
        classes: coerce::list(row, "classes"),
    })
}

fn parse_spawn(row: &Row) -> Option<SpawnEntry> {
    let (Some(camp_id), Some(monster_id)) =
        (coerce::string(row, "campId"), coerce::string(row, "monsterId"))
    else {
        warn!("spawn row without campId/monsterId skipped");
        return None;
    };
    let level_range = match (row.get("minLevel"), row.get("maxLevel")) {
        (Some(_), Some(_)) => {
            let lo = coerce::uint(row, "minLevel", 1).max(1);
            let hi = coerce::uint(row, "maxLevel", lo).max(lo);
            Some((lo, hi))
        }
        _ => None,
    };
    Some(SpawnEntry {
        camp_id,
        monster_id,
        weight: coerce::number(row, "weight", 1.0).max(0.0),
        level_range,
    })
}

fn parse_merchant(row: &Row) -> Option<Merchant> {
    let id = required_id(row, "merchant")?;
    Some(Merchant {
        name: coerce::string_or(row, "name", &id),
        buy_rate: coerce::uint(row, "buyRate", MERCHANT_DEFAULT_BUY_RATE),
        sell_rate: coerce::uint(row, "sellRate", MERCHANT_DEFAULT_SELL_RATE),
        items: coerce::list(row, "items"),
        id,
    })
}

fn parse_quest_template(row: &Row) -> Option<QuestTemplate> {
    let id = required_id(row, "quest template")?;
    let kind = match coerce::string(row, "type").as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("kill") => QuestKind::Kill,
        Some("collect") => QuestKind::Collect,
        other => {
            warn!(template = %id, kind = ?other, "unknown quest type, template skipped");
            return None;
        }
    };
    let target_type = match coerce::string(row, "targetType").as_deref() {
        Some(t) if t.eq_ignore_ascii_case("item") => TargetType::Item,
        Some(t) if t.eq_ignore_ascii_case("monster") => TargetType::Monster,
        _ => match kind {
            QuestKind::Kill => TargetType::Monster,
            QuestKind::Collect => TargetType::Item,
        },
    };
    let ids = coerce::list(row, "targetIds");
    let targets = if ids.is_empty() || ids.iter().any(|t| t.eq_ignore_ascii_case(QUEST_TARGET_ANY)) {
        QuestTargets::Any
    } else {
        QuestTargets::Ids(ids)
    };
    let min_required = coerce::uint(row, "minRequired", 1).max(1);
    let min_level = coerce::uint(row, "minLevel", 1);
    Some(QuestTemplate {
        kind,
        target_type,
        targets,
        min_required,
        max_required: coerce::uint(row, "maxRequired", min_required).max(min_required),
        min_level,
        max_level: coerce::uint(row, "maxLevel", u32::MAX).max(min_level),
        reward_xp: coerce::number(row, "rewardXp", 0.0).max(0.0) as u64,
        reward_currency: coerce::number(row, "rewardCurrency", 0.0).max(0.0) as u64,
        reward_loot_table: coerce::string(row, "rewardLootTable"),
        title: coerce::string_or(row, "title", "{target}"),
        description: coerce::string_or(row, "description", ""),
        id,
    })
}

struct RawLootEntry {
    table_id: String,
    identifier: String,
    group: u32,
    weight: f64,
    min_quantity: u32,
    max_quantity: u32,
    step: u32,
}

fn parse_raw_loot_entry(table_id: &str, row: &Row) -> Option<RawLootEntry> {
    let Some(identifier) = coerce::string(row, "itemId") else {
        warn!(table = table_id, "loot entry without itemId skipped");
        return None;
    };
    let min_quantity = coerce::uint(row, "min", 1);
    let mut max_quantity = coerce::uint(row, "max", min_quantity);
    if max_quantity < min_quantity {
        warn!(table = table_id, item = %identifier, "loot max below min, clamped");
        max_quantity = min_quantity;
    }
    Some(RawLootEntry {
        table_id: table_id.to_string(),
        identifier,
        group: coerce::uint(row, "group", LOOT_DEFAULT_GROUP),
        weight: coerce::number(row, "weight", 1.0).max(0.0),
        min_quantity,
        max_quantity,
        step: coerce::uint(row, "step", 1).max(1),
    })
}

/// Loot tables come either as flat entry rows carrying a `tableId`, or as
/// `{id, entries: [...]}` rows. Identifiers are classified once all table ids
/// are known.
fn load_loot_tables(rows: &[&Row]) -> BTreeMap<String, LootTable> {
    let mut raw = Vec::new();
    for row in rows {
        if let Some(Value::Array(entries)) = row.get("entries") {
            let Some(table_id) = required_id(row, "loot table") else {
                continue;
            };
            raw.extend(
                entries
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|entry| parse_raw_loot_entry(&table_id, entry)),
            );
        } else {
            match coerce::string(row, "tableId") {
                Some(table_id) => raw.extend(parse_raw_loot_entry(&table_id, row)),
                None => warn!("loot row without tableId skipped"),
            }
        }
    }

    let table_ids: BTreeSet<String> = raw.iter().map(|e| e.table_id.clone()).collect();
    let mut tables: BTreeMap<String, LootTable> = table_ids
        .iter()
        .map(|id| {
            (
                id.clone(),
                LootTable {
                    id: id.clone(),
                    entries: Vec::new(),
                },
            )
        })
        .collect();

    for entry in raw {
        let target = classify_loot_identifier(&entry.identifier, &table_ids);
        if let Some(table) = tables.get_mut(&entry.table_id) {
            table.entries.push(LootEntry {
                target,
                group: entry.group,
                weight: entry.weight,
                min_quantity: entry.min_quantity,
                max_quantity: entry.max_quantity,
                step: entry.step,
            });
        }
    }
    tables
}

/// Currency code first, then nested table, otherwise an item id.
pub fn classify_loot_identifier(identifier: &str, table_ids: &BTreeSet<String>) -> LootTarget {
    if identifier.eq_ignore_ascii_case(LOOT_NOTHING_ID) {
        LootTarget::Nothing
    } else if let Ok(coin) = identifier.parse::<Coin>() {
        LootTarget::Currency(coin)
    } else if table_ids.contains(identifier) {
        LootTarget::Table(identifier.to_string())
    } else {
        LootTarget::Item(identifier.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_bundle() {
        assert!(matches!(
            ConfigStore::from_value(&json!([1, 2])),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn test_rejects_table_that_is_not_an_array() {
        let err = ConfigStore::from_value(&json!({"monsters": {"id": "rat"}})).unwrap_err();
        assert!(matches!(err, ConfigError::TableNotArray(ref t) if t == "monsters"));
    }

    #[test]
    fn test_rejects_invalid_json_text() {
        assert!(matches!(
            ConfigStore::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_monster_numeric_fallbacks() {
        let store = ConfigStore::from_value(&json!({
            "monsters": [
                {"id": "rat", "name": "a rat", "level": "2", "maxHp": "oops", "minDamage": 3, "maxDamage": 1, "xp": "15"},
                {"name": "no id"}
            ]
        }))
        .unwrap();
        assert_eq!(store.monsters.len(), 1);
        let rat = store.monster("rat").unwrap();
        assert_eq!(rat.level, 2);
        assert_eq!(rat.max_hp, 10);
        assert_eq!((rat.min_damage, rat.max_damage), (3, 3));
        assert_eq!(rat.xp_reward, 15);
        assert_eq!(rat.loot_table_id, None);
    }

    #[test]
    fn test_loot_identifiers_classified_once() {
        let store = ConfigStore::from_value(&json!({
            "lootTables": [
                {"tableId": "rat", "itemId": "cp", "group": 1, "min": 1, "max": 5},
                {"tableId": "rat", "itemId": "rat_pelt", "group": 2},
                {"tableId": "rat", "itemId": "gems", "group": 3},
                {"tableId": "rat", "itemId": "nothing", "group": 2},
                {"id": "gems", "entries": [{"itemId": "ruby", "weight": "3"}]}
            ]
        }))
        .unwrap();
        let rat = store.loot_table("rat").unwrap();
        let targets: Vec<&LootTarget> = rat.entries.iter().map(|e| &e.target).collect();
        assert_eq!(
            targets,
            vec![
                &LootTarget::Currency(Coin::Copper),
                &LootTarget::Item("rat_pelt".to_string()),
                &LootTarget::Table("gems".to_string()),
                &LootTarget::Nothing,
            ]
        );
        let gems = store.loot_table("gems").unwrap();
        assert_eq!(gems.entries[0].weight, 3.0);
        assert_eq!(gems.entries[0].group, LOOT_DEFAULT_GROUP);
    }

    #[test]
    fn test_ability_effect_is_exclusive() {
        let store = ConfigStore::from_value(&json!({
            "abilities": [
                {"id": "kick", "procChance": 15, "damageBonus": 3, "staminaCost": 4},
                {"id": "backstab", "procChance": "0.1", "damageMultiplier": 2.5},
                {"id": "double_attack", "procChance": 0.2, "category": "passive"},
                {"id": "fishing"}
            ]
        }))
        .unwrap();
        let kick = store.ability(AbilityId::Kick).unwrap();
        assert_eq!(kick.effect, AbilityEffect::FlatBonus(3));
        assert!((kick.base_proc_chance - 0.15).abs() < 1e-9);
        let backstab = store.ability(AbilityId::Backstab).unwrap();
        assert_eq!(backstab.effect, AbilityEffect::Multiplier(2.5));
        assert!(backstab.requires_piercing_weapon);
        let da = store.ability(AbilityId::DoubleAttack).unwrap();
        assert_eq!(da.effect, AbilityEffect::ExtraAttack);
        assert_eq!(da.category, AbilityCategory::Passive);
        assert_eq!(store.abilities.len(), 3);
    }

    #[test]
    fn test_settings_as_key_value_rows() {
        let store = ConfigStore::from_value(&json!({
            "settings": [{"key": "questDailyLimit", "value": "7"}]
        }))
        .unwrap();
        assert_eq!(store.settings.quest_daily_limit, 7);
    }

    #[test]
    fn test_quest_template_any_target() {
        let store = ConfigStore::from_value(&json!({
            "questTemplates": [
                {"id": "q1", "type": "kill", "targetIds": "any", "minRequired": 3, "maxRequired": 1},
                {"id": "q2", "type": "Collect", "targetIds": "rat_pelt, bone"},
                {"id": "q3", "type": "escort"}
            ]
        }))
        .unwrap();
        assert_eq!(store.quest_templates.len(), 2);
        let q1 = &store.quest_templates[0];
        assert_eq!(q1.targets, QuestTargets::Any);
        assert_eq!((q1.min_required, q1.max_required), (3, 3));
        let q2 = &store.quest_templates[1];
        assert_eq!(q2.target_type, TargetType::Item);
        assert_eq!(
            q2.targets,
            QuestTargets::Ids(vec!["rat_pelt".to_string(), "bone".to_string()])
        );
    }
}
