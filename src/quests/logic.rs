//! Quest generation, progress tracking, turn-in, and the daily limit.

use super::types::{
    QuestError, QuestEvent, QuestInstance, QuestLog, QuestReward, QuestRewards, QuestStatus,
    Transition,
};
use crate::character::leveling::apply_xp;
use crate::character::player::{AppliedRound, PlayerState};
use crate::config::types::{QuestKind, QuestTargets, QuestTemplate, TargetType};
use crate::config::ConfigStore;
use crate::core::log::{LogEntry, LogKind};
use crate::economy::currency::format_currency;
use crate::loot::generation::generate_loot;
use crate::loot::inventory::add_loot_to_inventory;
use chrono::{DateTime, Days, Duration, NaiveTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

/// First UTC midnight strictly after `now`.
pub fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// Candidate `(id, name)` targets for a template.
fn target_candidates(template: &QuestTemplate, store: &ConfigStore) -> Vec<(String, String)> {
    match (&template.targets, template.target_type) {
        (QuestTargets::Ids(ids), target_type) => ids
            .iter()
            .map(|id| {
                let name = match target_type {
                    TargetType::Monster => store.monster(id).map(|m| m.name.clone()),
                    TargetType::Item => store.item(id).map(|i| i.name.clone()),
                };
                let name = name.unwrap_or_else(|| {
                    warn!(template = %template.id, target = %id, "quest target not in config");
                    id.clone()
                });
                (id.clone(), name)
            })
            .collect(),
        (QuestTargets::Any, TargetType::Monster) => {
            let in_range: Vec<_> = store
                .monsters
                .values()
                .filter(|m| template.fits_level(m.level))
                .map(|m| (m.id.clone(), m.name.clone()))
                .collect();
            if in_range.is_empty() {
                store
                    .monsters
                    .values()
                    .map(|m| (m.id.clone(), m.name.clone()))
                    .collect()
            } else {
                in_range
            }
        }
        (QuestTargets::Any, TargetType::Item) => store
            .items
            .values()
            .map(|i| (i.id.clone(), i.name.clone()))
            .collect(),
    }
}

fn interpolate(text: &str, count: u32, target: &str) -> String {
    text.replace("{count}", &count.to_string()).replace("{target}", target)
}

impl QuestLog {
    /// An empty log whose first reset is the next UTC midnight.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            quests: Vec::new(),
            completed_today: 0,
            next_reset: next_midnight(now),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&QuestInstance> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn with_status(&self, status: QuestStatus) -> impl Iterator<Item = &QuestInstance> {
        self.quests.iter().filter(move |q| q.status == status)
    }

    /// Quests the player is working on or ready to hand in.
    pub fn active_count(&self) -> usize {
        self.quests
            .iter()
            .filter(|q| q.status != QuestStatus::Available)
            .count()
    }

    fn index_of(&self, id: Uuid) -> Result<usize, QuestError> {
        self.quests
            .iter()
            .position(|q| q.id == id)
            .ok_or(QuestError::NotFound(id))
    }

    /// Generates a new available quest for `player_level` from a template not
    /// already in the log.
    pub fn generate(
        &mut self,
        player_level: u32,
        store: &ConfigStore,
        rng: &mut impl Rng,
    ) -> Result<&QuestInstance, QuestError> {
        let eligible: Vec<&QuestTemplate> = store
            .quest_templates
            .iter()
            .filter(|t| t.fits_level(player_level))
            .filter(|t| !self.quests.iter().any(|q| q.template_id == t.id))
            .collect();
        let template = eligible
            .choose(rng)
            .ok_or(QuestError::NoEligibleTemplate(player_level))?;

        let candidates = target_candidates(template, store);
        let Some((target, target_name)) = candidates.choose(rng).cloned() else {
            warn!(template = %template.id, "quest template has no possible targets");
            return Err(QuestError::NoEligibleTemplate(player_level));
        };

        let low = template.min_required.max(1);
        let required = rng.gen_range(low..=template.max_required.max(low));

        let quest = QuestInstance {
            id: Uuid::new_v4(),
            template_id: template.id.clone(),
            kind: template.kind,
            target_type: template.target_type,
            title: interpolate(&template.title, required, &target_name),
            description: interpolate(&template.description, required, &target_name),
            target,
            target_name,
            required,
            progress: 0,
            status: QuestStatus::Available,
            rewards: QuestRewards {
                xp: template.reward_xp,
                currency: template.reward_currency,
                loot_table: template.reward_loot_table.clone(),
            },
        };
        debug!(quest = %quest.id, template = %quest.template_id, "generated quest");
        self.quests.push(quest);
        Ok(&self.quests[self.quests.len() - 1])
    }

    fn apply_event(&mut self, id: Uuid, event: QuestEvent) -> Result<Transition, QuestError> {
        let index = self.index_of(id)?;
        let status = self.quests[index].status;
        let transition = status.transition(event);
        match transition {
            Transition::To(next) => self.quests[index].status = next,
            Transition::Removed => {
                self.quests.remove(index);
            }
            Transition::Invalid => {
                let label = status.label();
                return Err(match event {
                    QuestEvent::Accept | QuestEvent::Decline => QuestError::NotAvailable(label),
                    QuestEvent::Abandon | QuestEvent::Complete => QuestError::NotActive(label),
                    QuestEvent::TurnIn => QuestError::NotReady(label),
                });
            }
        }
        Ok(transition)
    }

    /// Moves an available quest to active, respecting the active cap.
    pub fn accept(&mut self, id: Uuid, max_active: usize) -> Result<(), QuestError> {
        let index = self.index_of(id)?;
        if self.quests[index].status == QuestStatus::Available && self.active_count() >= max_active {
            return Err(QuestError::TooManyActive(max_active));
        }
        self.apply_event(id, QuestEvent::Accept).map(|_| ())
    }

    /// Drops an available quest without taking it.
    pub fn decline(&mut self, id: Uuid) -> Result<(), QuestError> {
        self.apply_event(id, QuestEvent::Decline).map(|_| ())
    }

    /// Drops an active quest. No rewards.
    pub fn abandon(&mut self, id: Uuid) -> Result<(), QuestError> {
        self.apply_event(id, QuestEvent::Abandon).map(|_| ())
    }

    fn advance(&mut self, kind: QuestKind, target: &str, amount: u32) -> Vec<LogEntry> {
        let mut log = Vec::new();
        for quest in self
            .quests
            .iter_mut()
            .filter(|q| q.status == QuestStatus::Active && q.kind == kind && q.target == target)
        {
            quest.progress = quest.progress.saturating_add(amount).min(quest.required);
            if quest.is_complete() {
                if let Transition::To(next) = quest.status.transition(QuestEvent::Complete) {
                    quest.status = next;
                }
                log.push(LogEntry::new(
                    LogKind::Quest,
                    format!("Quest complete: {}. Return to turn it in.", quest.title),
                ));
            } else {
                log.push(LogEntry::new(
                    LogKind::Quest,
                    format!("{}: {}/{}", quest.title, quest.progress, quest.required),
                ));
            }
        }
        log
    }

    /// A monster died. Each matching active kill quest advances by one.
    pub fn record_kill(&mut self, monster_id: &str) -> Vec<LogEntry> {
        self.advance(QuestKind::Kill, monster_id, 1)
    }

    /// Items were picked up. Matching active collect quests advance by the
    /// quantity.
    pub fn record_collect(&mut self, item_id: &str, quantity: u32) -> Vec<LogEntry> {
        if quantity == 0 {
            return Vec::new();
        }
        self.advance(QuestKind::Collect, item_id, quantity)
    }

    /// Resets the daily counter once `now` passes the stored deadline, then
    /// pushes the deadline out in whole days until it lies after `now`, so
    /// days spent away still count as a single reset. Returns whether a reset
    /// happened.
    pub fn refresh_daily(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_reset {
            return false;
        }
        self.completed_today = 0;
        let days_missed = (now - self.next_reset).num_days() + 1;
        self.next_reset = self
            .next_reset
            .checked_add_signed(Duration::days(days_missed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(days_missed, next_reset = %self.next_reset, "quest daily limit reset");
        true
    }

    /// Hands in a ready quest. Rejected past the daily limit without touching
    /// the counter or the quest.
    pub fn turn_in(
        &mut self,
        id: Uuid,
        now: DateTime<Utc>,
        store: &ConfigStore,
        rng: &mut impl Rng,
    ) -> Result<QuestReward, QuestError> {
        self.refresh_daily(now);
        let limit = store.settings.quest_daily_limit;
        let index = self.index_of(id)?;
        let status = self.quests[index].status;
        if status != QuestStatus::Ready {
            return Err(QuestError::NotReady(status.label()));
        }
        if self.completed_today >= limit {
            return Err(QuestError::DailyLimitReached(limit));
        }

        let quest = self.quests[index].clone();
        self.apply_event(id, QuestEvent::TurnIn)?;
        self.completed_today += 1;

        let loot = quest
            .rewards
            .loot_table
            .as_deref()
            .map(|table| generate_loot(table, store, rng))
            .unwrap_or_default();

        let mut log = vec![LogEntry::new(
            LogKind::Quest,
            format!("You turn in {}.", quest.title),
        )];
        if quest.rewards.xp > 0 {
            log.push(LogEntry::new(
                LogKind::Experience,
                format!("You gain experience! (+{} XP)", quest.rewards.xp),
            ));
        }
        let currency = quest.rewards.currency.saturating_add(loot.currency);
        if currency > 0 {
            log.push(LogEntry::new(
                LogKind::Currency,
                format!("You receive {}.", format_currency(currency)),
            ));
        }
        for item in &loot.items {
            log.push(LogEntry::new(
                LogKind::Loot,
                format!("You receive {} x{}.", item.item.name, item.quantity),
            ));
        }

        Ok(QuestReward {
            xp: quest.rewards.xp,
            currency: quest.rewards.currency,
            loot,
            log,
        })
    }
}

impl QuestReward {
    /// Credits XP, coin, and items to the player.
    pub fn apply_to(&self, player: &mut PlayerState, store: &ConfigStore) -> AppliedRound {
        let coin = self.currency.saturating_add(self.loot.currency);
        player.currency = player.currency.saturating_add(coin);
        let inventory = add_loot_to_inventory(&mut player.inventory, &self.loot.items);
        let levels_gained = apply_xp(player, self.xp, &store.settings);
        AppliedRound {
            levels_gained,
            inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ItemDef, MonsterArchetype};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    fn monster(id: &str, level: u32) -> MonsterArchetype {
        MonsterArchetype {
            id: id.into(),
            name: format!("a {id}"),
            level,
            max_hp: 10,
            armor_class: 0,
            min_damage: 1,
            max_damage: 2,
            xp_reward: 5,
            loot_table_id: None,
            is_rare: false,
        }
    }

    fn template(id: &str, kind: QuestKind, targets: QuestTargets) -> QuestTemplate {
        QuestTemplate {
            id: id.into(),
            kind,
            target_type: match kind {
                QuestKind::Kill => TargetType::Monster,
                QuestKind::Collect => TargetType::Item,
            },
            targets,
            min_required: 3,
            max_required: 3,
            min_level: 1,
            max_level: 10,
            reward_xp: 50,
            reward_currency: 120,
            reward_loot_table: None,
            title: "Slay {count} {target}".into(),
            description: "Bring proof of {count} kills.".into(),
        }
    }

    fn store() -> ConfigStore {
        let mut store = ConfigStore::default();
        for m in [monster("rat", 1), monster("wolf", 3), monster("dragon", 40)] {
            store.monsters.insert(m.id.clone(), m);
        }
        store.items.insert(
            "pelt".into(),
            ItemDef {
                id: "pelt".into(),
                name: "Wolf Pelt".into(),
                value: 5,
                stackable: true,
                max_stack: 20,
                weapon: None,
                is_shield: false,
                armor_class: 0,
            },
        );
        store.quest_templates = vec![
            template("rats", QuestKind::Kill, QuestTargets::Ids(vec!["rat".into()])),
            template("pelts", QuestKind::Collect, QuestTargets::Any),
        ];
        store
    }

    fn accepted_kill_quest(log: &mut QuestLog, store: &ConfigStore) -> Uuid {
        let mut rng = create_test_rng();
        loop {
            let quest = log.generate(1, store, &mut rng).unwrap();
            if quest.template_id == "rats" {
                let id = quest.id;
                log.accept(id, 3).unwrap();
                return id;
            }
            let id = quest.id;
            log.decline(id).unwrap();
        }
    }

    #[test]
    fn test_next_midnight() {
        let reset = next_midnight(now());
        assert_eq!(reset, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_generate_interpolates_and_skips_duplicates() {
        let store = store();
        let mut log = QuestLog::new(now());
        let mut rng = create_test_rng();
        log.generate(1, &store, &mut rng).unwrap();
        log.generate(1, &store, &mut rng).unwrap();
        assert_eq!(
            log.generate(1, &store, &mut rng).unwrap_err(),
            QuestError::NoEligibleTemplate(1)
        );

        let rats = log.quests.iter().find(|q| q.template_id == "rats").unwrap();
        assert_eq!(rats.title, "Slay 3 a rat");
        assert_eq!(rats.status, QuestStatus::Available);
        assert_eq!(rats.progress, 0);
        assert_eq!(rats.rewards.currency, 120);
    }

    #[test]
    fn test_any_target_picks_from_items() {
        let store = store();
        let mut log = QuestLog::new(now());
        let mut rng = create_test_rng();
        log.generate(1, &store, &mut rng).unwrap();
        log.generate(1, &store, &mut rng).unwrap();
        let pelts = log.quests.iter().find(|q| q.template_id == "pelts").unwrap();
        assert_eq!(pelts.target, "pelt");
        assert_eq!(pelts.target_name, "Wolf Pelt");
    }

    #[test]
    fn test_level_range_filters_templates() {
        let store = store();
        let mut log = QuestLog::new(now());
        let mut rng = create_test_rng();
        assert_eq!(
            log.generate(50, &store, &mut rng).unwrap_err(),
            QuestError::NoEligibleTemplate(50)
        );
    }

    #[test]
    fn test_progress_clamps_and_flips_to_ready() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);

        assert!(log.record_kill("wolf").is_empty());
        log.record_kill("rat");
        log.record_kill("rat");
        assert_eq!(log.get(id).unwrap().status, QuestStatus::Active);
        log.record_kill("rat");
        log.record_kill("rat");
        let quest = log.get(id).unwrap();
        assert_eq!(quest.progress, 3);
        assert_eq!(quest.status, QuestStatus::Ready);
    }

    #[test]
    fn test_available_quests_do_not_progress() {
        let store = store();
        let mut log = QuestLog::new(now());
        let mut rng = create_test_rng();
        log.generate(1, &store, &mut rng).unwrap();
        log.generate(1, &store, &mut rng).unwrap();
        log.record_kill("rat");
        log.record_collect("pelt", 10);
        assert!(log.quests.iter().all(|q| q.progress == 0));
    }

    #[test]
    fn test_accept_respects_active_cap() {
        let store = store();
        let mut log = QuestLog::new(now());
        let mut rng = create_test_rng();
        let first = log.generate(1, &store, &mut rng).unwrap().id;
        let second = log.generate(1, &store, &mut rng).unwrap().id;
        log.accept(first, 1).unwrap();
        assert_eq!(log.accept(second, 1), Err(QuestError::TooManyActive(1)));
        assert_eq!(log.accept(first, 5), Err(QuestError::NotAvailable("active")));
    }

    #[test]
    fn test_turn_in_grants_rewards_and_counts() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);
        for _ in 0..3 {
            log.record_kill("rat");
        }
        let mut rng = create_test_rng();
        let reward = log.turn_in(id, now(), &store, &mut rng).unwrap();
        assert_eq!(reward.xp, 50);
        assert_eq!(reward.currency, 120);
        assert_eq!(log.completed_today, 1);
        assert!(log.get(id).is_none());

        let mut player = PlayerState::new("Tester", "human", "warrior", &store);
        reward.apply_to(&mut player, &store);
        assert_eq!(player.currency, 120);
        assert_eq!(player.xp, 50);
    }

    #[test]
    fn test_turn_in_rejected_at_daily_limit() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);
        for _ in 0..3 {
            log.record_kill("rat");
        }
        log.completed_today = 5;
        let mut rng = create_test_rng();
        assert_eq!(
            log.turn_in(id, now(), &store, &mut rng),
            Err(QuestError::DailyLimitReached(5))
        );
        assert_eq!(log.completed_today, 5);
        assert_eq!(log.get(id).unwrap().status, QuestStatus::Ready);
    }

    #[test]
    fn test_turn_in_requires_ready() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);
        let mut rng = create_test_rng();
        assert_eq!(
            log.turn_in(id, now(), &store, &mut rng),
            Err(QuestError::NotReady("active"))
        );
    }

    #[test]
    fn test_daily_reset_after_midnight() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);
        for _ in 0..3 {
            log.record_kill("rat");
        }
        log.completed_today = 5;
        let after_midnight = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 1).unwrap();
        let mut rng = create_test_rng();
        assert!(log.turn_in(id, after_midnight, &store, &mut rng).is_ok());
        assert_eq!(log.completed_today, 1);
        assert_eq!(log.next_reset, Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_days_away_count_as_one_reset() {
        let mut log = QuestLog::new(now());
        let days_later = now() + Duration::days(4);
        log.completed_today = 5;
        assert!(log.refresh_daily(days_later));
        assert_eq!(log.completed_today, 0);

        log.completed_today = 3;
        for _ in 0..10 {
            assert!(!log.refresh_daily(days_later));
        }
        assert_eq!(log.completed_today, 3);
        assert_eq!(log.next_reset, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert!(log.refresh_daily(log.next_reset));
    }

    #[test]
    fn test_daily_limit_holds_after_days_away() {
        let store = store();
        let mut log = QuestLog::new(now());
        let days_later = now() + Duration::days(4);
        let mut rng = create_test_rng();
        let mut turned_in = 0;
        for _ in 0..10 {
            let id = accepted_kill_quest(&mut log, &store);
            for _ in 0..3 {
                log.record_kill("rat");
            }
            match log.turn_in(id, days_later, &store, &mut rng) {
                Ok(_) => turned_in += 1,
                Err(err) => {
                    assert_eq!(err, QuestError::DailyLimitReached(5));
                    break;
                }
            }
        }
        assert_eq!(turned_in, 5);
    }

    #[test]
    fn test_abandon_only_active() {
        let store = store();
        let mut log = QuestLog::new(now());
        let id = accepted_kill_quest(&mut log, &store);
        log.abandon(id).unwrap();
        assert!(log.get(id).is_none());
        assert_eq!(log.abandon(id), Err(QuestError::NotFound(id)));

        let mut rng = create_test_rng();
        let fresh = log.generate(1, &store, &mut rng).unwrap().id;
        assert_eq!(log.abandon(fresh), Err(QuestError::NotActive("available")));
    }
}
