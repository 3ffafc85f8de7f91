//! Main simulation runner.
//!
//! Drives the same entry points a real client would: spawn, resolve rounds
//! until someone dies, apply the outcome, advance quests, sell when the bags
//! fill, rest. Statistics are tracked externally from the round outcomes.

use super::config::SimConfig;
use super::report::SimReport;
use crate::character::leveling::regen_tick;
use crate::character::player::PlayerState;
use crate::combat::logic::resolve_round;
use crate::combat::spawn::select_monster;
use crate::config::types::Merchant;
use crate::config::ConfigStore;
use crate::economy::trade::sell;
use crate::quests::types::{QuestError, QuestLog, QuestStatus};
use crate::skills::types::SkillKind;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Upper bound on regeneration ticks between encounters.
const MAX_REST_TICKS: u32 = 10_000;

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig, store: &ConfigStore) -> SimReport {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        let run = simulate_single_run(config, store, &mut rng);
        debug!(
            run = run_idx + 1,
            kills = run.kills,
            deaths = run.deaths,
            level = run.final_level,
            "simulation run finished"
        );
        all_runs.push(run);
    }

    SimReport::from_runs(all_runs, config)
}

/// Statistics for one simulated character.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub encounters: u32,
    pub kills: u64,
    pub deaths: u64,
    /// Encounters abandoned after the round limit.
    pub stalemates: u64,
    pub rounds: u64,
    /// Rounds spent in encounters that ended in a kill.
    pub kill_rounds: u64,
    pub xp_gained: u64,
    pub levels_gained: u32,
    pub final_level: u32,
    /// Copper picked up from corpses.
    pub currency_looted: u64,
    /// Copper from quest rewards.
    pub currency_from_quests: u64,
    /// Copper from selling to merchants.
    pub currency_from_sales: u64,
    pub final_currency: u64,
    pub items_looted: u64,
    pub items_overflowed: u64,
    pub items_sold: u64,
    pub skill_ups: u64,
    pub quests_completed: u64,
    pub final_skills: BTreeMap<SkillKind, u32>,
}

impl RunStats {
    pub fn rounds_per_kill(&self) -> f64 {
        if self.kills == 0 {
            0.0
        } else {
            self.kill_rounds as f64 / self.kills as f64
        }
    }
}

enum EncounterEnd {
    Kill,
    Death,
    Stalemate,
}

fn simulate_single_run(config: &SimConfig, store: &ConfigStore, rng: &mut impl Rng) -> RunStats {
    let mut player = PlayerState::new("Simulant", &config.race_id, &config.class_id, store);
    let mut stats = RunStats::default();
    let mut clock = DateTime::<Utc>::UNIX_EPOCH;
    let mut quests = QuestLog::new(clock);

    let merchant = config.merchant_id.as_deref().and_then(|id| {
        let merchant = store.merchant(id);
        if merchant.is_none() {
            warn!(merchant = id, "simulation merchant not found, loot will not be sold");
        }
        merchant
    });

    for _ in 0..config.encounters {
        if config.simulate_quests {
            pick_up_quests(&mut quests, &player, store, rng);
        }

        let Some(mut monster) = select_monster(&config.camp_id, store, rng) else {
            warn!(camp = %config.camp_id, "nothing to fight, ending run early");
            break;
        };
        stats.encounters += 1;

        let mut rounds = 0u32;
        let end = loop {
            if rounds >= config.max_rounds_per_encounter {
                break EncounterEnd::Stalemate;
            }
            rounds += 1;

            let outcome = resolve_round(&player, &monster, store, rng);
            monster.set_hp(outcome.monster_hp);
            let applied = player.apply_round(&outcome, store);

            stats.skill_ups += outcome.skill_ups.len() as u64;
            stats.xp_gained = stats.xp_gained.saturating_add(outcome.updates.xp_gained);
            stats.levels_gained += applied.levels_gained;
            stats.currency_looted = stats
                .currency_looted
                .saturating_add(outcome.updates.currency_gained);
            stats.items_looted += applied.inventory.added_quantity() as u64;
            stats.items_overflowed += applied.inventory.overflow_quantity() as u64;

            if config.simulate_quests {
                for stack in &applied.inventory.added {
                    quests.record_collect(&stack.item_id, stack.quantity);
                }
            }
            if outcome.monster_died {
                if config.simulate_quests {
                    quests.record_kill(monster.id());
                }
                break EncounterEnd::Kill;
            }
            if outcome.player_died {
                break EncounterEnd::Death;
            }
        };

        stats.rounds += rounds as u64;
        clock += Duration::seconds(rounds as i64 * config.seconds_per_round);
        match end {
            EncounterEnd::Kill => {
                stats.kills += 1;
                stats.kill_rounds += rounds as u64;
            }
            EncounterEnd::Death => {
                stats.deaths += 1;
                player.hp = player.max_hp;
                player.stamina = player.max_stamina;
            }
            EncounterEnd::Stalemate => stats.stalemates += 1,
        }

        if config.simulate_quests {
            turn_in_ready(&mut quests, &mut player, &mut stats, clock, store, rng);
        }
        if let Some(merchant) = merchant {
            if player.inventory.is_full() {
                sell_everything(&mut player, merchant, &mut stats, store);
            }
        }
        rest(&mut player, store);
    }

    stats.final_level = player.level;
    stats.final_currency = player.currency;
    stats.final_skills = player.skills.iter().map(|(k, r)| (*k, r.current)).collect();
    stats
}

/// Fills the active quest slots with freshly generated quests.
fn pick_up_quests(quests: &mut QuestLog, player: &PlayerState, store: &ConfigStore, rng: &mut impl Rng) {
    let max_active = store.settings.max_active_quests;
    while quests.active_count() < max_active {
        let id = match quests.generate(player.level, store, rng) {
            Ok(quest) => quest.id,
            Err(_) => break,
        };
        if quests.accept(id, max_active).is_err() {
            break;
        }
    }
}

fn turn_in_ready(
    quests: &mut QuestLog,
    player: &mut PlayerState,
    stats: &mut RunStats,
    now: DateTime<Utc>,
    store: &ConfigStore,
    rng: &mut impl Rng,
) {
    let ready: Vec<_> = quests.with_status(QuestStatus::Ready).map(|q| q.id).collect();
    for id in ready {
        match quests.turn_in(id, now, store, rng) {
            Ok(reward) => {
                let applied = reward.apply_to(player, store);
                stats.quests_completed += 1;
                stats.xp_gained = stats.xp_gained.saturating_add(reward.xp);
                stats.levels_gained += applied.levels_gained;
                stats.currency_from_quests = stats
                    .currency_from_quests
                    .saturating_add(reward.currency)
                    .saturating_add(reward.loot.currency);
                stats.items_looted += applied.inventory.added_quantity() as u64;
                stats.items_overflowed += applied.inventory.overflow_quantity() as u64;
            }
            Err(QuestError::DailyLimitReached(_)) => break,
            Err(err) => debug!(quest = %id, %err, "turn-in skipped"),
        }
    }
}

fn sell_everything(player: &mut PlayerState, merchant: &Merchant, stats: &mut RunStats, store: &ConfigStore) {
    while let Ok(trade) = sell(player, merchant, 0, u32::MAX, store) {
        stats.items_sold += trade.quantity as u64;
        stats.currency_from_sales = stats.currency_from_sales.saturating_add(trade.total);
    }
}

/// Regenerates until full or the tick budget runs out.
fn rest(player: &mut PlayerState, store: &ConfigStore) {
    for _ in 0..MAX_REST_TICKS {
        if player.hp >= player.max_hp && player.stamina >= player.max_stamina {
            break;
        }
        regen_tick(player, &store.settings);
    }
}
