//! XP curve, level-ups, and out-of-combat regeneration.

use super::player::PlayerState;
use crate::core::settings::Settings;
use crate::skills::logic::recompute_caps;

/// XP needed to go from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32, settings: &Settings) -> u64 {
    (settings.xp_curve_base * f64::powf(level.max(1) as f64, settings.xp_curve_exponent)).max(1.0)
        as u64
}

/// Adds XP and processes any level-ups. Returns the number of levels gained.
///
/// Each level raises max HP and stamina, refills both, and recomputes every
/// skill cap for the new level.
pub fn apply_xp(player: &mut PlayerState, amount: u64, settings: &Settings) -> u32 {
    player.xp = player.xp.saturating_add(amount);
    let mut levels = 0;

    loop {
        let needed = xp_for_next_level(player.level, settings);
        if player.xp < needed || player.level == u32::MAX {
            break;
        }
        player.xp -= needed;
        player.level += 1;
        player.max_hp = player.max_hp.saturating_add(settings.hp_per_level);
        player.max_stamina = player.max_stamina.saturating_add(settings.stamina_per_level);
        levels += 1;
    }

    if levels > 0 {
        player.hp = player.max_hp;
        player.stamina = player.max_stamina;
        recompute_caps(&mut player.skills, player.level, settings);
    }
    levels
}

/// One regeneration tick outside combat.
pub fn regen_tick(player: &mut PlayerState, settings: &Settings) {
    if !player.is_alive() {
        return;
    }
    player.hp = player.hp.saturating_add(settings.hp_regen_per_tick).min(player.max_hp);
    player.stamina = player
        .stamina
        .saturating_add(settings.stamina_regen_per_tick)
        .min(player.max_stamina);
}
