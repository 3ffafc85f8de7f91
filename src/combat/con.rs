//! Level-difference rules: XP triviality and con colors.
//!
//! Both use `diff = player_level - monster_level` and the same two
//! thresholds from settings.

use super::types::Con;
use crate::core::log::LogColor;
use crate::core::settings::Settings;

fn level_diff(player_level: u32, monster_level: u32) -> i32 {
    let diff = player_level as i64 - monster_level as i64;
    diff.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// XP granted for a kill. Green cons are trivial and give nothing; light blue
/// cons give the reduced share.
pub fn xp_for_kill(base_xp: u64, player_level: u32, monster_level: u32, settings: &Settings) -> u64 {
    let diff = level_diff(player_level, monster_level);
    if diff >= settings.xp_green_threshold {
        0
    } else if diff >= settings.xp_reduced_threshold {
        (base_xp as f64 * settings.xp_reduced_multiplier).floor() as u64
    } else {
        base_xp
    }
}

pub fn con(player_level: u32, monster_level: u32, settings: &Settings) -> Con {
    let diff = level_diff(player_level, monster_level);
    if diff >= settings.xp_green_threshold {
        Con::Green
    } else if diff >= settings.xp_reduced_threshold {
        Con::LightBlue
    } else if diff >= 0 {
        Con::White
    } else if diff > settings.xp_reduced_threshold.saturating_neg() {
        Con::Yellow
    } else {
        Con::Red
    }
}

impl Con {
    pub fn color(&self) -> LogColor {
        match self {
            Con::Green => LogColor::Green,
            Con::LightBlue => LogColor::LightBlue,
            Con::White => LogColor::White,
            Con::Yellow => LogColor::Yellow,
            Con::Red => LogColor::Red,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Con::Green => "looks like an easy target",
            Con::LightBlue => "looks like it would be a fair fight, leaning your way",
            Con::White => "looks like an even fight",
            Con::Yellow => "looks like quite a gamble",
            Con::Red => "looks like it would wipe the floor with you",
        }
    }
}

/// Display color for a monster relative to the player.
pub fn con_color(player_level: u32, monster_level: u32, settings: &Settings) -> LogColor {
    con(player_level, monster_level, settings).color()
}
