//! Player-facing log entries.
//!
//! Engine calls return these as an append-only list; the UI decides how to
//! render them. Diagnostics for content authors go through `tracing` instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    PlayerHit,
    PlayerMiss,
    Ability,
    MonsterHit,
    MonsterMiss,
    Dodge,
    SkillUp,
    Kill,
    Death,
    Experience,
    Loot,
    Currency,
    Spawn,
    Quest,
    Trade,
    LevelUp,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogColor {
    White,
    Grey,
    Red,
    Green,
    Yellow,
    Blue,
    LightBlue,
    Purple,
    Orange,
}

impl LogColor {
    /// CSS color used by the browser client.
    pub fn css(&self) -> &'static str {
        match self {
            LogColor::White => "#ffffff",
            LogColor::Grey => "#9e9e9e",
            LogColor::Red => "#ff5252",
            LogColor::Green => "#69f0ae",
            LogColor::Yellow => "#ffd740",
            LogColor::Blue => "#448aff",
            LogColor::LightBlue => "#80d8ff",
            LogColor::Purple => "#e040fb",
            LogColor::Orange => "#ffab40",
        }
    }
}

impl LogKind {
    pub fn default_color(&self) -> LogColor {
        match self {
            LogKind::PlayerHit => LogColor::White,
            LogKind::PlayerMiss | LogKind::MonsterMiss => LogColor::Grey,
            LogKind::Ability => LogColor::Orange,
            LogKind::MonsterHit | LogKind::Death => LogColor::Red,
            LogKind::Dodge => LogColor::LightBlue,
            LogKind::SkillUp | LogKind::LevelUp => LogColor::Blue,
            LogKind::Kill | LogKind::Experience => LogColor::Green,
            LogKind::Loot | LogKind::Currency | LogKind::Trade => LogColor::Yellow,
            LogKind::Spawn | LogKind::System => LogColor::White,
            LogKind::Quest => LogColor::Purple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub color: LogColor,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            color: kind.default_color(),
            message: message.into(),
        }
    }

    pub fn with_color(kind: LogKind, color: LogColor, message: impl Into<String>) -> Self {
        Self {
            kind,
            color,
            message: message.into(),
        }
    }
}
