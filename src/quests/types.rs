use crate::config::types::{QuestKind, TargetType};
use crate::core::log::LogEntry;
use crate::loot::generation::Loot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Where a quest instance sits in its lifecycle. Turned-in, abandoned and
/// declined quests are removed from the log rather than kept in a terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Available,
    Active,
    Ready,
}

/// Something the player (or the world) does to a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestEvent {
    Accept,
    Decline,
    Complete,
    TurnIn,
    Abandon,
}

/// Result of applying an event to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(QuestStatus),
    Removed,
    Invalid,
}

impl QuestStatus {
    pub fn transition(self, event: QuestEvent) -> Transition {
        use QuestEvent::*;
        use QuestStatus::*;
        match (self, event) {
            (Available, Accept) => Transition::To(Active),
            (Available, Decline) => Transition::Removed,
            (Active, Complete) => Transition::To(Ready),
            (Active, Abandon) => Transition::Removed,
            (Ready, TurnIn) => Transition::Removed,
            (Available, Complete | TurnIn | Abandon)
            | (Active, Accept | Decline | TurnIn)
            | (Ready, Accept | Decline | Complete | Abandon) => Transition::Invalid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestStatus::Available => "available",
            QuestStatus::Active => "active",
            QuestStatus::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRewards {
    pub xp: u64,
    /// Copper.
    pub currency: u64,
    pub loot_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestInstance {
    pub id: Uuid,
    pub template_id: String,
    pub kind: QuestKind,
    pub target_type: TargetType,
    /// Monster or item id that advances this quest.
    pub target: String,
    pub target_name: String,
    pub required: u32,
    pub progress: u32,
    pub status: QuestStatus,
    pub rewards: QuestRewards,
    pub title: String,
    pub description: String,
}

impl QuestInstance {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }
}

/// The player's quests plus the daily turn-in counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLog {
    pub quests: Vec<QuestInstance>,
    pub completed_today: u32,
    /// When `completed_today` next resets.
    pub next_reset: DateTime<Utc>,
}

/// What a successful turn-in grants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestReward {
    pub xp: u64,
    pub currency: u64,
    pub loot: Loot,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("no quest with id {0}")]
    NotFound(Uuid),

    #[error("quest is {0}, not available")]
    NotAvailable(&'static str),

    #[error("quest is {0}, not active")]
    NotActive(&'static str),

    #[error("quest is {0}, not ready to turn in")]
    NotReady(&'static str),

    #[error("daily quest limit of {0} reached")]
    DailyLimitReached(u32),

    #[error("already on {0} quests")]
    TooManyActive(usize),

    #[error("no quest template fits level {0}")]
    NoEligibleTemplate(u32),
}
