//! Idle RPG rules engine library.
//!
//! Combat resolution, skill progression, loot generation, the quest
//! lifecycle, and merchant trades, all driven by a read-only config bundle.
//! Every random draw comes from a generator the caller passes in, so a seeded
//! generator replays a session exactly.

pub mod character;
pub mod combat;
pub mod config;
pub mod core;
pub mod economy;
pub mod loot;
pub mod quests;
pub mod simulator;
pub mod skills;
