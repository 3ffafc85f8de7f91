//! Balance simulator for Monte Carlo analysis.
//!
//! Runs many seeded characters through repeated encounters at one camp to
//! check:
//! - Rounds per kill and death rate
//! - XP pacing and skill growth
//! - Coin income from loot, quests, and sales
//! - How often full bags waste loot

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::SimReport;
pub use runner::{run_simulation, RunStats};
