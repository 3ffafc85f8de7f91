//! Shared constants, tuning settings, and the player-facing log.

pub mod constants;
pub mod log;
pub mod settings;

pub use log::{LogColor, LogEntry, LogKind};
pub use settings::Settings;
