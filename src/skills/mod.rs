//! Skill progression: caps, skill-ups, dodge, and ability procs.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
