//! Quest lifecycle: generation, progress, turn-in, and the daily limit.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
