//! Player character state, leveling, and the round reducer.

pub mod leveling;
pub mod player;

pub use leveling::*;
pub use player::*;
