//! Combat: spawning, con colors, and round resolution.

pub mod con;
pub mod logic;
pub mod spawn;
pub mod types;

pub use con::{con, con_color, xp_for_kill};
pub use logic::*;
pub use spawn::{select_monster, spawn_message};
pub use types::*;
