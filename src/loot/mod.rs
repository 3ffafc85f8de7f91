//! Loot generation and inventory insertion.

pub mod generation;
pub mod inventory;

pub use generation::*;
pub use inventory::*;
