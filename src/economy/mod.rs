//! Currency, merchant pricing, and trades.

pub mod currency;
pub mod pricing;
pub mod trade;

pub use currency::*;
pub use pricing::*;
pub use trade::*;
