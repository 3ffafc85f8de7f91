//! Coin denominations and currency formatting.
//!
//! All currency is stored as a single copper count.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coin {
    Copper,
    Silver,
    Gold,
    Platinum,
}

impl Coin {
    /// Highest denomination first, the order used for formatting.
    pub const DESCENDING: [Coin; 4] = [Coin::Platinum, Coin::Gold, Coin::Silver, Coin::Copper];

    /// Value of one coin in copper.
    pub fn denomination(&self) -> u64 {
        match self {
            Coin::Copper => 1,
            Coin::Silver => 10,
            Coin::Gold => 100,
            Coin::Platinum => 1000,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Coin::Copper => "c",
            Coin::Silver => "s",
            Coin::Gold => "g",
            Coin::Platinum => "p",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Coin::Copper => "copper",
            Coin::Silver => "silver",
            Coin::Gold => "gold",
            Coin::Platinum => "platinum",
        }
    }
}

impl FromStr for Coin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cp" | "copper" => Ok(Coin::Copper),
            "sp" | "silver" => Ok(Coin::Silver),
            "gp" | "gold" => Ok(Coin::Gold),
            "pp" | "platinum" => Ok(Coin::Platinum),
            _ => Err(()),
        }
    }
}

/// Splits a copper amount into (platinum, gold, silver, copper).
pub fn split_currency(copper: u64) -> (u64, u64, u64, u64) {
    let platinum = copper / 1000;
    let rest = copper % 1000;
    let gold = rest / 100;
    let rest = rest % 100;
    (platinum, gold, rest / 10, rest % 10)
}

/// Formats a copper amount like `"2p 5s 3c"`.
///
/// Zero components are left out. Copper is shown when it is non-zero or when
/// every other component is zero, so `0` renders as `"0c"`.
pub fn format_currency(copper: u64) -> String {
    let (p, g, s, c) = split_currency(copper);
    let mut parts = Vec::with_capacity(4);
    for (amount, coin) in [p, g, s].into_iter().zip(Coin::DESCENDING) {
        if amount > 0 {
            parts.push(format!("{}{}", amount, coin.suffix()));
        }
    }
    if c > 0 || parts.is_empty() {
        parts.push(format!("{}{}", c, Coin::Copper.suffix()));
    }
    parts.join(" ")
}
