//! Buying from and selling to merchants.
//!
//! A trade either completes fully or leaves the player untouched.

use super::currency::format_currency;
use super::pricing::{buy_price, sell_price};
use crate::character::player::PlayerState;
use crate::config::types::Merchant;
use crate::config::ConfigStore;
use crate::core::log::{LogEntry, LogKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("unknown item `{0}`")]
    UnknownItem(String),

    #[error("merchant does not stock `{0}`")]
    NotStocked(String),

    #[error("not enough money: need {needed}c, have {available}c")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("inventory cannot hold {requested} more (room for {room})")]
    InventoryFull { requested: u32, room: u32 },

    #[error("inventory slot {0} is empty")]
    EmptySlot(usize),

    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Bought,
    Sold,
}

/// Receipt for a completed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub direction: TradeDirection,
    pub item_id: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total: u64,
}

impl Trade {
    pub fn log_entry(&self, item_name: &str, merchant: &Merchant) -> LogEntry {
        let message = match self.direction {
            TradeDirection::Bought => format!(
                "You buy {} x{} from {} for {}.",
                item_name,
                self.quantity,
                merchant.name,
                format_currency(self.total)
            ),
            TradeDirection::Sold => format!(
                "You sell {} x{} to {} for {}.",
                item_name,
                self.quantity,
                merchant.name,
                format_currency(self.total)
            ),
        };
        LogEntry::new(LogKind::Trade, message)
    }
}

/// Buys `quantity` of a stocked item at the merchant's sell rate.
pub fn buy(
    player: &mut PlayerState,
    merchant: &Merchant,
    item_id: &str,
    quantity: u32,
    store: &ConfigStore,
) -> Result<Trade, TradeError> {
    if quantity == 0 {
        return Err(TradeError::InvalidQuantity);
    }
    if !merchant.items.iter().any(|id| id == item_id) {
        return Err(TradeError::NotStocked(item_id.to_string()));
    }
    let Some(item) = store.item(item_id) else {
        warn!(merchant = %merchant.id, item = item_id, "merchant stocks unknown item");
        return Err(TradeError::UnknownItem(item_id.to_string()));
    };

    let unit_price = buy_price(item, merchant);
    let total = unit_price.saturating_mul(quantity as u64);
    if player.currency < total {
        return Err(TradeError::InsufficientFunds {
            needed: total,
            available: player.currency,
        });
    }
    let room = player.inventory.space_for(item);
    if room < quantity {
        return Err(TradeError::InventoryFull {
            requested: quantity,
            room,
        });
    }

    player.currency -= total;
    player.inventory.insert(item, quantity);
    Ok(Trade {
        direction: TradeDirection::Bought,
        item_id: item_id.to_string(),
        quantity,
        unit_price,
        total,
    })
}

/// Sells up to `quantity` from one inventory slot at the merchant's buy rate.
/// Merchants buy anything; items the store no longer knows sell for nothing.
pub fn sell(
    player: &mut PlayerState,
    merchant: &Merchant,
    slot: usize,
    quantity: u32,
    store: &ConfigStore,
) -> Result<Trade, TradeError> {
    if quantity == 0 {
        return Err(TradeError::InvalidQuantity);
    }
    let Some(stack) = player.inventory.take_from_slot(slot, quantity) else {
        return Err(TradeError::EmptySlot(slot));
    };

    let unit_price = match store.item(&stack.item_id) {
        Some(item) => sell_price(item, merchant),
        None => {
            warn!(item = %stack.item_id, "selling item missing from config");
            0
        }
    };
    let total = unit_price.saturating_mul(stack.quantity as u64);
    player.currency = player.currency.saturating_add(total);
    Ok(Trade {
        direction: TradeDirection::Sold,
        item_id: stack.item_id,
        quantity: stack.quantity,
        unit_price,
        total,
    })
}
