//! Bag inventory: a bounded, ordered list of item stacks.

use super::generation::LootItem;
use crate::config::types::ItemDef;
use crate::core::constants::INVENTORY_SLOTS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
}

/// Outcome of inserting loot: what made it into the bags and what was left on
/// the ground because the bags were full.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResult {
    pub added: Vec<ItemStack>,
    pub overflow: Vec<ItemStack>,
}

impl InsertResult {
    pub fn added_quantity(&self) -> u32 {
        total_quantity(&self.added)
    }

    pub fn overflow_quantity(&self) -> u32 {
        total_quantity(&self.overflow)
    }
}

fn total_quantity<'a>(stacks: impl IntoIterator<Item = &'a ItemStack>) -> u32 {
    stacks
        .into_iter()
        .fold(0u32, |sum, s| sum.saturating_add(s.quantity))
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= INVENTORY_SLOTS
    }

    /// Total quantity of an item across all slots.
    pub fn count(&self, item_id: &str) -> u32 {
        total_quantity(self.slots.iter().filter(|s| s.item_id == item_id))
    }

    /// How many more of `item` would fit, topping up stacks first.
    pub fn space_for(&self, item: &ItemDef) -> u32 {
        let limit = item.stack_limit();
        let top_up: u32 = if item.stackable {
            self.slots
                .iter()
                .filter(|s| s.item_id == item.id)
                .fold(0u32, |room, s| room.saturating_add(limit.saturating_sub(s.quantity)))
        } else {
            0
        };
        let free_slots = INVENTORY_SLOTS.saturating_sub(self.slots.len()) as u32;
        top_up.saturating_add(free_slots.saturating_mul(limit))
    }

    /// Inserts `quantity` of `item`. Returns how many were placed; the rest
    /// did not fit.
    pub fn insert(&mut self, item: &ItemDef, quantity: u32) -> u32 {
        let limit = item.stack_limit();
        let mut remaining = quantity;

        if item.stackable {
            for slot in self.slots.iter_mut().filter(|s| s.item_id == item.id) {
                if remaining == 0 {
                    break;
                }
                let take = limit.saturating_sub(slot.quantity).min(remaining);
                slot.quantity += take;
                remaining -= take;
            }
        }

        while remaining > 0 && self.slots.len() < INVENTORY_SLOTS {
            let take = limit.min(remaining);
            self.slots.push(ItemStack {
                item_id: item.id.clone(),
                quantity: take,
            });
            remaining -= take;
        }

        quantity - remaining
    }

    /// Removes up to `quantity` from the slot at `index`, dropping the slot
    /// when it empties. Returns the removed stack.
    pub fn take_from_slot(&mut self, index: usize, quantity: u32) -> Option<ItemStack> {
        let slot = self.slots.get_mut(index)?;
        let taken = quantity.min(slot.quantity);
        if taken == 0 {
            return None;
        }
        slot.quantity -= taken;
        let stack = ItemStack {
            item_id: slot.item_id.clone(),
            quantity: taken,
        };
        if slot.quantity == 0 {
            self.slots.remove(index);
        }
        Some(stack)
    }

    /// Removes `quantity` of an item from wherever it sits, last slot first.
    /// Removes nothing and returns false if there isn't enough.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        if self.count(item_id) < quantity {
            return false;
        }
        let mut remaining = quantity;
        for index in (0..self.slots.len()).rev() {
            if remaining == 0 {
                break;
            }
            if self.slots[index].item_id == item_id {
                let taken = self.slots[index].quantity.min(remaining);
                remaining -= taken;
                self.slots[index].quantity -= taken;
                if self.slots[index].quantity == 0 {
                    self.slots.remove(index);
                }
            }
        }
        true
    }
}

/// Adds each loot stack to the inventory: existing stacks are topped up to
/// their max, then new slots are opened while fewer than ten are in use.
/// Whatever is left is reported as overflow.
pub fn add_loot_to_inventory(inventory: &mut Inventory, loot: &[LootItem]) -> InsertResult {
    let mut result = InsertResult::default();
    for entry in loot {
        let placed = inventory.insert(&entry.item, entry.quantity);
        if placed > 0 {
            result.added.push(ItemStack {
                item_id: entry.item.id.clone(),
                quantity: placed,
            });
        }
        if placed < entry.quantity {
            result.overflow.push(ItemStack {
                item_id: entry.item.id.clone(),
                quantity: entry.quantity - placed,
            });
        }
    }
    result
}
