//! Merchant price quotes.

use crate::config::types::{ItemDef, Merchant};

/// What a merchant pays the player for one `item`.
pub fn sell_price(item: &ItemDef, merchant: &Merchant) -> u64 {
    quote(item.value, merchant.buy_rate)
}

/// What a merchant charges the player for one `item`.
pub fn buy_price(item: &ItemDef, merchant: &Merchant) -> u64 {
    quote(item.value, merchant.sell_rate)
}

/// `floor(value * rate / 100)`, saturating for absurd content values.
fn quote(value: u64, rate: u32) -> u64 {
    value.saturating_mul(rate as u64) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: u64) -> ItemDef {
        ItemDef {
            id: "pelt".into(),
            name: "Wolf Pelt".into(),
            value,
            stackable: true,
            max_stack: 20,
            weapon: None,
            is_shield: false,
            armor_class: 0,
        }
    }

    fn merchant(buy_rate: u32, sell_rate: u32) -> Merchant {
        Merchant {
            id: "trader".into(),
            name: "Trader Jolen".into(),
            buy_rate,
            sell_rate,
            items: vec![],
        }
    }

    #[test]
    fn test_prices_floor() {
        let m = merchant(25, 100);
        assert_eq!(sell_price(&item(100), &m), 25);
        assert_eq!(sell_price(&item(7), &m), 1);
        assert_eq!(sell_price(&item(3), &m), 0);
        assert_eq!(buy_price(&item(7), &m), 7);
    }

    #[test]
    fn test_huge_value_saturates() {
        let m = merchant(25, 100);
        assert_eq!(sell_price(&item(u64::MAX), &m), u64::MAX / 100);
        assert_eq!(buy_price(&item(u64::MAX), &merchant(25, u32::MAX)), u64::MAX / 100);
    }

    #[test]
    fn test_markup_rate() {
        let m = merchant(10, 150);
        assert_eq!(buy_price(&item(33), &m), 49);
        assert_eq!(sell_price(&item(33), &m), 3);
    }
}
