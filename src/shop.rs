/// Upgrade shop offered between levels.  Purchases spend the current
/// player's coins and update both the run's upgrades and the live player.

use tracing::debug;

use crate::config::ShopPrices;
use crate::entities::{Player, PlayerUpgrades};
use crate::error::PurchaseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShopItem {
    Multishot,
    Homing,
    Health,
}

impl ShopItem {
    pub const ALL: [ShopItem; 3] = [ShopItem::Multishot, ShopItem::Homing, ShopItem::Health];

    pub fn label(self) -> &'static str {
        match self {
            ShopItem::Multishot => "Multishot",
            ShopItem::Homing => "Homing bullets",
            ShopItem::Health => "Max health +½ heart",
        }
    }
}

/// One row of the shop listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopOffer {
    pub item: ShopItem,
    pub cost: u32,
    pub owned: bool,
    pub affordable: bool,
}

/// Price of the next purchase of `item`.
pub fn cost(item: ShopItem, upgrades: &PlayerUpgrades, prices: &ShopPrices) -> u32 {
    match item {
        ShopItem::Multishot => prices.multishot_base + prices.multishot_step * upgrades.multishot_level,
        ShopItem::Homing => prices.homing,
        ShopItem::Health => prices.health,
    }
}

pub fn offers(upgrades: &PlayerUpgrades, coins: u32, prices: &ShopPrices) -> Vec<ShopOffer> {
    ShopItem::ALL
        .iter()
        .map(|&item| {
            let cost = cost(item, upgrades, prices);
            let owned = item == ShopItem::Homing && upgrades.has_homing;
            ShopOffer {
                item,
                cost,
                owned,
                affordable: !owned && coins >= cost,
            }
        })
        .collect()
}

/// Buy `item`.  On success returns the coins spent; on failure nothing
/// changes.
pub fn purchase(
    item: ShopItem,
    upgrades: &mut PlayerUpgrades,
    player: &mut Player,
    prices: &ShopPrices,
) -> Result<u32, PurchaseError> {
    let price = cost(item, upgrades, prices);
    if item == ShopItem::Homing && upgrades.has_homing {
        return Err(PurchaseError::AlreadyOwned);
    }
    if player.coins < price {
        return Err(PurchaseError::InsufficientCoins {
            cost: price,
            coins: player.coins,
        });
    }

    match item {
        ShopItem::Multishot => {
            upgrades.multishot_level += 1;
            player.multishot_level += 1;
        }
        ShopItem::Homing => {
            upgrades.has_homing = true;
            player.has_homing = true;
        }
        ShopItem::Health => {
            upgrades.health_level += 1;
            player.add_health();
        }
    }
    player.coins -= price;
    debug!(?item, price, coins = player.coins, "purchase");
    Ok(price)
}
