//! Guarded offer insertion commands and the canonical offer JSON they embed.

use log::debug;
use serde::Serialize;
use trade_data::{CatalogueDef, TradeDef};

use crate::{CommandTarget, CompileError};

/// One side of an offer as stored in a villager recipe.
#[derive(Debug, Serialize)]
struct ItemStack<'a> {
    id: &'a str,
    count: u32,
}

/// The buy/sell pair only. Used as the "already offered" key, so tuning the
/// price or use cap of a trade never makes an existing offer look new.
#[derive(Debug, Serialize)]
pub struct OfferKey<'a> {
    buy: ItemStack<'a>,
    sell: ItemStack<'a>,
}

/// The full recipe inserted into the offer list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferValue<'a> {
    buy: ItemStack<'a>,
    sell: ItemStack<'a>,
    price_multiplier: f64,
    max_uses: u32,
}

impl<'a> OfferKey<'a> {
    pub fn new(trade: &'a TradeDef) -> Self {
        Self {
            buy: ItemStack {
                id: &trade.buy_item,
                count: trade.buy_quantity,
            },
            sell: ItemStack {
                id: &trade.sell_item,
                count: trade.sell_quantity,
            },
        }
    }
}

impl<'a> OfferValue<'a> {
    pub fn new(trade: &'a TradeDef) -> Self {
        let OfferKey { buy, sell } = OfferKey::new(trade);
        Self {
            buy,
            sell,
            price_multiplier: trade.price_multiplier,
            max_uses: trade.max_uses,
        }
    }
}

/// Compact JSON of `{buy:{id,count},sell:{id,count}}`.
pub fn offer_key_json(trade: &TradeDef) -> Result<String, CompileError> {
    Ok(serde_json::to_string(&OfferKey::new(trade))?)
}

/// Compact JSON of `{buy:{id,count},sell:{id,count},priceMultiplier,maxUses}`.
pub fn offer_value_json(trade: &TradeDef) -> Result<String, CompileError> {
    Ok(serde_json::to_string(&OfferValue::new(trade))?)
}

/// Emit one guarded insertion per trade, numbered 1.. in traversal order.
///
/// The index is recounted here rather than read from the allocator; both walk
/// the catalogue the same way, so they agree by construction.
pub fn trade_commands(catalogue: &CatalogueDef, target: &CommandTarget) -> Result<Vec<String>, CompileError> {
    let mut commands = Vec::with_capacity(catalogue.trade_count());
    let mut index = 1usize;

    for section in &catalogue.sections {
        for trade in &section.trades {
            commands.push(offer_command(target, index, trade)?);
            index += 1;
        }
        debug!("section '{}' ends at trade index {}", section.name, index - 1);
    }

    Ok(commands)
}

fn offer_command(target: &CommandTarget, index: usize, trade: &TradeDef) -> Result<String, CompileError> {
    let CommandTarget {
        selector,
        objective,
        offers_path,
        ..
    } = target;
    Ok(format!(
        "execute if score {selector} {objective} matches {index} \
         unless data entity {selector} {offers_path}.[{key}] \
         run data modify entity {selector} {offers_path} insert -1 value {value}",
        key = offer_key_json(trade)?,
        value = offer_value_json(trade)?,
    ))
}
