//! Replay feed - decoding recorded rows and generating synthetic ones.
//!
//! A feed is a sequence of rows sharing the order shape. The convention
//! for cancels comes from the feed, not the engine: a row with
//! `price == 0` is a cancel whose target identifier is the row's `size`
//! field. Prices arrive as decimals and are scaled onto the tick grid
//! with a per-feed multiplier (e.g. 100 for cent ticks).

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::order::{Order, OrderId, Price, Side, Tag, MIN_PRICE};

/// One recorded feed row (JSONL).
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRow {
    /// Exchange timestamp, if the recording kept one.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    pub trader: String,
    /// Wire encoding: 0 = bid, 1 = ask.
    pub side: u8,
    /// Decimal price; zero marks a cancel row.
    pub price: Decimal,
    /// Decimal quantity; carries the target order id on cancel rows.
    pub size: Decimal,
}

/// A decoded feed entry, ready to drive the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    Limit(Order),
    Cancel(OrderId),
}

/// A feed row that cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("malformed feed row: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("tag `{0}` exceeds 4 bytes")]
    Tag(String),
    #[error("side must be 0 (bid) or 1 (ask), got {0}")]
    Side(u8),
    #[error("price {0} does not land on the tick grid")]
    Price(Decimal),
    #[error("size {0} is not a whole number of units")]
    Size(Decimal),
}

impl FeedRow {
    /// Decode this row against a tick grid scaled by `price_mult`.
    pub fn to_command(&self, price_mult: u32) -> Result<FeedCommand, FeedError> {
        if self.price.is_zero() {
            let id = whole_u64(self.size).ok_or(FeedError::Size(self.size))?;
            return Ok(FeedCommand::Cancel(id));
        }

        let side = Side::try_from(self.side).map_err(FeedError::Side)?;
        let scaled = self.price * Decimal::from(price_mult);
        let ticks = whole_u64(scaled)
            .and_then(|t| Price::try_from(t).ok())
            .filter(|&t| t >= MIN_PRICE)
            .ok_or(FeedError::Price(self.price))?;
        let size = whole_u64(self.size).ok_or(FeedError::Size(self.size))?;

        let symbol: Tag = self.symbol.parse().map_err(|_| FeedError::Tag(self.symbol.clone()))?;
        let trader: Tag = self.trader.parse().map_err(|_| FeedError::Tag(self.trader.clone()))?;

        Ok(FeedCommand::Limit(Order {
            symbol,
            trader,
            side,
            price: ticks,
            size,
        }))
    }
}

fn whole_u64(value: Decimal) -> Option<u64> {
    if !value.fract().is_zero() {
        return None;
    }
    value.to_u64()
}

/// Decode a JSONL feed: one row per non-blank line.
pub fn parse_jsonl(text: &str, price_mult: u32) -> Result<Vec<FeedCommand>, FeedError> {
    let mut commands = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: FeedRow = serde_json::from_str(line)?;
        commands.push(row.to_command(price_mult)?);
    }
    Ok(commands)
}

const SYNTHETIC_SYMBOL: Tag = Tag::from_bytes(*b"SYN\0");
const SYNTHETIC_TRADERS: [Tag; 4] = [
    Tag::from_bytes(*b"ALFA"),
    Tag::from_bytes(*b"BRVO"),
    Tag::from_bytes(*b"CHLI"),
    Tag::from_bytes(*b"DLTA"),
];

/// Generate a deterministic synthetic feed: roughly one cancel per ten
/// rows, limit prices clustered around a mid so both sides keep crossing.
///
/// Cancel targets are valid under the engine's id assignment as long as
/// the feed is replayed from a fresh (or reset) engine.
pub fn synthetic_feed(count: usize) -> Vec<FeedCommand> {
    let mut commands = Vec::with_capacity(count);
    let mut state: u64 = 0x243F_6A88_85A3_08D3;
    let mut issued: u64 = 0;

    for _ in 0..count {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        if issued > 0 && state % 10 == 0 {
            commands.push(FeedCommand::Cancel(state % issued + 1));
            continue;
        }

        let side = if state & 1 == 0 { Side::Bid } else { Side::Ask };
        let price = 9_900 + ((state >> 16) % 200) as Price;
        let size = (state >> 32) % 100 + 1;
        let trader = SYNTHETIC_TRADERS[(state >> 48) as usize % SYNTHETIC_TRADERS.len()];

        commands.push(FeedCommand::Limit(Order {
            symbol: SYNTHETIC_SYMBOL,
            trader,
            side,
            price,
            size,
        }));
        issued += 1;
    }

    commands
}
