//! Domain types shared across the engine.
//!
//! Orders are inputs from the feed; executions are outputs to the
//! registered callback.

use std::fmt;
use std::str::FromStr;

/// Order identifier. Assigned by the engine, strictly increasing from 1,
/// never reused within a book lifetime.
pub type OrderId = u64;

/// Integer tick price. The book is a dense grid over the full `u16` range.
pub type Price = u16;

/// Order quantity. A resting order whose size has been zeroed is a
/// cancelled tombstone and never trades.
pub type Size = u64;

/// Lowest live price on the grid. Tick 0 is reserved: replay feeds use
/// `price == 0` to mark a cancel row.
pub const MIN_PRICE: Price = 1;

/// Highest live price on the grid.
pub const MAX_PRICE: Price = u16::MAX;

/// Order side (bid = buy, ask = sell)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Bid = 0,
    /// Sell side (asks)
    Ask = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = u8;

    /// Wire encoding: 0 = bid, 1 = ask.
    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Side::Bid),
            1 => Ok(Side::Ask),
            other => Err(other),
        }
    }
}

impl From<Side> for u8 {
    #[inline]
    fn from(side: Side) -> u8 {
        side as u8
    }
}

/// A symbol or trader tag: up to 4 significant bytes, zero-padded,
/// compared by value.
///
/// Four bytes keeps the resting-order record at 16 bytes; see
/// [`crate::arena::OrderEntry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Build a tag from raw bytes. Unused trailing bytes must be zero.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// The significant prefix of the tag as a string slice.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(4);
        std::str::from_utf8(&self.0[..len]).unwrap_or("")
    }

    /// True for the all-zero tag.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

/// Tag longer than the 4-byte canonical width.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tag `{0}` exceeds 4 bytes")]
pub struct TagError(pub String);

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, TagError> {
        if s.len() > 4 {
            return Err(TagError(s.to_owned()));
        }
        let mut bytes = [0u8; 4];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Self(bytes))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.as_str())
    }
}

/// An incoming limit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub symbol: Tag,
    pub trader: Tag,
    pub side: Side,
    pub price: Price,
    pub size: Size,
}

/// One leg of a fill, reported through the execution callback.
///
/// Every fill produces two of these, bid leg first; `side` names the
/// counterparty leg the report describes. Both legs carry the aggressor's
/// limit price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Execution {
    pub symbol: Tag,
    pub trader: Tag,
    pub side: Side,
    pub price: Price,
    pub size: Size,
}

/// Submission rejected at the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Price 0 is the replay cancel sentinel and never a live price.
    #[error("price 0 is reserved and cannot be submitted")]
    InvalidPrice,
    /// A zero-size submission could never trade and would rest a dead record.
    #[error("order size must be positive")]
    InvalidSize,
    /// The order pool has issued every identifier it was built with.
    #[error("order pool exhausted")]
    PoolExhausted,
}
