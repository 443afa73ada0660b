//! # tickgrid
//!
//! A deterministic price-time priority matching engine for a
//! single-instrument limit order book on a dense integer tick grid.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one logical caller owns the engine (no locks)
//! - **Dense Grid**: one price level per `u16` tick, indexed directly
//! - **Lazy Cursors**: `ask_min`/`bid_max` bound the best prices and are
//!   advanced only by the matcher, never repaired on cancel
//! - **Arena Allocation**: records pre-allocated, slot index == order id,
//!   cancel is a single tombstone store
//!
//! ## Architecture
//!
//! ```text
//! [Feed / Caller] --> limit()/cancel() --> [Matcher: grid + arena]
//!                                                 |
//!                                        [Execution callback]
//! ```

pub mod arena;
pub mod engine;
pub mod grid;
pub mod matching;
pub mod order;
pub mod price_level;
pub mod replay;

// Re-exports for convenience
pub use arena::{EntryIndex, OrderArena, OrderEntry, MAX_ORDERS, NULL_INDEX};
pub use engine::Engine;
pub use grid::PriceGrid;
pub use matching::{BookSnapshot, LevelDepth, Matcher};
pub use order::{
    EngineError, Execution, Order, OrderId, Price, Side, Size, Tag, MAX_PRICE, MIN_PRICE,
};
pub use price_level::PriceLevel;
pub use replay::{FeedCommand, FeedError, FeedRow};
