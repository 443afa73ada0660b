//! Matching routine - price-time priority crossing over the dense grid.
//!
//! An incoming order walks crossing price levels starting at the
//! best-opposite cursor, consumes resting liquidity FIFO within each
//! level, and rests any residual at its own limit price. Cancelled
//! records are consumed as zero-sized fills and suppressed by the
//! emitter, which is what lets cancel be a single store with no
//! unlinking.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::arena::{OrderArena, NULL_INDEX};
use crate::grid::PriceGrid;
use crate::order::{Execution, Order, OrderId, Price, Side, Size, Tag, MAX_PRICE, MIN_PRICE};

/// What happened while consuming one price level.
enum LevelOutcome {
    /// Every queued record was consumed; the cursor must advance.
    Exhausted,
    /// The aggressor was fully filled; carries its assigned identifier.
    Filled(OrderId),
}

/// Live depth at one price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelDepth {
    pub price: Price,
    pub size: Size,
    pub orders: u32,
}

/// Top-of-book view, best levels first, tombstones excluded.
#[derive(Clone, Debug, Default)]
pub struct BookSnapshot {
    pub bids: Vec<LevelDepth>,
    pub asks: Vec<LevelDepth>,
}

/// The matching core: grid, arena, and the crossing algorithm.
pub struct Matcher {
    /// Dense per-price book.
    pub grid: PriceGrid,
    /// Resting-order records keyed by identifier.
    pub arena: OrderArena,
}

impl Matcher {
    pub fn new(capacity: u32) -> Self {
        Self {
            grid: PriceGrid::new(),
            arena: OrderArena::new(capacity),
        }
    }

    /// Match `order` against the opposite side, rest any residual, and
    /// return the identifier assigned to the submission.
    ///
    /// The identifier advances on every call, whether or not a residual
    /// rests. `emit` receives one bid-leg/ask-leg report pair per fill,
    /// synchronously, in fill order.
    ///
    /// Callers must validate `order.price >= MIN_PRICE`, `order.size > 0`,
    /// and pool headroom first; see [`crate::engine::Engine::limit`].
    pub fn limit(&mut self, order: &Order, emit: &mut dyn FnMut(Execution)) -> OrderId {
        let limit = u32::from(order.price);
        let mut remaining = order.size;

        match order.side {
            Side::Bid => {
                // Scan ask levels upward from the cursor while they cross.
                // The cursor may sit on a drained or all-tombstone level;
                // consume_level walks through those and we advance past.
                while self.grid.ask_min <= limit {
                    match self.consume_level(self.grid.ask_min, order, &mut remaining, emit) {
                        LevelOutcome::Filled(id) => return id,
                        LevelOutcome::Exhausted => self.grid.ask_min += 1,
                    }
                }

                let id = self.rest(order, remaining);
                self.grid.note_resting_bid(order.price);
                id
            }
            Side::Ask => {
                // Mirror image: scan bid levels downward from the cursor.
                while self.grid.bid_max >= limit {
                    match self.consume_level(self.grid.bid_max, order, &mut remaining, emit) {
                        LevelOutcome::Filled(id) => return id,
                        LevelOutcome::Exhausted => self.grid.bid_max -= 1,
                    }
                }

                let id = self.rest(order, remaining);
                self.grid.note_resting_ask(order.price);
                id
            }
        }
    }

    /// Walk one level's queue from the head, consuming records FIFO.
    ///
    /// Tombstones satisfy `size < remaining` (remaining is always
    /// positive here), so they fall through the partial-consume branch as
    /// zero-sized fills that the emitter drops; the head pointer skips
    /// past them for free.
    fn consume_level(
        &mut self,
        tick: u32,
        order: &Order,
        remaining: &mut Size,
        emit: &mut dyn FnMut(Execution),
    ) -> LevelOutcome {
        let lvl = tick as usize;
        let mut idx = self.grid.levels[lvl].head;

        while idx != NULL_INDEX {
            let entry = *self.arena.get(idx);

            if entry.size < *remaining {
                report(emit, order, entry.trader, entry.size);
                *remaining -= entry.size;
                idx = entry.next;
            } else {
                report(emit, order, entry.trader, *remaining);

                if entry.size > *remaining {
                    // Resting order outlives the aggressor; keep it at head.
                    self.arena.get_mut(idx).size = entry.size - *remaining;
                } else {
                    // Exact fill; the successor becomes the new head.
                    idx = entry.next;
                }

                self.grid.levels[lvl].head = idx;
                return LevelOutcome::Filled(self.arena.assign_id());
            }
        }

        self.grid.levels[lvl].clear_head();
        LevelOutcome::Exhausted
    }

    /// Rest the residual at the aggressor's limit price.
    fn rest(&mut self, order: &Order, size: Size) -> OrderId {
        let (id, index) = self.arena.alloc(size, order.trader);
        self.grid.levels[order.price as usize].push_back(&mut self.arena, index);
        id
    }

    /// Tombstone the resting order for `id`. Silent on unknown ids.
    #[inline]
    pub fn cancel(&mut self, id: OrderId) {
        self.arena.cancel(id);
    }

    /// Return to the empty-book state.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.arena.reset();
    }

    // ========================================================================
    // Read-only introspection (harness surface, off the hot path)
    // ========================================================================

    /// Lowest price holding a non-cancelled ask, resolved by scanning past
    /// any tombstoned levels under the lagging cursor. Never moves the
    /// cursor.
    pub fn best_ask(&self) -> Option<Price> {
        let mut tick = self.grid.ask_min;
        while tick <= u32::from(MAX_PRICE) {
            if self.level_has_live(tick) {
                return Some(tick as Price);
            }
            tick += 1;
        }
        None
    }

    /// Highest price holding a non-cancelled bid.
    pub fn best_bid(&self) -> Option<Price> {
        let mut tick = self.grid.bid_max;
        while tick >= u32::from(MIN_PRICE) {
            if self.level_has_live(tick) {
                return Some(tick as Price);
            }
            tick -= 1;
        }
        None
    }

    /// Live quantity and order count resting at `price`.
    pub fn depth_at(&self, price: Price) -> (Size, u32) {
        let mut size = 0;
        let mut orders = 0;
        for entry in self.grid.level(price).iter(&self.arena) {
            if !entry.is_tombstone() {
                size += entry.size;
                orders += 1;
            }
        }
        (size, orders)
    }

    /// Collect up to `depth` live levels per side, best first.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let mut snap = BookSnapshot::default();

        let mut tick = self.grid.bid_max;
        while tick >= u32::from(MIN_PRICE) && snap.bids.len() < depth {
            let (size, orders) = self.depth_at(tick as Price);
            if orders > 0 {
                snap.bids.push(LevelDepth {
                    price: tick as Price,
                    size,
                    orders,
                });
            }
            tick -= 1;
        }

        let mut tick = self.grid.ask_min;
        while tick <= u32::from(MAX_PRICE) && snap.asks.len() < depth {
            let (size, orders) = self.depth_at(tick as Price);
            if orders > 0 {
                snap.asks.push(LevelDepth {
                    price: tick as Price,
                    size,
                    orders,
                });
            }
            tick += 1;
        }

        snap
    }

    /// Hash of the externally observable book state, for determinism
    /// testing.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.grid.ask_min.hash(&mut hasher);
        self.grid.bid_max.hash(&mut hasher);
        self.arena.last_id().hash(&mut hasher);

        let best_bid = self.best_bid();
        let best_ask = self.best_ask();
        best_bid.hash(&mut hasher);
        best_ask.hash(&mut hasher);
        if let Some(p) = best_bid {
            self.depth_at(p).hash(&mut hasher);
        }
        if let Some(p) = best_ask {
            self.depth_at(p).hash(&mut hasher);
        }

        hasher.finish()
    }

    fn level_has_live(&self, tick: u32) -> bool {
        self.grid.levels[tick as usize]
            .iter(&self.arena)
            .any(|e| !e.is_tombstone())
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("grid", &self.grid)
            .field("arena", &self.arena)
            .finish()
    }
}

/// Report one fill as a bid-leg/ask-leg execution pair.
///
/// Both legs carry the aggressor's symbol and limit price. Zero-sized
/// fills are tombstone traversals and emit nothing.
fn report(emit: &mut dyn FnMut(Execution), order: &Order, resting_trader: Tag, size: Size) {
    if size == 0 {
        return;
    }

    let (buyer, seller) = match order.side {
        Side::Bid => (order.trader, resting_trader),
        Side::Ask => (resting_trader, order.trader),
    };

    emit(Execution {
        symbol: order.symbol,
        trader: buyer,
        side: Side::Bid,
        price: order.price,
        size,
    });
    emit(Execution {
        symbol: order.symbol,
        trader: seller,
        side: Side::Ask,
        price: order.price,
        size,
    });
}
