//! Engine - the public face of the matcher.
//!
//! Owns a [`Matcher`] plus the optional execution callback, and enforces
//! the boundary preconditions so the hot path below it stays total.
//! Strictly single-writer: one logical caller at a time, no locks, no
//! internal threads. The callback runs synchronously on the submitting
//! thread and must not re-enter the engine.

use crate::arena::MAX_ORDERS;
use crate::matching::{BookSnapshot, Matcher};
use crate::order::{EngineError, Execution, Order, OrderId, Price, Size, MIN_PRICE};

type ExecutionHandler = Box<dyn FnMut(Execution)>;

/// A single-instrument limit order book engine.
///
/// Dropping the engine is the only teardown needed; every byte it owns
/// was allocated at construction.
pub struct Engine {
    matcher: Matcher,
    on_execution: Option<ExecutionHandler>,
}

impl Engine {
    /// Create an engine with the default lifetime order capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ORDERS)
    }

    /// Create an engine bounded to `capacity` lifetime submissions
    /// between resets.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            matcher: Matcher::new(capacity),
            on_execution: None,
        }
    }

    /// Install the execution callback. Replaces any previous handler.
    pub fn set_execution_handler(&mut self, handler: impl FnMut(Execution) + 'static) {
        self.on_execution = Some(Box::new(handler));
    }

    /// Remove the execution callback. Fill events are then dropped; the
    /// book mutates identically either way.
    pub fn clear_execution_handler(&mut self) {
        self.on_execution = None;
    }

    /// Submit a limit order.
    ///
    /// Crosses against resting liquidity, reports each fill through the
    /// callback (bid leg first), rests any residual, and returns the
    /// identifier assigned to the submission - including when the order
    /// was fully consumed and nothing rests.
    pub fn limit(&mut self, order: Order) -> Result<OrderId, EngineError> {
        if order.price < MIN_PRICE {
            return Err(EngineError::InvalidPrice);
        }
        if order.size == 0 {
            return Err(EngineError::InvalidSize);
        }
        if self.matcher.arena.is_full() {
            return Err(EngineError::PoolExhausted);
        }

        let handler = &mut self.on_execution;
        Ok(self.matcher.limit(&order, &mut |exec| {
            if let Some(f) = handler.as_mut() {
                f(exec);
            }
        }))
    }

    /// Cancel the resting order for `id`.
    ///
    /// Unknown, already-cancelled, and already-consumed identifiers are
    /// silent no-ops. Never consumes an identifier.
    #[inline]
    pub fn cancel(&mut self, id: OrderId) {
        self.matcher.cancel(id);
    }

    /// Return to the empty-book state: all levels cleared, arena zeroed,
    /// identifiers restarting at 1. Idempotent.
    pub fn reset(&mut self) {
        self.matcher.reset();
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Highest price with a non-cancelled resting bid.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.matcher.best_bid()
    }

    /// Lowest price with a non-cancelled resting ask.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.matcher.best_ask()
    }

    /// The lazy ask-side cursor (lower bound on the best ask).
    #[inline]
    pub fn ask_cursor(&self) -> u32 {
        self.matcher.grid.ask_cursor()
    }

    /// The lazy bid-side cursor (upper bound on the best bid).
    #[inline]
    pub fn bid_cursor(&self) -> u32 {
        self.matcher.grid.bid_cursor()
    }

    /// Live quantity and order count at `price`.
    #[inline]
    pub fn depth_at(&self, price: Price) -> (Size, u32) {
        self.matcher.depth_at(price)
    }

    /// Top `depth` live levels per side.
    #[inline]
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        self.matcher.snapshot(depth)
    }

    /// Most recently assigned order identifier.
    #[inline]
    pub fn last_order_id(&self) -> OrderId {
        self.matcher.arena.last_id()
    }

    /// Lifetime submission capacity.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.matcher.arena.capacity()
    }

    /// Hash of the externally observable state, for determinism testing.
    #[inline]
    pub fn state_hash(&self) -> u64 {
        self.matcher.state_hash()
    }

    /// Pre-fault the arena and grid pages before latency-sensitive use.
    pub fn warm_up(&mut self) {
        self.matcher.arena.warm_up();
        self.matcher.grid.warm_up();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
