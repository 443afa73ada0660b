//! Stress tests: capacity limits, single-level contention, tombstone
//! churn, and deep crossing sweeps.

use std::cell::RefCell;
use std::rc::Rc;

use tickgrid::{Engine, EngineError, Execution, Order, Price, Side, Size, Tag};

fn order(trader: &str, side: Side, price: Price, size: Size) -> Order {
    Order {
        symbol: "SYN".parse::<Tag>().unwrap(),
        trader: trader.parse().unwrap(),
        side,
        price,
        size,
    }
}

fn collecting_engine(capacity: u32) -> (Engine, Rc<RefCell<Vec<Execution>>>) {
    let mut engine = Engine::with_capacity(capacity);
    let execs: Rc<RefCell<Vec<Execution>>> = Rc::default();
    let sink = Rc::clone(&execs);
    engine.set_execution_handler(move |e| sink.borrow_mut().push(e));
    (engine, execs)
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn fills_to_capacity_then_refuses() {
    let capacity = 1_001u32; // ids 1..=1000
    let mut engine = Engine::with_capacity(capacity);

    for i in 0..1_000u64 {
        let price = 9_000 + (i % 100) as Price;
        engine.limit(order("BOT", Side::Bid, price, 10)).unwrap();
    }

    let err = engine.limit(order("BOT", Side::Bid, 9_000, 10)).unwrap_err();
    assert_eq!(err, EngineError::PoolExhausted);
    assert_eq!(engine.last_order_id(), 1_000);
}

#[test]
fn cancel_does_not_recover_capacity() {
    // ids are never reused, so tombstoning frees no headroom
    let mut engine = Engine::with_capacity(11); // ids 1..=10
    for _ in 0..10 {
        engine.limit(order("BOT", Side::Bid, 9_000, 10)).unwrap();
    }
    for id in 1..=10 {
        engine.cancel(id);
    }

    let err = engine.limit(order("BOT", Side::Bid, 9_000, 10)).unwrap_err();
    assert_eq!(err, EngineError::PoolExhausted);
}

#[test]
fn reset_restores_capacity() {
    let mut engine = Engine::with_capacity(11);
    for _ in 0..10 {
        engine.limit(order("BOT", Side::Bid, 9_000, 10)).unwrap();
    }
    assert!(engine.limit(order("BOT", Side::Bid, 9_000, 10)).is_err());

    engine.reset();
    assert_eq!(engine.limit(order("BOT", Side::Bid, 9_000, 10)).unwrap(), 1);
}

#[test]
fn full_fills_burn_capacity_without_resting() {
    // every id is burned whether or not a residual rests
    let mut engine = Engine::with_capacity(5); // ids 1..=4
    engine.limit(order("BOT", Side::Ask, 100, 10)).unwrap(); // id 1
    engine.limit(order("BOT", Side::Bid, 100, 10)).unwrap(); // id 2, full fill
    engine.limit(order("BOT", Side::Ask, 100, 10)).unwrap(); // id 3
    engine.limit(order("BOT", Side::Bid, 100, 10)).unwrap(); // id 4, full fill

    let err = engine.limit(order("BOT", Side::Bid, 100, 10)).unwrap_err();
    assert_eq!(err, EngineError::PoolExhausted);
}

// ============================================================================
// Single-level contention
// ============================================================================

#[test]
fn sweep_thousand_orders_at_one_price() {
    const ORDERS: u64 = 1_000;
    let (mut engine, execs) = collecting_engine(10_000);

    for _ in 0..ORDERS {
        engine.limit(order("BOT", Side::Ask, 10_000, 100)).unwrap();
    }

    engine
        .limit(order("TKR", Side::Bid, 10_000, ORDERS * 100))
        .unwrap();

    let execs = execs.borrow();
    // one bid-leg/ask-leg pair per resting order
    assert_eq!(execs.len(), ORDERS as usize * 2);
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.depth_at(10_000), (0, 0));
}

#[test]
fn fifo_priority_under_contention() {
    const ORDERS: usize = 100;
    let (mut engine, execs) = collecting_engine(10_000);

    for i in 0..ORDERS {
        let trader = format!("T{i:02}");
        engine
            .limit(order(&trader, Side::Ask, 10_000, 10))
            .unwrap();
    }

    // one aggressor per resting order, in order
    for i in 0..ORDERS {
        execs.borrow_mut().clear();
        engine.limit(order("TKR", Side::Bid, 10_000, 10)).unwrap();
        let execs = execs.borrow();
        assert_eq!(execs.len(), 2);
        // the ask leg names the resting order that was first in line
        assert_eq!(execs[1].trader, format!("T{i:02}").parse::<Tag>().unwrap());
    }
}

// ============================================================================
// Tombstone churn
// ============================================================================

#[test]
fn sweep_through_all_tombstone_levels() {
    let (mut engine, execs) = collecting_engine(10_000);

    // five ask levels, all cancelled
    let mut ids = Vec::new();
    for i in 0..5u64 {
        let id = engine
            .limit(order("BOT", Side::Ask, 10_000 + i as Price, 50))
            .unwrap();
        ids.push(id);
    }
    for id in ids {
        engine.cancel(id);
    }
    assert_eq!(engine.ask_cursor(), 10_000);

    // crossing through five dead levels emits nothing and rests in full
    engine.limit(order("TKR", Side::Bid, 10_004, 75)).unwrap();
    assert!(execs.borrow().is_empty());
    assert_eq!(engine.best_bid(), Some(10_004));
    assert_eq!(engine.depth_at(10_004), (75, 1));
    // the cursor walked past the graveyard
    assert_eq!(engine.ask_cursor(), 10_005);
}

#[test]
fn mixed_live_and_tombstoned_queue() {
    let (mut engine, execs) = collecting_engine(10_000);

    let mut ids = Vec::new();
    for _ in 0..50 {
        ids.push(engine.limit(order("BOT", Side::Ask, 10_000, 10)).unwrap());
    }
    // cancel every other order
    for id in ids.iter().step_by(2) {
        engine.cancel(*id);
    }
    assert_eq!(engine.depth_at(10_000), (250, 25));

    engine.limit(order("TKR", Side::Bid, 10_000, 250)).unwrap();
    assert_eq!(execs.borrow().len(), 25 * 2);
    assert_eq!(engine.depth_at(10_000), (0, 0));
}

// ============================================================================
// Deep sweeps
// ============================================================================

#[test]
fn cross_hundreds_of_levels() {
    const LEVELS: u64 = 500;
    let (mut engine, execs) = collecting_engine(10_000);

    for i in 0..LEVELS {
        engine
            .limit(order("BOT", Side::Ask, 10_000 + i as Price, 10))
            .unwrap();
    }

    let top = 10_000 + (LEVELS - 1) as Price;
    engine
        .limit(order("TKR", Side::Bid, top, LEVELS * 10))
        .unwrap();

    let execs = execs.borrow();
    assert_eq!(execs.len(), LEVELS as usize * 2);
    // fill order runs from the best ask outward
    assert!(execs.iter().all(|e| e.price == top));
    assert_eq!(engine.best_ask(), None);

    // the next ask sweeps the (empty) bid side without incident
    drop(execs);
    engine.limit(order("BOT", Side::Ask, 9_000, 10)).unwrap();
    assert_eq!(engine.best_ask(), Some(9_000));
}

#[test]
fn extreme_grid_edges() {
    use tickgrid::{MAX_PRICE, MIN_PRICE};
    let (mut engine, execs) = collecting_engine(1_000);

    engine.limit(order("BOT", Side::Bid, MIN_PRICE, 10)).unwrap();
    engine.limit(order("BOT", Side::Ask, MAX_PRICE, 10)).unwrap();
    assert_eq!(engine.best_bid(), Some(MIN_PRICE));
    assert_eq!(engine.best_ask(), Some(MAX_PRICE));

    // cross at both extremes
    engine.limit(order("TKR", Side::Ask, MIN_PRICE, 10)).unwrap();
    engine.limit(order("TKR", Side::Bid, MAX_PRICE, 10)).unwrap();

    assert_eq!(execs.borrow().len(), 4);
    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
}
