//! Terminal book viewer: drives the synthetic feed into an engine and
//! renders live depth bars for both sides. Press `q` to quit.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tickgrid::replay::{synthetic_feed, FeedCommand};
use tickgrid::{Engine, LevelDepth};

const FEED_ROWS: usize = 200_000;
const ROWS_PER_FRAME: usize = 256;
const DEPTH: usize = 15;
const PRICE_MULT: f64 = 100.0;

fn render_depth(levels: &[LevelDepth]) -> String {
    let max_size = levels.iter().map(|l| l.size).max().unwrap_or(1).max(1);
    let mut out = String::new();

    for level in levels {
        let bar_len = ((level.size as f64 / max_size as f64) * 20.0) as usize;
        let bar = "█".repeat(bar_len);
        out.push_str(&format!(
            "{:>8.2} {:<20} {:>6} x{}\n",
            level.price as f64 / PRICE_MULT,
            bar,
            level.size,
            level.orders,
        ));
    }

    out
}

fn draw(frame: &mut Frame, engine: &Engine, fed: u64) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(frame.size());

    let stats = format!(
        "rows fed: {fed}   last id: {}   best bid: {:?}   best ask: {:?}\n\
         bid cursor: {}   ask cursor: {}   capacity: {}",
        engine.last_order_id(),
        engine.best_bid(),
        engine.best_ask(),
        engine.bid_cursor(),
        engine.ask_cursor(),
        engine.capacity(),
    );
    frame.render_widget(
        Paragraph::new(stats).block(Block::default().borders(Borders::ALL).title("tickgrid")),
        rows[0],
    );

    let sides = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let snap = engine.snapshot(DEPTH);
    frame.render_widget(
        Paragraph::new(render_depth(&snap.bids))
            .block(Block::default().borders(Borders::ALL).title("Bids")),
        sides[0],
    );
    frame.render_widget(
        Paragraph::new(render_depth(&snap.asks))
            .block(Block::default().borders(Borders::ALL).title("Asks")),
        sides[1],
    );
}

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let feed = synthetic_feed(FEED_ROWS);
    let mut engine = Engine::new();
    engine.warm_up();

    let mut cursor = 0usize;
    let mut fed = 0u64;

    loop {
        for command in feed.iter().skip(cursor).take(ROWS_PER_FRAME) {
            match *command {
                FeedCommand::Limit(order) => {
                    let _ = engine.limit(order);
                }
                FeedCommand::Cancel(id) => engine.cancel(id),
            }
            fed += 1;
        }
        cursor += ROWS_PER_FRAME;
        if cursor >= feed.len() {
            // replay from a clean book so cancel ids stay aligned
            cursor = 0;
            engine.reset();
        }

        terminal.draw(|frame| draw(frame, &engine, fed))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') {
                    break;
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
