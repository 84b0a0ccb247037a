//! partial-scope - play LA32 partials and watch the output
//!
//! Run with: cargo run --bin partial-scope
//!
//! Logs go to stderr; set RUST_LOG=debug and redirect stderr to a file to
//! keep them out of the terminal UI.

mod app;
mod demo;
mod ui;

use rtrb::RingBuffer;

use demo::Demo;
use ui::ScopeUi;

/// Roughly a third of a second of frames at 48 kHz.
const SCOPE_QUEUE: usize = 16_384;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let (scope_tx, scope_rx) = RingBuffer::<[f32; 2]>::new(SCOPE_QUEUE);
    let (demo_tx, demo_rx) = RingBuffer::<Demo>::new(16);
    let audio = app::start(scope_tx, demo_rx)?;

    let mut terminal = ratatui::init();
    let result = ScopeUi::new(scope_rx, demo_tx, audio.sample_rate).run(&mut terminal);
    ratatui::restore();
    result
}
