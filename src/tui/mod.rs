// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, backend replies)
// - Wiring the rendering panels to the coordinator

pub mod app;
pub mod components;
pub mod input;
pub mod layout;

use crate::backend::{Backend, ContextQuery, DemoBackend, HttpBackend};
use crate::config::Config;
use crate::session::SessionController;
use anyhow::{Context as _, Result};
use app::App;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done, also on error paths.
pub async fn run(config: Config) -> Result<()> {
    let backend = if config.demo_mode {
        Backend::Demo(DemoBackend::new())
    } else {
        Backend::Http(HttpBackend::new(&config.base_url)?)
    };
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let controller = SessionController::new(
        backend,
        reply_tx,
        ContextQuery {
            source: config.source.clone(),
            pos: config.pos,
            left: config.left,
            right: config.right,
        },
        config.threshold,
        config.cell_width,
    );
    let mut app = App::new(controller);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, reply_rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three things at once: keyboard/resize input, backend replies
/// re-entering the session, and a periodic tick that keeps the display
/// fresh while a fetch is in flight.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut reply_rx: mpsc::UnboundedReceiver<crate::backend::BackendReply>,
) -> Result<()> {
    // kick off the initial context fetch before the first frame
    app.bootstrap();

    let mut tick = tokio::time::interval(Duration::from_millis(100));

    while !app.should_quit {
        terminal
            .draw(|frame| app.render(frame))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard or resize input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => app.handle_key(key),
                        Ok(Event::Resize(width, height)) => app.handle_resize(width, height),
                        _ => {}
                    }
                }
            } => {}

            // A context or match fetch resolved
            Some(reply) = reply_rx.recv() => app.handle_reply(reply),

            // Periodic redraw
            _ = tick.tick() => {}
        }
    }

    Ok(())
}
